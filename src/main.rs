//! edugrid-ui: headless client for the EduGrid DC-DC / MPPT trainer.
//!
//! Run with:  `RUST_LOG=info edugrid-ui watch`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use edugrid_config::{default_path, load as load_config, UiConfig};
use edugrid_core::{
    format::{format_current, format_percent, format_power, format_voltage},
    MemorySink, Mode, SweepSummary,
};
use edugrid_device::{ControlId, DeviceClient, DeviceFile};
use edugrid_session::{ConsoleSink, Session};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edugrid-ui")]
#[command(version, about = "Live telemetry, control and I-V sweeps for the EduGrid trainer")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/edugrid/edugrid.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device host, overriding the config file
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream live telemetry and accept control commands on stdin
    Watch,
    /// Run an I-V sweep and print the curves and MPP
    Sweep {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one measurement snapshot
    Now,
    /// Zero the current sensors (disconnect PV and load first)
    Calibrate,
    /// List, download or delete log files stored on the device
    Logs {
        #[command(subcommand)]
        action: LogsCommand,
    },
    /// Send a single control update
    Set {
        #[command(subcommand)]
        control: SetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SetCommand {
    /// Switch to AUTO or MANUAL
    Mode { mode: ModeArg },
    /// Set the PWM duty cycle (percent)
    Pwm { duty: u8 },
    /// Raise PWM duty by one step
    PwmUp,
    /// Lower PWM duty by one step
    PwmDown,
    /// Toggle the MPP tracker
    Mpp,
    /// Toggle SD-card logging
    Logging,
    /// Restart the device
    Reboot,
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
    /// List the files on the device's flash
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download a file (e.g. /log/log_0001.csv)
    Get {
        path: String,
        /// Where to write it (default: the file name, in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a file from the device
    Rm { path: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Auto,
    Manual,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging. RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    tracing::info!(
        "edugrid-ui v{} talking to {}",
        env!("CARGO_PKG_VERSION"),
        config.device.host
    );

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(config).await,
        Command::Sweep { json } => sweep(config, json).await,
        Command::Now => now(config).await,
        Command::Calibrate => {
            DeviceClient::new(&config.device)?.calibrate_zero().await?;
            println!("Zero-offset calibration done.");
            Ok(())
        }
        Command::Logs { action } => logs(config, action).await,
        Command::Set { control } => set(config, control).await,
    }
}

fn resolve_config(cli: &Cli) -> Result<UiConfig> {
    let path = cli.config.clone().unwrap_or_else(default_path);
    let mut config = load_config(&path)
        .with_context(|| format!("loading config from '{}'", path.display()))?;
    if let Some(host) = &cli.host {
        config.device.host = host.clone();
    }
    Ok(config)
}

// ── Commands ──────────────────────────────────────────────────────────────────

const WATCH_HELP: &str =
    "commands: status | mode | mpp | log | up | down | pwm <0-100> | drag | release | sweep | reboot | quit";

async fn watch(config: UiConfig) -> Result<()> {
    let mut session = Session::new(config, ConsoleSink::new())?;
    session.start();
    println!("{WATCH_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break }; // stdin closed

        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (None, _) => {}
            (Some("status"), _) => println!("{}", session.state().await.status_line()),
            (Some("mode"), _) => session.toggle_mode().await,
            (Some("mpp"), _) => session.toggle_mpp(),
            (Some("log"), _) => session.toggle_logging().await,
            (Some("up"), _) => session.step_pwm(true),
            (Some("down"), _) => session.step_pwm(false),
            (Some("pwm"), Some(duty)) => match duty.parse::<u8>() {
                Ok(duty) => session.set_slider(duty),
                Err(_) => println!("pwm expects a whole number, got '{duty}'"),
            },
            (Some("drag"), _) => session.set_slider_dragging(true).await,
            (Some("release"), _) => session.set_slider_dragging(false).await,
            (Some("sweep"), _) => {
                if let Err(e) = session.start_sweep().await {
                    println!("{e}");
                }
            }
            (Some("reboot"), _) => session.request_reboot(),
            (Some("quit" | "exit"), _) => break,
            _ => println!("{WATCH_HELP}"),
        }
    }

    session.shutdown().await;
    Ok(())
}

async fn sweep(config: UiConfig, json: bool) -> Result<()> {
    let mut session = Session::new(config, MemorySink::new())?;
    session.start_sweep().await?;

    let summary = tokio::select! {
        _ = tokio::signal::ctrl_c() => None,
        summary = session.wait_sweep() => summary,
    };
    session.shutdown().await;

    let Some(summary) = summary else {
        println!("Sweep interrupted.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

async fn now(config: UiConfig) -> Result<()> {
    let snap = DeviceClient::new(&config.device)?.fetch_now().await?;
    println!("in   {:>10}  {:>10}  {:>10}", format_voltage(snap.vin), format_current(snap.iin), format_power(snap.pin));
    println!("out  {:>10}  {:>10}  {:>10}", format_voltage(snap.vout), format_current(snap.iout), format_power(snap.pout));
    println!("eff  {:>10}", format_percent(snap.eff));
    Ok(())
}

async fn set(config: UiConfig, control: SetCommand) -> Result<()> {
    let client = DeviceClient::new(&config.device)?;
    let (id, state) = match control {
        SetCommand::Mode { mode: ModeArg::Auto } => (ControlId::ModeLabel, Mode::Auto.label().to_string()),
        SetCommand::Mode { mode: ModeArg::Manual } => (ControlId::ModeLabel, Mode::Manual.label().to_string()),
        SetCommand::Pwm { duty } => (ControlId::PwmSlider, duty.to_string()),
        SetCommand::PwmUp => (ControlId::PwmIncrement, "1".to_string()),
        SetCommand::PwmDown => (ControlId::PwmDecrement, "1".to_string()),
        SetCommand::Mpp => (ControlId::MppSwitch, "1".to_string()),
        SetCommand::Logging => (ControlId::LoggingLabel, "1".to_string()),
        SetCommand::Reboot => (ControlId::Reboot, "1".to_string()),
    };
    client.send_update(id, &state, None).await?;
    println!("{} <- {state}", id.as_str());
    Ok(())
}

async fn logs(config: UiConfig, action: LogsCommand) -> Result<()> {
    let client = DeviceClient::new(&config.device)?;
    match action {
        LogsCommand::List { json } => {
            let files = client.list_files().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                print_files(&files);
            }
        }
        LogsCommand::Get { path, output } => {
            let bytes = client.download_file(&path).await?;
            let output = output.unwrap_or_else(|| local_name(&path));
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("writing '{}'", output.display()))?;
            println!("{path} -> {} ({} bytes)", output.display(), bytes.len());
        }
        LogsCommand::Rm { path } => {
            client.delete_file(&path).await?;
            println!("Deleted {path}");
        }
    }
    Ok(())
}

/// `/log/log_0001.csv` -> `log_0001.csv`
fn local_name(device_path: &str) -> PathBuf {
    Path::new(device_path)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("download.bin"))
}

fn print_files(files: &[DeviceFile]) {
    if files.is_empty() {
        println!("No files on the device.");
        return;
    }
    for f in files {
        println!("{:<40}  {:>10}", f.path, f.size);
    }
}

fn print_summary(summary: &SweepSummary) {
    println!("{:>10}  {:>10}", "V", "A");
    for p in &summary.iv_curve {
        println!("{:>10.3}  {:>10.3}", p.x, p.y);
    }
    println!();
    println!("{:>10}  {:>10}", "V", "W");
    for p in &summary.pv_curve {
        println!("{:>10.3}  {:>10.3}", p.x, p.y);
    }
    println!();
    match summary.mpp {
        Some(_) => println!("{}", summary.mpp_label()),
        None => println!("No MPP (no valid power samples)."),
    }
}
