//! Session controller for the EduGrid UI.
//!
//! A [`Session`] owns everything one page session needs and wires together
//! the background tasks:
//! - Telemetry WebSocket listener (reconnects on close)
//! - Message bus consumer (applies events to state, renders panels)
//! - I-V sweep poller (reschedules itself until the sweep is done)
//! - PWM slider debouncer
//!
//! Every task hangs off the session's root [`CancellationToken`], so
//! [`Session::shutdown`] stops all of them.

pub mod console;
pub mod debounce;
pub mod sweep;

pub use console::ConsoleSink;
pub use debounce::Debouncer;
pub use sweep::{poll_sweep, SweepSource};

use edugrid_config::UiConfig;
use edugrid_core::{
    format::MISSING, state::DisplayState, FieldSink, Message, Result, SweepSummary, UiError,
};
use edugrid_device::{ControlId, DeviceClient, TelemetryEvent, TelemetryListener};
use edugrid_panel::Dashboard;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Capacity of the internal message bus.
const BUS_CAPACITY: usize = 64;

// ── Shared state ──────────────────────────────────────────────────────────────

/// State mutated by the bus consumer. Only ever touched under the session lock.
struct Shared<S> {
    state:     DisplayState,
    dashboard: Dashboard,
    sink:      S,
}

impl<S: FieldSink> Shared<S> {
    fn handle(&mut self, msg: Message) {
        match msg {
            Message::TelemetryConnected => {
                self.state.connected = true;
            }
            Message::TelemetryDisconnected => {
                self.state.connected = false;
            }
            Message::Telemetry(frame) => {
                self.state.apply_frame(frame);
                self.dashboard.render_telemetry(&self.state, &mut self.sink);
            }
            Message::SweepUpdated(summary) => {
                self.state.sweep = summary;
                self.dashboard.render_sweep(&self.state, &mut self.sink);
            }
            Message::SliderDragChanged(dragging) => {
                self.state.slider.dragging = dragging;
            }
            Message::SweepFinished => {}
        }
    }
}

struct SweepTask {
    cancel: CancellationToken,
    handle: JoinHandle<Option<SweepSummary>>,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One UI session against one device.
pub struct Session<S: FieldSink + 'static> {
    config: UiConfig,
    client: DeviceClient,
    shared: Arc<Mutex<Shared<S>>>,
    bus:    mpsc::Sender<Message>,
    bus_rx: Option<mpsc::Receiver<Message>>,
    slider: Debouncer<u8>,
    cancel: CancellationToken,
    tasks:  Vec<JoinHandle<()>>,
    sweep:  Option<SweepTask>,
    /// Set once the telemetry listener is running; one socket per session.
    streaming: bool,
}

impl<S: FieldSink + 'static> Session<S> {
    /// Build a session. Nothing runs until [`start`](Self::start) or
    /// [`start_sweep`](Self::start_sweep) is called.
    pub fn new(config: UiConfig, sink: S) -> Result<Self> {
        let client = DeviceClient::new(&config.device)?;
        let cancel = CancellationToken::new();
        let (bus, bus_rx) = mpsc::channel(BUS_CAPACITY);

        let slider_client = client.clone();
        let slider = Debouncer::with_cancel(
            config.timing.slider_debounce(),
            cancel.child_token(),
            move |duty: u8| {
                let client = slider_client.clone();
                async move {
                    if let Err(e) = client
                        .send_update(ControlId::PwmSlider, &duty.to_string(), None)
                        .await
                    {
                        warn!("PWM slider update failed: {e}");
                    }
                }
            },
        );

        Ok(Self {
            config,
            client,
            shared: Arc::new(Mutex::new(Shared {
                state:     DisplayState::default(),
                dashboard: Dashboard::new(),
                sink,
            })),
            bus,
            bus_rx: Some(bus_rx),
            slider,
            cancel,
            tasks: Vec::new(),
            sweep: None,
            streaming: false,
        })
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn client(&self) -> &DeviceClient {
        &self.client
    }

    /// Start the message bus and the telemetry feed. Calling it again is a
    /// no-op.
    pub fn start(&mut self) {
        if self.streaming {
            return;
        }
        self.streaming = true;
        self.ensure_bus();

        let listener = TelemetryListener::new(&self.config.device, &self.config.timing);
        info!("Streaming telemetry from {}", listener.url());
        let mut rx = listener.spawn(self.cancel.child_token());
        let bus = self.bus.clone();

        self.tasks.push(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if bus.send(convert_telemetry_event(event)).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn ensure_bus(&mut self) {
        let Some(mut bus_rx) = self.bus_rx.take() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.child_token();

        self.tasks.push(tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    _ = cancel.cancelled() => break,
                    msg = bus_rx.recv() => msg,
                };
                match msg {
                    Some(msg) => shared.lock().await.handle(msg),
                    None => break,
                }
            }
        }));
    }

    /// Apply a message immediately, bypassing the bus.
    pub async fn apply(&self, msg: Message) {
        self.shared.lock().await.handle(msg);
    }

    /// Copy of the current display state.
    pub async fn state(&self) -> DisplayState {
        self.shared.lock().await.state.clone()
    }

    // ── User actions ──────────────────────────────────────────────────────────

    /// Move the PWM slider. Bursts are coalesced by the debouncer.
    pub fn set_slider(&self, duty: u8) {
        self.slider.schedule(duty);
    }

    /// While dragging, incoming telemetry leaves the slider value alone.
    pub async fn set_slider_dragging(&self, dragging: bool) {
        self.apply(Message::SliderDragChanged(dragging)).await;
    }

    /// Ask the firmware for the other regular mode (AUTO <-> MANUAL).
    pub async fn toggle_mode(&self) {
        let target = {
            let shared = self.shared.lock().await;
            shared.dashboard.mode.next_mode_request(&shared.state)
        };
        self.fire(ControlId::ModeLabel, target.label().to_string());
    }

    pub fn toggle_mpp(&self) {
        self.fire(ControlId::MppSwitch, "1".into());
    }

    /// Toggle logging; the firmware gets the label currently shown.
    pub async fn toggle_logging(&self) {
        let shown = {
            let shared = self.shared.lock().await;
            shared.state.frame.logging.clone().unwrap_or_else(|| MISSING.to_string())
        };
        self.fire(ControlId::LoggingLabel, shown);
    }

    /// One PWM step up or down.
    pub fn step_pwm(&self, up: bool) {
        let id = if up { ControlId::PwmIncrement } else { ControlId::PwmDecrement };
        self.fire(id, "1".into());
    }

    pub fn request_reboot(&self) {
        self.fire(ControlId::Reboot, "1".into());
    }

    /// Send a control update without waiting for (or caring about) the reply.
    fn fire(&self, id: ControlId, state: String) {
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_update(id, &state, None).await {
                warn!("Control update {} failed: {e}", id.as_str());
            }
        });
    }

    // ── I-V sweep ─────────────────────────────────────────────────────────────

    /// Start a sweep and begin polling its data.
    ///
    /// A failed start request is returned to the caller and not retried.
    /// Starting a new sweep stops polling the previous one.
    pub async fn start_sweep(&mut self) -> Result<()> {
        self.client
            .start_sweep()
            .await
            .map_err(|e| UiError::Sweep(format!("failed to start IV sweep: {e}")))?;

        self.ensure_bus();
        if let Some(prev) = self.sweep.take() {
            prev.cancel.cancel();
        }

        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(poll_sweep(
            self.client.clone(),
            self.config.timing.clone(),
            self.bus.clone(),
            cancel.clone(),
        ));
        info!("IV sweep started");
        self.sweep = Some(SweepTask { cancel, handle });
        Ok(())
    }

    /// Wait for the running sweep to finish. `None` if no sweep is running or
    /// it was cancelled.
    pub async fn wait_sweep(&mut self) -> Option<SweepSummary> {
        let task = self.sweep.take()?;
        task.handle.await.ok().flatten()
    }

    /// Stop every task owned by the session.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(sweep) = self.sweep.take() {
            let _ = sweep.handle.await;
        }
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
        info!("Session stopped");
    }
}

impl<S: FieldSink + 'static> Drop for Session<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Map a raw telemetry event to a bus message.
fn convert_telemetry_event(event: TelemetryEvent) -> Message {
    match event {
        TelemetryEvent::Connected => Message::TelemetryConnected,
        TelemetryEvent::Frame(frame) => Message::Telemetry(frame),
        TelemetryEvent::Disconnected => Message::TelemetryDisconnected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugrid_core::{summarize, Field, MemorySink, Mode, TelemetryFrame};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn shared() -> Shared<MemorySink> {
        Shared {
            state:     DisplayState::default(),
            dashboard: Dashboard::new(),
            sink:      MemorySink::new(),
        }
    }

    #[test]
    fn telemetry_frame_renders_fields_and_live_points() {
        let mut s = shared();
        for n in 0..12 {
            s.handle(Message::Telemetry(TelemetryFrame {
                vin: Some(10.0 + n as f64),
                iin: Some(0.5),
                mode: Some(Mode::Auto),
                ..Default::default()
            }));
        }

        assert_eq!(s.sink.field(Field::VoltageIn), Some("21.00 V"));
        assert_eq!(s.sink.field(Field::Mode), Some("AUTO"));
        assert_eq!(s.sink.live_points.len(), 10);
        assert_eq!(s.sink.live_points.last().map(|p| p.voltage), Some(21.0));
    }

    #[test]
    fn sweep_update_renders_mpp_line() {
        let mut s = shared();
        s.handle(Message::SweepUpdated(summarize(&[1.0, 2.0], &[1.0, 1.5], &[1.0, 3.0])));
        assert_eq!(s.sink.field(Field::MppInfo), Some("MPP ~ 2.00 V, 1.50 A  ->  3.00 W"));
    }

    #[test]
    fn connection_events_track_state() {
        let mut s = shared();
        s.handle(Message::TelemetryConnected);
        assert!(s.state.connected);
        s.handle(Message::TelemetryDisconnected);
        assert!(!s.state.connected);
    }

    // ── Against a fake device ─────────────────────────────────────────────────

    /// Minimal HTTP server that records request targets and answers `OK`
    /// (or `sweep_body` for sweep data polls).
    async fn fake_device(sweep_body: &'static str) -> (UiConfig, Arc<std::sync::Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&log);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let target = request
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or_default()
                        .to_string();
                    let body = if target.starts_with("/ivsweep/data") { sweep_body } else { "OK" };
                    seen.lock().unwrap().push(target);

                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        let mut config = UiConfig::default();
        config.device.host = "127.0.0.1".into();
        config.device.http_port = port;
        (config, log)
    }

    #[tokio::test]
    async fn slider_burst_sends_one_update() {
        let (config, log) = fake_device("{}").await;
        let session = Session::new(config, MemorySink::new()).expect("session");

        for duty in 1..=5 {
            session.set_slider(duty);
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*log.lock().unwrap(), vec!["/updatevalues?ID=4&STATE=5".to_string()]);
    }

    #[tokio::test]
    async fn second_start_keeps_a_single_listener() {
        let (config, _) = fake_device("{}").await;
        let mut session = Session::new(config, MemorySink::new()).expect("session");

        session.start();
        let running = session.tasks.len();
        session.start();

        assert_eq!(running, 2); // bus consumer + telemetry forwarder
        assert_eq!(session.tasks.len(), running);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn mode_toggle_requests_opposite_mode() {
        let (config, log) = fake_device("{}").await;
        let session = Session::new(config, MemorySink::new()).expect("session");

        session
            .apply(Message::Telemetry(TelemetryFrame { mode: Some(Mode::Auto), ..Default::default() }))
            .await;
        session.toggle_mode().await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["/updatevalues?ID=mode_label&STATE=MANUAL".to_string()]
        );
    }

    #[tokio::test]
    async fn sweep_runs_to_completion() {
        let (config, log) =
            fake_device(r#"{"v":[2,1,3],"i":[1,2,3],"p":[2,2,9],"in_progress":false,"done":true}"#).await;
        let mut session = Session::new(config, MemorySink::new()).expect("session");

        session.start_sweep().await.expect("sweep started");
        let summary = tokio::time::timeout(Duration::from_secs(5), session.wait_sweep())
            .await
            .expect("sweep finished in time")
            .expect("summary");

        assert_eq!(summary.mpp.map(|m| (m.voltage, m.current, m.power)), Some((3.0, 3.0, 9.0)));
        let requests = log.lock().unwrap().clone();
        assert_eq!(requests, vec!["/ivsweep/start".to_string(), "/ivsweep/data".to_string()]);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn sweep_start_failure_is_reported() {
        // Grab a free port, then close it so the connection is refused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let mut config = UiConfig::default();
        config.device.host = "127.0.0.1".into();
        config.device.http_port = port;

        let mut session = Session::new(config, MemorySink::new()).expect("session");
        let err = session.start_sweep().await.unwrap_err();
        assert!(matches!(err, UiError::Sweep(_)));
        assert!(session.wait_sweep().await.is_none());
    }
}
