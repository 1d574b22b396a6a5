pub mod schema;

pub use schema::{DeviceConfig, TimingConfig, UiConfig};

use edugrid_core::{Result, UiError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `UiConfig::default()` if
/// the file doesn't exist so the client can always reach a stock trainer.
pub fn load(path: impl AsRef<Path>) -> Result<UiConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(UiConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| UiError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<UiConfig> {
    toml::from_str(raw).map_err(|e| UiError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("edugrid").join("edugrid.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_match_firmware() {
        let cfg = UiConfig::default();
        assert_eq!(cfg.device.ws_url(), "ws://192.168.4.1:81/");
        assert_eq!(cfg.device.http_base(), "http://192.168.4.1");
        assert_eq!(cfg.timing.reconnect(), Duration::from_millis(2_000));
        assert_eq!(cfg.timing.sweep_poll(), Duration::from_millis(120));
        assert_eq!(cfg.timing.sweep_retry(), Duration::from_millis(250));
        assert_eq!(cfg.timing.slider_debounce(), Duration::from_millis(40));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse(
            r#"
            [device]
            host = "edugrid.local"
            http_port = 8080

            [timing]
            slider_debounce_ms = 60
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.device.http_base(), "http://edugrid.local:8080");
        assert_eq!(cfg.device.ws_port, 81);
        assert_eq!(cfg.timing.slider_debounce_ms, 60);
        assert_eq!(cfg.timing.sweep_poll_ms, 120);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = parse("[device\nhost = 1").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load("/nonexistent/edugrid/edugrid.toml").expect("defaults");
        assert_eq!(cfg.device.host, "192.168.4.1");
    }
}
