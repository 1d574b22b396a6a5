use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure parsed from `edugrid.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Where the trainer lives on the network.
    pub device: DeviceConfig,
    /// Reconnect, polling and debounce intervals.
    pub timing: TimingConfig,
}

/// Network address of the EduGrid device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hostname or IP. The trainer's own access point serves on `192.168.4.1`.
    pub host: String,
    /// Port of the HTTP control/sweep API.
    pub http_port: u16,
    /// Port of the telemetry WebSocket.
    pub ws_port: u16,
    /// Per-request timeout for HTTP calls (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host:               "192.168.4.1".to_string(),
            http_port:          80,
            ws_port:            81,
            request_timeout_ms: 5_000,
        }
    }
}

impl DeviceConfig {
    /// `http://host[:port]` without a trailing slash.
    pub fn http_base(&self) -> String {
        if self.http_port == 80 {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.http_port)
        }
    }

    /// Telemetry feed URL, e.g. `ws://192.168.4.1:81/`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/", self.host, self.ws_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Timer settings (all in milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before reconnecting a closed telemetry socket.
    pub reconnect_ms: u64,
    /// Poll cadence while a sweep is still running.
    pub sweep_poll_ms: u64,
    /// Back-off after a failed sweep poll.
    pub sweep_retry_ms: u64,
    /// Slider debounce window.
    pub slider_debounce_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reconnect_ms:       2_000,
            sweep_poll_ms:      120,
            sweep_retry_ms:     250,
            slider_debounce_ms: 40,
        }
    }
}

impl TimingConfig {
    pub fn reconnect(&self) -> Duration {
        Duration::from_millis(self.reconnect_ms)
    }

    pub fn sweep_poll(&self) -> Duration {
        Duration::from_millis(self.sweep_poll_ms)
    }

    pub fn sweep_retry(&self) -> Duration {
        Duration::from_millis(self.sweep_retry_ms)
    }

    pub fn slider_debounce(&self) -> Duration {
        Duration::from_millis(self.slider_debounce_ms)
    }
}
