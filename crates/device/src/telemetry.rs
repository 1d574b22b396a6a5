use crate::payload::parse_telemetry;
use edugrid_config::{DeviceConfig, TimingConfig};
use edugrid_core::TelemetryFrame;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Events produced by the telemetry listener.
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    Connected,
    Frame(TelemetryFrame),
    /// Socket closed or failed; a reconnect is pending.
    Disconnected,
}

/// WebSocket telemetry client.
///
/// Connects to the device's telemetry socket and streams decoded
/// [`TelemetryFrame`]s. Reconnects after a fixed delay whenever the
/// connection drops.
#[derive(Debug, Clone)]
pub struct TelemetryListener {
    url:       String,
    reconnect: Duration,
}

impl TelemetryListener {
    pub fn new(device: &DeviceConfig, timing: &TimingConfig) -> Self {
        Self {
            url:       device.ws_url(),
            reconnect: timing.reconnect(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Spawn a background task that forwards [`TelemetryEvent`]s on the
    /// returned channel.
    ///
    /// The task stops when `cancel` fires or every receiver is dropped.
    pub fn spawn(self, cancel: CancellationToken) -> mpsc::Receiver<TelemetryEvent> {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(self.run(tx, cancel));
        rx
    }

    async fn run(self, tx: mpsc::Sender<TelemetryEvent>, cancel: CancellationToken) {
        loop {
            let connect = tokio::select! {
                _ = cancel.cancelled() => return,
                res = tokio_tungstenite::connect_async(self.url.as_str()) => res,
            };

            match connect {
                Ok((mut ws, _)) => {
                    info!("Connected to telemetry socket {}", self.url);
                    if tx.send(TelemetryEvent::Connected).await.is_err() {
                        return;
                    }

                    loop {
                        let item = tokio::select! {
                            _ = cancel.cancelled() => {
                                let _ = ws.close(None).await;
                                return;
                            }
                            item = ws.next() => item,
                        };

                        let msg = match item {
                            Some(Ok(msg)) => msg,
                            Some(Err(e)) => {
                                // Force-close so the error takes the same path as a clean close.
                                warn!("Telemetry read error: {e}");
                                let _ = ws.close(None).await;
                                break;
                            }
                            None => break,
                        };

                        match msg {
                            WsMessage::Text(text) => match parse_telemetry(text.as_str()) {
                                Ok(frame) => {
                                    if tx.send(TelemetryEvent::Frame(frame)).await.is_err() {
                                        return; // all receivers dropped
                                    }
                                }
                                Err(e) => debug!("Dropping telemetry payload: {e}"),
                            },
                            WsMessage::Close(_) => break,
                            _ => {}
                        }
                    }

                    warn!(
                        "Telemetry connection lost; reconnecting in {}ms",
                        self.reconnect.as_millis()
                    );
                    if tx.send(TelemetryEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!(
                        "Cannot connect to {}: {e}; retrying in {}ms",
                        self.url,
                        self.reconnect.as_millis()
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(self.reconnect) => {}
            }
        }
    }
}
