use crate::{state::TelemetryFrame, sweep::SweepSummary};

/// All messages that can flow through the session's event loop.
///
/// Sources:
/// - Telemetry WebSocket task → `Telemetry*`
/// - Sweep poller task        → `Sweep*`
/// - User actions             → `SliderDrag*`
#[derive(Debug, Clone)]
pub enum Message {
    // ── Telemetry feed ────────────────────────────────────────────────────────
    /// WebSocket connection established.
    TelemetryConnected,
    /// WebSocket closed; a reconnect is scheduled.
    TelemetryDisconnected,
    /// A decoded telemetry record.
    Telemetry(TelemetryFrame),

    // ── I-V sweep ─────────────────────────────────────────────────────────────
    /// Fresh summary from a sweep poll.
    SweepUpdated(SweepSummary),
    /// The firmware reported the sweep as done; polling has stopped.
    SweepFinished,

    // ── User actions ──────────────────────────────────────────────────────────
    /// User grabbed (`true`) or released (`false`) the PWM slider.
    SliderDragChanged(bool),
}
