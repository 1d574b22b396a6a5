use crate::{format::MISSING, history::LiveHistory, sweep::SweepSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Converter operating mode as reported by the firmware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Auto,
    Manual,
    IvSweep,
    /// Anything the firmware sends that we don't recognise (e.g. `"UNKNOWN"`).
    Other(String),
}

impl Mode {
    /// Parse the string form (`"AUTO"`, `"MANUAL"`, `"IV_SWEEP"`).
    /// Case-insensitive; the legacy spelling `MANUALLY` maps to `Manual`.
    pub fn from_label(label: &str) -> Self {
        let upper = label.trim().to_uppercase().replace("MANUALLY", "MANUAL");
        match upper.as_str() {
            "AUTO" => Mode::Auto,
            "MANUAL" => Mode::Manual,
            "IV_SWEEP" => Mode::IvSweep,
            _ => Mode::Other(upper),
        }
    }

    /// Older firmware reports the mode as a number: `1` = auto, `0` = manual.
    pub fn from_legacy(value: f64) -> Self {
        if value == 1.0 {
            Mode::Auto
        } else if value == 0.0 {
            Mode::Manual
        } else {
            Mode::Other(value.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Mode::Auto => "AUTO",
            Mode::Manual => "MANUAL",
            Mode::IvSweep => "IV_SWEEP",
            Mode::Other(s) => s,
        }
    }

    /// Mode to request when the user clicks the mode label.
    ///
    /// Always an explicit regular mode; a click never enters `IV_SWEEP`.
    pub fn toggle_target(&self) -> Mode {
        match self {
            Mode::Auto => Mode::Manual,
            _ => Mode::Auto,
        }
    }
}

/// One telemetry record pushed by the device over the WebSocket feed.
///
/// Every numeric field is optional: the firmware omits or garbles fields
/// between versions and a missing value must render as a placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryFrame {
    /// PWM duty cycle in percent.
    pub pwm:     Option<f64>,
    pub pwm_min: Option<f64>,
    pub pwm_max: Option<f64>,
    /// Switching frequency in Hz.
    pub freq_hz: Option<f64>,
    pub mode:    Option<Mode>,
    pub vin:     Option<f64>,
    pub iin:     Option<f64>,
    pub vout:    Option<f64>,
    pub iout:    Option<f64>,
    pub pin:     Option<f64>,
    pub pout:    Option<f64>,
    /// Conversion efficiency as a fraction in `[0, 1]`.
    pub eff:     Option<f64>,
    /// Logging status string (`"ON"` / `"OFF"`).
    pub logging: Option<String>,
}

impl TelemetryFrame {
    /// Efficiency in percent.
    pub fn efficiency_percent(&self) -> Option<f64> {
        self.eff.map(|e| e * 100.0)
    }
}

/// One-shot measurement snapshot from the device's polling endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub vin:  Option<f64>,
    pub iin:  Option<f64>,
    pub vout: Option<f64>,
    pub iout: Option<f64>,
    pub pin:  Option<f64>,
    pub pout: Option<f64>,
    /// Already in percent, rounded to one decimal by the firmware.
    pub eff:  Option<f64>,
}

/// PWM slider model: bounds come from telemetry, the value follows the
/// device unless the user is dragging the handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliderState {
    pub min:      Option<f64>,
    pub max:      Option<f64>,
    pub value:    Option<f64>,
    pub dragging: bool,
}

/// Central UI state; panels read from this snapshot.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    /// Most recent telemetry frame.
    pub frame:      TelemetryFrame,
    /// Live operating points for the chart overlay.
    pub history:    LiveHistory,
    /// Latest sweep poll result.
    pub sweep:      SweepSummary,
    pub slider:     SliderState,
    /// Whether the telemetry feed is currently connected.
    pub connected:  bool,
    /// Local time of the last telemetry frame.
    pub updated_at: Option<DateTime<Local>>,
}

impl DisplayState {
    /// Fold a telemetry frame into the state.
    pub fn apply_frame(&mut self, frame: TelemetryFrame) {
        if let Some(min) = frame.pwm_min {
            self.slider.min = Some(min);
        }
        if let Some(max) = frame.pwm_max {
            self.slider.max = Some(max);
        }
        if !self.slider.dragging {
            if let Some(pwm) = frame.pwm.filter(|p| p.is_finite()) {
                self.slider.value = Some(pwm);
            }
        }

        if let (Some(vin), Some(iin)) = (frame.vin, frame.iin) {
            self.history.record(vin, iin);
        }

        self.frame = frame;
        self.updated_at = Some(Local::now());
    }

    /// One-line summary of the feed, e.g.
    /// `telemetry connected, mode AUTO, last frame 14:02:11, 10 live points`.
    pub fn status_line(&self) -> String {
        let link = if self.connected { "connected" } else { "disconnected" };
        let mode = self.frame.mode.as_ref().map_or(MISSING, Mode::label);
        let updated = self
            .updated_at
            .map_or_else(|| MISSING.to_string(), |t| t.format("%H:%M:%S").to_string());
        format!(
            "telemetry {link}, mode {mode}, last frame {updated}, {} live points",
            self.history.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_label_normalises() {
        assert_eq!(Mode::from_label("auto"), Mode::Auto);
        assert_eq!(Mode::from_label("Manually"), Mode::Manual);
        assert_eq!(Mode::from_label("IV_SWEEP"), Mode::IvSweep);
        assert_eq!(Mode::from_label("unknown"), Mode::Other("UNKNOWN".into()));
    }

    #[test]
    fn mode_from_legacy_number() {
        assert_eq!(Mode::from_legacy(1.0), Mode::Auto);
        assert_eq!(Mode::from_legacy(0.0), Mode::Manual);
        assert_eq!(Mode::from_legacy(2.0).label(), "2");
    }

    #[test]
    fn toggle_never_targets_sweep() {
        assert_eq!(Mode::Auto.toggle_target(), Mode::Manual);
        assert_eq!(Mode::Manual.toggle_target(), Mode::Auto);
        assert_eq!(Mode::IvSweep.toggle_target(), Mode::Auto);
    }

    #[test]
    fn dragging_slider_is_not_overwritten() {
        let mut state = DisplayState::default();
        state.apply_frame(TelemetryFrame { pwm: Some(40.0), pwm_max: Some(95.0), ..Default::default() });
        assert_eq!(state.slider.value, Some(40.0));

        state.slider.dragging = true;
        state.apply_frame(TelemetryFrame { pwm: Some(55.0), pwm_min: Some(5.0), ..Default::default() });
        assert_eq!(state.slider.value, Some(40.0));
        assert_eq!(state.slider.min, Some(5.0));
        assert_eq!(state.slider.max, Some(95.0));
    }

    #[test]
    fn frame_records_live_point() {
        let mut state = DisplayState::default();
        state.apply_frame(TelemetryFrame { vin: Some(18.0), iin: Some(0.8), ..Default::default() });
        state.apply_frame(TelemetryFrame { vin: Some(18.2), ..Default::default() });
        assert_eq!(state.history.len(), 1);
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn status_line_reports_link_and_history() {
        let mut state = DisplayState::default();
        assert_eq!(
            state.status_line(),
            "telemetry disconnected, mode --, last frame --, 0 live points"
        );

        state.connected = true;
        state.apply_frame(TelemetryFrame {
            vin: Some(12.0),
            iin: Some(0.4),
            mode: Some(Mode::Manual),
            ..Default::default()
        });
        let line = state.status_line();
        assert!(line.starts_with("telemetry connected, mode MANUAL, last frame "));
        assert!(line.ends_with(", 1 live points"));
        assert!(!line.contains("last frame --"));
    }
}
