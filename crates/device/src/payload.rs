//! Decoding of the JSON documents served by the EduGrid firmware.
//!
//! The firmware has shipped several payload shapes over time (numeric vs.
//! string mode, PWM as `"42 %"` with a separate `pwm_raw`, frequency in kHz as
//! a string). Decoding is lenient: a field that can't be read becomes `None`
//! (or NaN inside sweep arrays) instead of failing the whole record.

use edugrid_core::{summarize, Mode, Result, Snapshot, SweepSummary, TelemetryFrame, UiError};
use serde::Serialize;
use serde_json::{Map, Value};

/// Decode one telemetry record from the WebSocket feed.
///
/// Fails only when the text is not a JSON object.
pub fn parse_telemetry(text: &str) -> Result<TelemetryFrame> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| UiError::Decode(format!("telemetry: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(UiError::Decode("telemetry: expected a JSON object".into()));
    };

    Ok(TelemetryFrame {
        pwm:     number_field(&obj, "pwm_raw").or_else(|| number_field(&obj, "pwm")),
        pwm_min: number_field(&obj, "pwm_min"),
        pwm_max: number_field(&obj, "pwm_max"),
        freq_hz: number_field(&obj, "freq_hz").or_else(|| obj.get("freq").and_then(khz_label)),
        mode:    obj.get("mode").and_then(parse_mode),
        vin:     number_field(&obj, "vin"),
        iin:     number_field(&obj, "iin"),
        vout:    number_field(&obj, "vout"),
        iout:    number_field(&obj, "iout"),
        pin:     number_field(&obj, "pin"),
        pout:    number_field(&obj, "pout"),
        eff:     number_field(&obj, "eff"),
        logging: obj.get("logging").and_then(text_value),
    })
}

/// Response of the sweep data endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepData {
    pub voltages:    Vec<f64>,
    pub currents:    Vec<f64>,
    pub powers:      Vec<f64>,
    pub in_progress: bool,
    pub done:        bool,
}

impl SweepData {
    /// Curves and MPP for this poll.
    pub fn summary(&self) -> SweepSummary {
        summarize(&self.voltages, &self.currents, &self.powers)
    }
}

/// Decode the sweep data document. A missing or non-array `v`/`i`/`p` reads
/// as an empty array; unreadable entries read as NaN.
pub fn parse_sweep(text: &str) -> Result<SweepData> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| UiError::Decode(format!("sweep data: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(UiError::Decode("sweep data: expected a JSON object".into()));
    };

    Ok(SweepData {
        voltages:    number_array(&obj, "v"),
        currents:    number_array(&obj, "i"),
        powers:      number_array(&obj, "p"),
        in_progress: flag(&obj, "in_progress"),
        done:        flag(&obj, "done"),
    })
}

/// Decode the one-shot measurement snapshot.
pub fn parse_snapshot(text: &str) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| UiError::Decode(format!("snapshot: {e}")))?;
    let Value::Object(obj) = value else {
        return Err(UiError::Decode("snapshot: expected a JSON object".into()));
    };

    Ok(Snapshot {
        vin:  number_field(&obj, "vin"),
        iin:  number_field(&obj, "iin"),
        vout: number_field(&obj, "vout"),
        iout: number_field(&obj, "iout"),
        pin:  number_field(&obj, "pin"),
        pout: number_field(&obj, "pout"),
        eff:  number_field(&obj, "eff"),
    })
}

/// One file on the device's flash, as listed by `/listfiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceFile {
    /// Absolute path on the device, e.g. `/log/log_0001.csv`.
    pub path: String,
    /// Size as the firmware prints it (`"812 B"`, `"1.25 KB"`).
    pub size: String,
}

/// Pull the file rows out of the HTML table served by `/listfiles`.
///
/// Each row starts with `<tr align='left'><td>PATH</td><td>SIZE</td>`; the
/// header row uses `<th>` cells and is skipped.
pub fn parse_file_list(html: &str) -> Vec<DeviceFile> {
    html.split("<tr")
        .skip(1)
        .filter_map(|row| {
            let mut cells = row.split("<td>").skip(1).map(|cell| {
                cell.split("</td>").next().unwrap_or(cell).trim().to_string()
            });
            let path = cells.next().filter(|p| !p.is_empty())?;
            let size = cells.next().unwrap_or_default();
            Some(DeviceFile { path, size })
        })
        .collect()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A JSON number, or a string holding nothing but a number.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(number)
}

fn number_array(obj: &Map<String, Value>, key: &str) -> Vec<f64> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| number(v).unwrap_or(f64::NAN))
            .collect(),
        _ => Vec::new(),
    }
}

/// Truthiness as the firmware's own page reads it: `true`, a non-zero
/// number, a non-empty string or any array/object.
fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_mode(value: &Value) -> Option<Mode> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Mode::from_label(s)),
        Value::Number(n) => n.as_f64().map(Mode::from_legacy),
        other => Some(Mode::Other(other.to_string())),
    }
}

/// Older firmware reports frequency as a label such as `"31.25 kHz"`.
fn khz_label(value: &Value) -> Option<f64> {
    let s = value.as_str()?.trim();
    let khz = s.strip_suffix("kHz")?.trim().parse::<f64>().ok()?;
    Some(khz * 1000.0)
}
