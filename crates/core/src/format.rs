//! Display formatting for measured values.
//!
//! Every formatter renders a missing or non-finite value as [`MISSING`].

/// Placeholder for values that are absent or not finite.
pub const MISSING: &str = "--";

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `"12.34 V"`
pub fn format_voltage(value: Option<f64>) -> String {
    finite(value).map_or_else(|| MISSING.into(), |v| format!("{v:.2} V"))
}

/// `"1.234 A"`
pub fn format_current(value: Option<f64>) -> String {
    finite(value).map_or_else(|| MISSING.into(), |a| format!("{a:.3} A"))
}

/// `"15.00 W"`
pub fn format_power(value: Option<f64>) -> String {
    finite(value).map_or_else(|| MISSING.into(), |w| format!("{w:.2} W"))
}

/// `"93.4 %"`
pub fn format_percent(value: Option<f64>) -> String {
    finite(value).map_or_else(|| MISSING.into(), |x| format!("{x:.1} %"))
}

/// PWM duty cycle, whole percent: `"42 %"`
pub fn format_duty(value: Option<f64>) -> String {
    finite(value).map_or_else(|| MISSING.into(), |x| format!("{x:.0} %"))
}

/// Switching frequency; one decimal below 100 Hz, none above.
pub fn format_frequency(value: Option<f64>) -> String {
    match finite(value) {
        Some(hz) if hz >= 100.0 => format!("{hz:.0} Hz"),
        Some(hz) => format!("{hz:.1} Hz"),
        None => MISSING.into(),
    }
}
