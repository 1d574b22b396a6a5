use crate::{history::OperatingPoint, sweep::SweepSummary};
use std::collections::HashMap;

/// Named display fields, matching the element ids of the device's web page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    VoltageIn,
    CurrentIn,
    VoltageOut,
    CurrentOut,
    PowerIn,
    PowerOut,
    Efficiency,
    Pwm,
    Frequency,
    Mode,
    Logging,
    MppInfo,
    SliderMin,
    SliderMax,
    SliderValue,
}

impl Field {
    pub fn id(self) -> &'static str {
        match self {
            Field::VoltageIn   => "voltage_in_label",
            Field::CurrentIn   => "current_in_label",
            Field::VoltageOut  => "voltage_out_label",
            Field::CurrentOut  => "current_out_label",
            Field::PowerIn     => "power_in_label",
            Field::PowerOut    => "power_out_label",
            Field::Efficiency  => "efficiency_label",
            Field::Pwm         => "pwm_label",
            Field::Frequency   => "freq_label",
            Field::Mode        => "mode_label",
            Field::Logging     => "logging_label",
            Field::MppInfo     => "mppInfo",
            Field::SliderMin   => "4.min",
            Field::SliderMax   => "4.max",
            Field::SliderValue => "4.value",
        }
    }
}

/// Rendering target for the session.
///
/// Everything the session computes reaches the outside world through this
/// trait, so the pure logic never touches a concrete display.
pub trait FieldSink: Send {
    /// Replace the text of one display field.
    fn set_field(&mut self, field: Field, value: String);

    /// Replace the live operating-point overlay (oldest first).
    fn set_live_points(&mut self, _points: &[OperatingPoint]) {}

    /// Replace the sweep curves and MPP marker.
    fn set_sweep(&mut self, _summary: &SweepSummary) {}
}

/// A sink that just remembers what it was told. Useful in tests and for
/// one-shot CLI commands that print the final state.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub fields:      HashMap<Field, String>,
    pub live_points: Vec<OperatingPoint>,
    pub sweep:       Option<SweepSummary>,
    /// Number of `set_field` calls received.
    pub writes:      usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

impl FieldSink for MemorySink {
    fn set_field(&mut self, field: Field, value: String) {
        self.writes += 1;
        self.fields.insert(field, value);
    }

    fn set_live_points(&mut self, points: &[OperatingPoint]) {
        self.live_points = points.to_vec();
    }

    fn set_sweep(&mut self, summary: &SweepSummary) {
        self.sweep = Some(summary.clone());
    }
}
