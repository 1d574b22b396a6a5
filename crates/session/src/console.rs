use edugrid_core::{Field, FieldSink, OperatingPoint, SweepSummary};
use std::collections::HashMap;
use tracing::{debug, info};

/// Headless sink: logs a field only when its text changes.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last: HashMap<Field, String>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldSink for ConsoleSink {
    fn set_field(&mut self, field: Field, value: String) {
        if self.last.get(&field) == Some(&value) {
            return;
        }
        info!(target: "edugrid::display", "{:<18} {value}", field.id());
        self.last.insert(field, value);
    }

    fn set_live_points(&mut self, points: &[OperatingPoint]) {
        if let Some(p) = points.last() {
            debug!(
                target: "edugrid::display",
                "live point {:.2} V / {:.3} A ({} kept)",
                p.voltage,
                p.current,
                points.len()
            );
        }
    }

    fn set_sweep(&mut self, summary: &SweepSummary) {
        debug!(
            target: "edugrid::display",
            "sweep: {} I-V points, {} P-V points",
            summary.iv_curve.len(),
            summary.pv_curve.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_last_value_per_field() {
        let mut sink = ConsoleSink::new();
        sink.set_field(Field::Mode, "AUTO".into());
        sink.set_field(Field::Mode, "AUTO".into());
        sink.set_field(Field::Logging, "OFF".into());
        assert_eq!(sink.last.len(), 2);
        assert_eq!(sink.last.get(&Field::Mode).map(String::as_str), Some("AUTO"));
    }
}
