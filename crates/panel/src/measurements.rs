use edugrid_core::{
    format::{format_current, format_percent, format_power, format_voltage},
    state::DisplayState,
    Field, FieldSink,
};

/// Input/output voltage, current, power and conversion efficiency.
#[derive(Debug, Default)]
pub struct MeasurementsPanel;

impl MeasurementsPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        let f = &state.frame;
        sink.set_field(Field::VoltageIn,  format_voltage(f.vin));
        sink.set_field(Field::CurrentIn,  format_current(f.iin));
        sink.set_field(Field::VoltageOut, format_voltage(f.vout));
        sink.set_field(Field::CurrentOut, format_current(f.iout));
        sink.set_field(Field::PowerIn,    format_power(f.pin));
        sink.set_field(Field::PowerOut,   format_power(f.pout));
        sink.set_field(Field::Efficiency, format_percent(f.efficiency_percent()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugrid_core::{MemorySink, TelemetryFrame};

    #[test]
    fn renders_all_measurements() {
        let mut state = DisplayState::default();
        state.apply_frame(TelemetryFrame {
            vin: Some(18.0),
            iin: Some(0.75),
            pout: Some(12.5),
            eff: Some(0.934),
            ..Default::default()
        });

        let mut sink = MemorySink::new();
        MeasurementsPanel::new().render(&state, &mut sink);

        assert_eq!(sink.field(Field::VoltageIn), Some("18.00 V"));
        assert_eq!(sink.field(Field::CurrentIn), Some("0.750 A"));
        assert_eq!(sink.field(Field::PowerOut), Some("12.50 W"));
        assert_eq!(sink.field(Field::Efficiency), Some("93.4 %"));
        assert_eq!(sink.field(Field::VoltageOut), Some("--"));
    }
}
