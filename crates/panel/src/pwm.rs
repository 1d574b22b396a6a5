use edugrid_core::{
    format::{format_duty, format_frequency},
    state::DisplayState,
    Field, FieldSink,
};

/// PWM duty label, switching frequency and the duty slider.
///
/// The slider value is left alone while the user is dragging it so the feed
/// doesn't fight the pointer.
#[derive(Debug, Default)]
pub struct PwmPanel;

impl PwmPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        sink.set_field(Field::Pwm, format_duty(state.frame.pwm));
        sink.set_field(Field::Frequency, format_frequency(state.frame.freq_hz));

        let slider = &state.slider;
        if let Some(min) = slider.min {
            sink.set_field(Field::SliderMin, min.to_string());
        }
        if let Some(max) = slider.max {
            sink.set_field(Field::SliderMax, max.to_string());
        }
        if !slider.dragging {
            if let Some(value) = slider.value {
                sink.set_field(Field::SliderValue, value.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugrid_core::{MemorySink, TelemetryFrame};

    fn state_with(frame: TelemetryFrame) -> DisplayState {
        let mut state = DisplayState::default();
        state.apply_frame(frame);
        state
    }

    #[test]
    fn renders_duty_frequency_and_slider() {
        let state = state_with(TelemetryFrame {
            pwm: Some(42.0),
            pwm_min: Some(5.0),
            pwm_max: Some(95.0),
            freq_hz: Some(40_000.0),
            ..Default::default()
        });
        let mut sink = MemorySink::new();
        PwmPanel::new().render(&state, &mut sink);

        assert_eq!(sink.field(Field::Pwm), Some("42 %"));
        assert_eq!(sink.field(Field::Frequency), Some("40000 Hz"));
        assert_eq!(sink.field(Field::SliderMin), Some("5"));
        assert_eq!(sink.field(Field::SliderMax), Some("95"));
        assert_eq!(sink.field(Field::SliderValue), Some("42"));
    }

    #[test]
    fn slider_value_untouched_while_dragging() {
        let mut state = state_with(TelemetryFrame { pwm: Some(42.0), ..Default::default() });
        state.slider.dragging = true;
        let mut sink = MemorySink::new();
        PwmPanel::new().render(&state, &mut sink);

        assert_eq!(sink.field(Field::SliderValue), None);
        assert_eq!(sink.field(Field::Pwm), Some("42 %"));
    }

    #[test]
    fn missing_values_render_placeholder() {
        let mut sink = MemorySink::new();
        PwmPanel::new().render(&DisplayState::default(), &mut sink);
        assert_eq!(sink.field(Field::Pwm), Some("--"));
        assert_eq!(sink.field(Field::Frequency), Some("--"));
    }
}
