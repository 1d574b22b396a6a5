use edugrid_core::{format::MISSING, state::DisplayState, Field, FieldSink, Mode};

/// Shows the converter mode; clicking it requests the other regular mode.
#[derive(Debug, Default)]
pub struct ModePanel;

impl ModePanel {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        let label = state
            .frame
            .mode
            .as_ref()
            .map_or(MISSING, Mode::label)
            .to_string();
        sink.set_field(Field::Mode, label);
    }

    /// Mode to request on click. Derived from what is displayed, so an
    /// unknown or missing mode asks for `AUTO`.
    pub fn next_mode_request(&self, state: &DisplayState) -> Mode {
        state
            .frame
            .mode
            .as_ref()
            .map_or(Mode::Auto, Mode::toggle_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugrid_core::{MemorySink, TelemetryFrame};

    fn state_in(mode: Option<Mode>) -> DisplayState {
        let mut state = DisplayState::default();
        state.apply_frame(TelemetryFrame { mode, ..Default::default() });
        state
    }

    #[test]
    fn renders_mode_label() {
        let mut sink = MemorySink::new();
        ModePanel::new().render(&state_in(Some(Mode::IvSweep)), &mut sink);
        assert_eq!(sink.field(Field::Mode), Some("IV_SWEEP"));

        ModePanel::new().render(&state_in(None), &mut sink);
        assert_eq!(sink.field(Field::Mode), Some("--"));
    }

    #[test]
    fn click_requests_other_regular_mode() {
        let panel = ModePanel::new();
        assert_eq!(panel.next_mode_request(&state_in(Some(Mode::Auto))), Mode::Manual);
        assert_eq!(panel.next_mode_request(&state_in(Some(Mode::Manual))), Mode::Auto);
        assert_eq!(panel.next_mode_request(&state_in(None)), Mode::Auto);
    }
}
