use edugrid_core::{format::MISSING, state::DisplayState, Field, FieldSink};

/// SD-card logging status as reported by the firmware (`ON` / `OFF`).
#[derive(Debug, Default)]
pub struct LoggingPanel;

impl LoggingPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        let label = state.frame.logging.clone().unwrap_or_else(|| MISSING.to_string());
        sink.set_field(Field::Logging, label);
    }
}
