use edugrid_core::{state::DisplayState, Field, FieldSink};

/// I-V / P-V chart data and the MPP info line.
#[derive(Debug, Default)]
pub struct SweepPanel;

impl SweepPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        sink.set_sweep(&state.sweep);
        sink.set_field(Field::MppInfo, state.sweep.mpp_label());
    }
}
