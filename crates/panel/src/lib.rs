pub mod logging;
pub mod measurements;
pub mod mode;
pub mod pwm;
pub mod sweep;

pub use logging::LoggingPanel;
pub use measurements::MeasurementsPanel;
pub use mode::ModePanel;
pub use pwm::PwmPanel;
pub use sweep::SweepPanel;

use edugrid_core::{state::DisplayState, FieldSink};

/// Every telemetry-driven panel on the page, rendered together on each frame.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub measurements: MeasurementsPanel,
    pub pwm:          PwmPanel,
    pub mode:         ModePanel,
    pub logging:      LoggingPanel,
    pub sweep:        SweepPanel,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the telemetry panels and the live operating points.
    pub fn render_telemetry(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        self.pwm.render(state, sink);
        self.mode.render(state, sink);
        self.measurements.render(state, sink);
        self.logging.render(state, sink);
        sink.set_live_points(&state.history.points());
    }

    /// Push the sweep chart and MPP line.
    pub fn render_sweep(&self, state: &DisplayState, sink: &mut dyn FieldSink) {
        self.sweep.render(state, sink);
    }
}
