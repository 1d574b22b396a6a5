pub mod error;
pub mod event;
pub mod format;
pub mod history;
pub mod sink;
pub mod state;
pub mod sweep;

pub use error::{Result, UiError};
pub use event::Message;
pub use history::{LiveHistory, OperatingPoint, LIVE_HISTORY_CAPACITY};
pub use sink::{Field, FieldSink, MemorySink};
pub use state::{DisplayState, Mode, Snapshot, TelemetryFrame};
pub use sweep::{summarize, CurvePoint, MaxPowerPoint, SweepSample, SweepSummary};
