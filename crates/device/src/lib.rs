//! Transport to the EduGrid trainer: HTTP control/sweep/file API and the
//! telemetry WebSocket.

pub mod client;
pub mod payload;
pub mod telemetry;

pub use client::{update_query, ControlId, DeviceClient};
pub use payload::{parse_file_list, parse_snapshot, parse_sweep, parse_telemetry, DeviceFile, SweepData};
pub use telemetry::{TelemetryEvent, TelemetryListener};
