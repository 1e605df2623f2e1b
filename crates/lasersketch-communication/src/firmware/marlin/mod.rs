//! Marlin-style G-code protocol
//!
//! - `command_creator`: jog, home, emergency stop and position query commands
//! - `position_parser`: `M114` report parsing
//! - `position_tracker`: periodic polling and telemetry delivery

pub mod command_creator;
pub mod position_parser;
pub mod position_tracker;

pub use command_creator::{
    MotionEncoder, MoveRequest, ABSOLUTE_MODE, EMERGENCY_STOP, HOME, POSITION_QUERY,
    RELATIVE_MODE,
};
pub use position_parser::{classify_report, parse_position_report, ReportLine};
pub use position_tracker::{PositionTracker, TelemetryUpdate, TrackerConfig};
