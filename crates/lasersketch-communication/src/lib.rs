//! # LaserSketch Communication
//!
//! Serial transport and firmware protocol support for LaserSketch.
//! The transport funnels every outbound line through one writer task and
//! reads newline-delimited responses on a dedicated reader task. The
//! `firmware::marlin` module turns jog intent into G-code and parses the
//! machine's `M114` position reports.

pub mod communication;
pub mod error;
pub mod firmware;

pub use communication::{
    serial::{list_ports, open_serial_port, send_line, SerialPortInfo},
    transport::{CommandSender, SerialTransport, TransportEvent, TransportHandles},
    ConnectionParams,
};

pub use error::TransportError;

pub use firmware::marlin::{
    classify_report, parse_position_report, MotionEncoder, MoveRequest, PositionTracker,
    ReportLine, TelemetryUpdate, TrackerConfig,
};
