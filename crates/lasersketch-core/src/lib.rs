//! # LaserSketch Core
//!
//! Core types shared by every LaserSketch crate.
//! Provides the machine state model, the error taxonomy and the
//! per-session event bus.

pub mod data;
pub mod error;
pub mod event_bus;

pub use data::{AxisPosition, Axis, CoordinateMode, Direction, MachineState};

pub use error::{ConnectionError, Error, MachineError, Result};

pub use event_bus::{
    AppEvent, CommunicationEvent, ConnectionEvent, DesignerEvent, ErrorEvent, ErrorSeverity,
    EventBus, EventBusConfig, EventCategory, EventFilter, MachineEvent, SubscriptionId,
};
