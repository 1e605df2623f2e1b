//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::data::{AxisPosition, CoordinateMode};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Serial connection events
    Connection(ConnectionEvent),
    /// Believed machine state changes
    Machine(MachineEvent),
    /// Outbound / inbound wire traffic
    Communication(CommunicationEvent),
    /// Scene and history changes
    Designer(DesignerEvent),
    /// User-visible errors
    Error(ErrorEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Connection(_) => EventCategory::Connection,
            AppEvent::Machine(_) => EventCategory::Machine,
            AppEvent::Communication(_) => EventCategory::Communication,
            AppEvent::Designer(_) => EventCategory::Designer,
            AppEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Connection(e) => e.description(),
            AppEvent::Machine(e) => e.description(),
            AppEvent::Communication(e) => e.description(),
            AppEvent::Designer(e) => e.description(),
            AppEvent::Error(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Serial connection events.
    Connection,
    /// Machine state events.
    Machine,
    /// Wire traffic events.
    Communication,
    /// Scene and history events.
    Designer,
    /// Error events.
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Connection => write!(f, "Connection"),
            EventCategory::Machine => write!(f, "Machine"),
            EventCategory::Communication => write!(f, "Communication"),
            EventCategory::Designer => write!(f, "Designer"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// Connection-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConnectionEvent {
    /// Port opened and reader/writer tasks started.
    Connected {
        /// Serial port path.
        port: String,
        /// Baud rate in use.
        baud_rate: u32,
    },
    /// Port released.
    Disconnected {
        /// Serial port path.
        port: String,
    },
    /// Port could not be acquired; motion features are disabled.
    ConnectionFailed {
        /// Serial port path.
        port: String,
        /// Error message describing the failure.
        error: String,
    },
}

impl ConnectionEvent {
    fn description(&self) -> String {
        match self {
            ConnectionEvent::Connected { port, baud_rate } => {
                format!("Connected to {} @ {} baud", port, baud_rate)
            }
            ConnectionEvent::Disconnected { port } => format!("Disconnected from {}", port),
            ConnectionEvent::ConnectionFailed { port, error } => {
                format!("Connection failed to {}: {}", port, error)
            }
        }
    }
}

/// Machine state events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MachineEvent {
    /// A complete position report was applied.
    PositionUpdated {
        /// New believed position.
        position: AxisPosition,
    },
    /// Home command issued; position optimistically reset.
    HomingStarted,
    /// Emergency stop issued.
    EmergencyStop,
    /// Jog coordinate mode changed.
    ModeChanged {
        /// The new mode.
        mode: CoordinateMode,
    },
    /// Jog step or feed changed.
    JogParametersChanged {
        /// Step size.
        step_size: f64,
        /// Feed rate.
        feed_rate: u32,
    },
}

impl MachineEvent {
    fn description(&self) -> String {
        match self {
            MachineEvent::PositionUpdated { position } => format!("Position: {}", position),
            MachineEvent::HomingStarted => "Homing started".to_string(),
            MachineEvent::EmergencyStop => "Emergency stop".to_string(),
            MachineEvent::ModeChanged { mode } => format!("Jog mode: {}", mode),
            MachineEvent::JogParametersChanged {
                step_size,
                feed_rate,
            } => format!("Jog step {} @ F{}", step_size, feed_rate),
        }
    }
}

/// Communication layer events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommunicationEvent {
    /// Command queued for the writer.
    CommandQueued {
        /// The command line without terminator.
        command: String,
    },
    /// Line received from the machine.
    ResponseReceived {
        /// The received line.
        line: String,
    },
}

impl CommunicationEvent {
    fn description(&self) -> String {
        match self {
            CommunicationEvent::CommandQueued { command } => format!("> {}", command),
            CommunicationEvent::ResponseReceived { line } => format!("< {}", line),
        }
    }
}

/// Scene and history events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DesignerEvent {
    /// The live scene was replaced from history or a document.
    SceneChanged {
        /// Number of objects restored.
        restored: usize,
        /// Number of records skipped as unreadable.
        skipped: usize,
    },
    /// A snapshot was recorded.
    SnapshotRecorded {
        /// History length after the push.
        depth: usize,
    },
    /// Undo or redo had nothing to do.
    NothingToDo {
        /// Human readable reason.
        message: String,
    },
}

impl DesignerEvent {
    fn description(&self) -> String {
        match self {
            DesignerEvent::SceneChanged { restored, skipped } => {
                format!("Scene restored: {} objects, {} skipped", restored, skipped)
            }
            DesignerEvent::SnapshotRecorded { depth } => format!("Snapshot recorded ({})", depth),
            DesignerEvent::NothingToDo { message } => message.clone(),
        }
    }
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Informational.
    Info,
    /// Warning, operation continued.
    Warning,
    /// Error, operation dropped.
    Error,
}

/// Error events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ErrorEvent {
    /// A command could not be written to the port.
    TransportFailed {
        /// The command that was dropped.
        command: String,
        /// Failure reason.
        message: String,
    },
    /// Generic error for the user.
    General {
        /// Severity level.
        severity: ErrorSeverity,
        /// Error message.
        message: String,
    },
}

impl ErrorEvent {
    fn description(&self) -> String {
        match self {
            ErrorEvent::TransportFailed { command, message } => {
                format!("Failed to send '{}': {}", command, message)
            }
            ErrorEvent::General { severity, message } => format!("{:?}: {}", severity, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let event = AppEvent::Machine(MachineEvent::HomingStarted);
        assert_eq!(event.category(), EventCategory::Machine);

        let event = AppEvent::Designer(DesignerEvent::SnapshotRecorded { depth: 3 });
        assert_eq!(event.category(), EventCategory::Designer);
        assert_eq!(event.description(), "Snapshot recorded (3)");
    }

    #[test]
    fn test_position_description() {
        let event = AppEvent::Machine(MachineEvent::PositionUpdated {
            position: AxisPosition::new(12.5, 0.0, 5.0),
        });
        assert_eq!(event.description(), "Position: X:12.500 Y:0.000 Z:5.000");
    }

    #[test]
    fn test_event_serializes_to_json() {
        let event = AppEvent::Connection(ConnectionEvent::Connected {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"baud_rate\":115200"));

        let back: AppEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.category(), EventCategory::Connection);
    }
}
