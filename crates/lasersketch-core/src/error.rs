//! Error handling for LaserSketch
//!
//! Provides the error types shared across crates:
//! - Connection errors (port acquisition, serial I/O)
//! - Machine errors (invalid jog parameters)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents failures to acquire or talk to the serial device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// Port not found
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Port is already owned by another process or session
    #[error("Port already in use: {port}")]
    PortInUse {
        /// The name of the port that is in use.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Connection lost
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// Baud rate not supported
    #[error("Baud rate {baud} not supported")]
    UnsupportedBaudRate {
        /// The unsupported baud rate.
        baud: u32,
    },

    /// Motion features are unavailable because no port is attached
    #[error("Not connected")]
    NotConnected,
}

/// Machine parameter errors
///
/// Raised when the user enters jog parameters the encoder must never see.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    /// Step size must be a positive, finite number
    #[error("Invalid step size {0}: must be greater than zero")]
    InvalidStepSize(f64),

    /// Feed rate must be a positive integer
    #[error("Invalid feed rate {0}: must be greater than zero")]
    InvalidFeedRate(i64),

    /// Axis letter not recognised
    #[error("Unknown axis '{0}'")]
    UnknownAxis(String),

    /// Direction token not recognised
    #[error("Unknown direction '{0}'")]
    UnknownDirection(String),

    /// Coordinate mode not recognised
    #[error("Unknown coordinate mode '{0}'")]
    UnknownMode(String),
}

/// Main error type for LaserSketch
///
/// A unified error type that can represent any core error.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Machine parameter error
    #[error(transparent)]
    Machine(#[from] MachineError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a machine parameter error
    pub fn is_machine_error(&self) -> bool {
        matches!(self, Error::Machine(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
