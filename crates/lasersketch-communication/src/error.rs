//! Error types for the communication crate.

use lasersketch_core::ConnectionError;
use thiserror::Error;

/// Errors raised while moving bytes to or from the controller.
///
/// A failed write is reported once and the command is dropped; it is never
/// retried because a repeated motion line could move the machine twice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The port rejected a write or flush.
    #[error("Failed to write '{line}': {reason}")]
    Write { line: String, reason: String },

    /// The writer task has stopped; nothing more can be sent.
    #[error("Transport closed")]
    Closed,

    /// The port could not be acquired.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl TransportError {
    /// Build a write error from an I/O failure
    pub fn write(line: &str, err: &std::io::Error) -> Self {
        TransportError::Write {
            line: line.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device unplugged");
        let err = TransportError::write("G28", &io_err);
        assert_eq!(err.to_string(), "Failed to write 'G28': device unplugged");
        assert_eq!(TransportError::Closed.to_string(), "Transport closed");
    }

    #[test]
    fn test_connection_error_conversion() {
        let err: TransportError = ConnectionError::NotConnected.into();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
