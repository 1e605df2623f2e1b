//! Serial link to the controller
//!
//! - `serial`: port discovery, acquisition and line framing
//! - `transport`: single-writer command queue and response reader

pub mod serial;
pub mod transport;

/// Parameters used to open the serial port
///
/// Fixed for the lifetime of a session; nothing is renegotiated at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout; bounds how long the reader waits before checking for shutdown
    pub read_timeout_ms: u64,
    /// Use hardware (RTS/CTS) flow control
    pub flow_control: bool,
}

impl ConnectionParams {
    /// Create serial parameters for a port and baud rate
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ..Self::default()
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115200,
            read_timeout_ms: 50,
            flow_control: false,
        }
    }
}
