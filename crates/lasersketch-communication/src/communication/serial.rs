//! Serial port communication implementation
//!
//! Provides low-level serial port operations for direct hardware connection
//! to the controller via USB:
//! - Port enumeration filtered to plausible controller devices
//! - Exclusive port acquisition with a cloned read handle
//! - Line framing for outbound commands

use crate::communication::ConnectionParams;
use crate::error::TransportError;
use lasersketch_core::ConnectionError;
use std::io::{Read, Write};
use std::time::Duration;

/// Line terminator appended to every outbound command
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Longest partial line kept while waiting for its terminator
pub const MAX_PARTIAL_LINE: usize = 4096;

/// Write half of an open port
pub type PortWriter = Box<dyn Write + Send>;

/// Read half of an open port
pub type PortReader = Box<dyn Read + Send>;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

/// List serial ports that look like a CNC or laser controller
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::FailedToOpen {
            port: "*".to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_valid_cnc_port(&port.port_name))
        .map(|port| match &port.port_type {
            serialport::SerialPortType::UsbPort(usb) => SerialPortInfo {
                port_name: port.port_name.clone(),
                description: format!(
                    "USB {} {}",
                    usb.manufacturer.as_deref().unwrap_or("Device"),
                    usb.product.as_deref().unwrap_or("Serial Port")
                ),
                vid: Some(usb.vid),
                pid: Some(usb.pid),
            },
            _ => SerialPortInfo {
                port_name: port.port_name.clone(),
                description: "Serial Port".to_string(),
                vid: None,
                pid: None,
            },
        })
        .collect())
}

/// Check if a port name matches controller patterns
///
/// - Windows: COM1, COM2, ...
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn is_valid_cnc_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

/// Open the port exclusively and split it into write and read halves
///
/// Only one session may own the port. Failure here disables motion features
/// but is not fatal to the rest of the application.
pub fn open_serial_port(
    params: &ConnectionParams,
) -> Result<(PortWriter, PortReader), ConnectionError> {
    if params.baud_rate == 0 {
        return Err(ConnectionError::UnsupportedBaudRate {
            baud: params.baud_rate,
        });
    }

    let port = serialport::new(&params.port, params.baud_rate)
        .timeout(Duration::from_millis(params.read_timeout_ms.max(1)))
        .data_bits(serialport::DataBits::Eight)
        .stop_bits(serialport::StopBits::One)
        .parity(serialport::Parity::None)
        .flow_control(if params.flow_control {
            serialport::FlowControl::Hardware
        } else {
            serialport::FlowControl::None
        })
        .open()
        .map_err(|e| {
            tracing::warn!("Failed to open serial port {}: {}", params.port, e);
            map_open_error(&params.port, e)
        })?;

    let reader = port.try_clone().map_err(|e| ConnectionError::FailedToOpen {
        port: params.port.clone(),
        reason: format!("cannot clone read handle: {}", e),
    })?;

    tracing::info!("Opened {} @ {} baud", params.port, params.baud_rate);
    Ok((Box::new(port), Box::new(reader)))
}

fn map_open_error(port: &str, err: serialport::Error) -> ConnectionError {
    match err.kind {
        serialport::ErrorKind::NoDevice => ConnectionError::PortNotFound {
            port: port.to_string(),
        },
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
            ConnectionError::PortNotFound {
                port: port.to_string(),
            }
        }
        serialport::ErrorKind::Io(std::io::ErrorKind::AddrInUse)
        | serialport::ErrorKind::Io(std::io::ErrorKind::ResourceBusy) => {
            ConnectionError::PortInUse {
                port: port.to_string(),
            }
        }
        _ => ConnectionError::FailedToOpen {
            port: port.to_string(),
            reason: err.description,
        },
    }
}

/// Write one command line: append the terminator, write, flush
pub fn send_line(writer: &mut dyn Write, line: &str) -> Result<(), TransportError> {
    writer
        .write_all(line.as_bytes())
        .and_then(|_| writer.write_all(LINE_TERMINATOR))
        .and_then(|_| writer.flush())
        .map_err(|e| TransportError::write(line, &e))
}

/// Remove every complete line from `pending`
///
/// Bytes are decoded per line, so a character split across reads survives.
/// Carriage returns are stripped and blank lines skipped; a trailing partial
/// line stays in the buffer for the next read unless it grows past
/// `MAX_PARTIAL_LINE`, in which case it is discarded.
pub fn drain_lines(pending: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = pending.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    if pending.len() > MAX_PARTIAL_LINE {
        tracing::warn!(
            "Discarding {} bytes received without a line terminator",
            pending.len()
        );
        pending.clear();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_valid_port_names() {
        assert!(is_valid_cnc_port("COM3"));
        assert!(is_valid_cnc_port("/dev/ttyUSB0"));
        assert!(is_valid_cnc_port("/dev/ttyACM1"));
        assert!(is_valid_cnc_port("/dev/cu.usbmodem1421"));
        assert!(!is_valid_cnc_port("COM"));
        assert!(!is_valid_cnc_port("COMX"));
        assert!(!is_valid_cnc_port("/dev/ttyS0"));
    }

    #[test]
    fn test_send_line_appends_terminator() {
        let mut out: Vec<u8> = Vec::new();
        send_line(&mut out, "G28").unwrap();
        send_line(&mut out, "M114").unwrap();
        assert_eq!(out, b"G28\nM114\n");
    }

    #[test]
    fn test_send_line_reports_write_failure() {
        let err = send_line(&mut BrokenPipe, "M112").unwrap_err();
        assert_eq!(
            err,
            TransportError::Write {
                line: "M112".to_string(),
                reason: "port closed".to_string(),
            }
        );
    }

    #[test]
    fn test_drain_lines_keeps_partial_tail() {
        let mut pending = b"ok\r\nX:1.0 Y:2.0 Z:3.0\n\nX:4".to_vec();
        let lines = drain_lines(&mut pending);
        assert_eq!(lines, vec!["ok", "X:1.0 Y:2.0 Z:3.0"]);
        assert_eq!(pending, b"X:4");

        pending.extend_from_slice(b".0 Y:0 Z:0\n");
        assert_eq!(drain_lines(&mut pending), vec!["X:4.0 Y:0 Z:0"]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_drain_lines_joins_split_characters() {
        let text = "echo:Temp 25\u{b0}C\n".as_bytes();
        let split = text.len() - 3;
        assert!(std::str::from_utf8(&text[..split]).is_err());

        let mut pending = text[..split].to_vec();
        assert!(drain_lines(&mut pending).is_empty());
        pending.extend_from_slice(&text[split..]);
        assert_eq!(drain_lines(&mut pending), vec!["echo:Temp 25\u{b0}C"]);
    }

    #[test]
    fn test_drain_lines_bounds_unterminated_input() {
        let mut pending = vec![b'#'; MAX_PARTIAL_LINE + 1];
        assert!(drain_lines(&mut pending).is_empty());
        assert!(pending.is_empty());

        pending.extend_from_slice(b"ok\n");
        assert_eq!(drain_lines(&mut pending), vec!["ok"]);
    }

    #[test]
    fn test_zero_baud_rejected() {
        let params = ConnectionParams::new("/dev/ttyUSB0", 0);
        assert_eq!(
            open_serial_port(&params).err(),
            Some(ConnectionError::UnsupportedBaudRate { baud: 0 })
        );
    }
}
