//! Single-writer serial transport
//!
//! Every outbound command goes through one ordered queue drained by a single
//! writer task, so bytes from the UI and from the position poller never
//! interleave and commands reach the wire in issue order. An urgent lane is
//! drained ahead of the normal queue for emergency stop.
//!
//! Inbound bytes are read on a blocking reader task, split into lines and
//! forwarded over a channel. Neither task touches UI state.

use crate::communication::serial::{
    drain_lines, open_serial_port, send_line, PortReader, PortWriter,
};
use crate::communication::ConnectionParams;
use crate::error::TransportError;
use lasersketch_core::ConnectionError;
use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// One unit of work for the writer task
#[derive(Debug)]
enum Outbound {
    /// Lines written back to back with nothing in between
    Lines(Vec<String>),
    /// Position query; clears the pending flag when written
    PositionQuery(String),
}

/// Asynchronous notifications from the transport tasks
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A command could not be written; it was dropped and the writer stopped.
    WriteFailed(TransportError),
    /// The port could not be read any more.
    ReadFailed { reason: String },
}

/// Receivers handed to the session when a transport starts
#[derive(Debug)]
pub struct TransportHandles {
    /// Newline-delimited response lines, in arrival order
    pub responses: mpsc::UnboundedReceiver<String>,
    /// Transport failures
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Cloneable handle for enqueueing commands
#[derive(Debug, Clone)]
pub struct CommandSender {
    queue: mpsc::UnboundedSender<Outbound>,
    urgent: mpsc::UnboundedSender<Outbound>,
    query_pending: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl CommandSender {
    /// Queue one command line; returns without waiting for the write
    pub fn send(&self, line: impl Into<String>) -> Result<(), TransportError> {
        self.send_all(vec![line.into()])
    }

    /// Queue several lines that must reach the wire contiguously
    pub fn send_all(&self, lines: Vec<String>) -> Result<(), TransportError> {
        if lines.is_empty() {
            return Ok(());
        }
        self.ensure_open()?;
        tracing::debug!("Queued: {}", lines.join(" | "));
        self.queue
            .send(Outbound::Lines(lines))
            .map_err(|_| TransportError::Closed)
    }

    /// Queue a line ahead of everything waiting in the normal queue
    pub fn send_urgent(&self, line: impl Into<String>) -> Result<(), TransportError> {
        self.ensure_open()?;
        let line = line.into();
        tracing::debug!("Queued urgent: {}", line);
        self.urgent
            .send(Outbound::Lines(vec![line]))
            .map_err(|_| TransportError::Closed)
    }

    /// Queue a position query unless one is already waiting to be written
    ///
    /// Returns `Ok(false)` when the request was coalesced with a pending one.
    pub fn request_position(&self, query: &str) -> Result<bool, TransportError> {
        self.ensure_open()?;
        if self.query_pending.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        if self
            .queue
            .send(Outbound::PositionQuery(query.to_string()))
            .is_err()
        {
            self.query_pending.store(false, Ordering::SeqCst);
            return Err(TransportError::Closed);
        }
        Ok(true)
    }

    /// True once the writer task has stopped
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.queue.is_closed()
    }

    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.is_closed() {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Owner of the serial connection for the session lifetime
///
/// Must be created inside a tokio runtime. Dropping it stops both tasks and
/// releases the port.
pub struct SerialTransport {
    port_name: String,
    sender: CommandSender,
    stop_writer: Option<oneshot::Sender<()>>,
    stop_reader: Arc<AtomicBool>,
    writer_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
}

impl SerialTransport {
    /// Acquire the port and start the writer and reader tasks
    pub fn open(params: &ConnectionParams) -> Result<(Self, TransportHandles), ConnectionError> {
        let (writer, reader) = open_serial_port(params)?;
        Ok(Self::start(params.port.clone(), writer, reader))
    }

    /// Start the transport tasks over an already-open byte stream
    pub fn start(
        port_name: impl Into<String>,
        writer: PortWriter,
        reader: PortReader,
    ) -> (Self, TransportHandles) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (urgent_tx, urgent_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let sender = CommandSender {
            queue: queue_tx,
            urgent: urgent_tx,
            query_pending: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        };
        let stop_reader = Arc::new(AtomicBool::new(false));

        let writer_task = tokio::spawn(write_loop(
            writer,
            urgent_rx,
            queue_rx,
            stop_rx,
            sender.query_pending.clone(),
            sender.closed.clone(),
            event_tx.clone(),
        ));

        let reader_stop = stop_reader.clone();
        let reader_task = tokio::task::spawn_blocking(move || {
            read_loop(reader, reader_stop, response_tx, event_tx)
        });

        let transport = Self {
            port_name: port_name.into(),
            sender,
            stop_writer: Some(stop_tx),
            stop_reader,
            writer_task: Some(writer_task),
            reader_task: Some(reader_task),
        };

        let handles = TransportHandles {
            responses: response_rx,
            events: event_rx,
        };

        (transport, handles)
    }

    /// Port this transport owns
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// A cloneable handle onto the writer queue
    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Queue one command line
    pub fn send(&self, line: impl Into<String>) -> Result<(), TransportError> {
        self.sender.send(line)
    }

    /// True once the writer task has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Write out anything already queued, stop both tasks and release the port
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop_writer.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.writer_task.take() {
            let _ = task.await;
        }
        self.stop_reader.store(true, Ordering::SeqCst);
        if let Some(task) = self.reader_task.take() {
            let _ = task.await;
        }
        tracing::info!("Released {}", self.port_name);
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_writer.take() {
            let _ = stop.send(());
        }
        self.stop_reader.store(true, Ordering::SeqCst);
    }
}

async fn write_loop(
    mut writer: PortWriter,
    mut urgent_rx: mpsc::UnboundedReceiver<Outbound>,
    mut queue_rx: mpsc::UnboundedReceiver<Outbound>,
    mut stop_rx: oneshot::Receiver<()>,
    query_pending: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    loop {
        let item = tokio::select! {
            biased;
            Some(item) = urgent_rx.recv() => item,
            Some(item) = queue_rx.recv() => item,
            _ = &mut stop_rx => {
                let mut remaining = Vec::new();
                while let Ok(item) = urgent_rx.try_recv() {
                    remaining.push(item);
                }
                while let Ok(item) = queue_rx.try_recv() {
                    remaining.push(item);
                }
                for item in remaining {
                    if !write_item(&mut writer, item, &query_pending, &events) {
                        break;
                    }
                }
                break;
            }
            else => break,
        };

        if !write_item(&mut writer, item, &query_pending, &events) {
            break;
        }
    }

    closed.store(true, Ordering::SeqCst);
    tracing::debug!("Serial writer stopped");
}

fn write_item(
    writer: &mut PortWriter,
    item: Outbound,
    query_pending: &AtomicBool,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> bool {
    let lines = match item {
        Outbound::Lines(lines) => lines,
        Outbound::PositionQuery(query) => {
            query_pending.store(false, Ordering::SeqCst);
            vec![query]
        }
    };

    for line in &lines {
        if let Err(err) = send_line(&mut **writer, line) {
            tracing::error!("{}", err);
            let _ = events.send(TransportEvent::WriteFailed(err));
            return false;
        }
        tracing::trace!("Sent: {}", line);
    }
    true
}

fn read_loop(
    mut reader: PortReader,
    stop: Arc<AtomicBool>,
    responses: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut buf = [0u8; 256];
    let mut pending: Vec<u8> = Vec::new();

    while !stop.load(Ordering::SeqCst) {
        match reader.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("Serial reader reached end of stream");
                break;
            }
            Ok(n) => {
                pending.extend_from_slice(&buf[..n]);
                for line in drain_lines(&mut pending) {
                    if responses.send(line).is_err() {
                        return;
                    }
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                tracing::error!("Serial read failed: {}", e);
                let _ = events.send(TransportEvent::ReadFailed {
                    reason: e.to_string(),
                });
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Write};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl SharedWriter {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn start(writer: SharedWriter) -> (SerialTransport, TransportHandles) {
        SerialTransport::start("test", Box::new(writer), Box::new(io::empty()))
    }

    #[tokio::test]
    async fn test_commands_written_in_issue_order() {
        let out = SharedWriter::default();
        let (transport, _handles) = start(out.clone());

        transport.send("G28").unwrap();
        transport
            .sender()
            .send_all(vec!["G91".into(), "G1 X1.000 F1000".into(), "G90".into()])
            .unwrap();
        transport.send("M114").unwrap();
        transport.shutdown().await;

        assert_eq!(out.text(), "G28\nG91\nG1 X1.000 F1000\nG90\nM114\n");
    }

    #[tokio::test]
    async fn test_urgent_lane_written_first() {
        let out = SharedWriter::default();
        let (transport, _handles) = start(out.clone());

        transport.send("G1 X10.000 F1000").unwrap();
        transport.send("G1 X20.000 F1000").unwrap();
        transport.sender().send_urgent("M112").unwrap();
        transport.shutdown().await;

        assert!(out.text().starts_with("M112\n"));
    }

    #[tokio::test]
    async fn test_pending_position_query_is_coalesced() {
        let out = SharedWriter::default();
        let (transport, _handles) = start(out.clone());
        let sender = transport.sender();

        assert_eq!(sender.request_position("M114"), Ok(true));
        assert_eq!(sender.request_position("M114"), Ok(false));
        transport.shutdown().await;

        assert_eq!(out.text().matches("M114").count(), 1);
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn test_reader_forwards_lines() {
        let reader = Cursor::new(b"start\r\nX:1.00 Y:2.00 Z:3.00\nok\n".to_vec());
        let (transport, mut handles) = SerialTransport::start(
            "test",
            Box::new(SharedWriter::default()),
            Box::new(reader),
        );

        assert_eq!(handles.responses.recv().await.as_deref(), Some("start"));
        assert_eq!(
            handles.responses.recv().await.as_deref(),
            Some("X:1.00 Y:2.00 Z:3.00")
        );
        assert_eq!(handles.responses.recv().await.as_deref(), Some("ok"));
        assert_eq!(handles.responses.recv().await, None);
        transport.shutdown().await;
    }

    /// Hands out one byte per read, like a slow serial line
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[tokio::test]
    async fn test_reader_reassembles_multibyte_text() {
        let reader = Trickle(Cursor::new("echo:\u{b5}step ok\n".as_bytes().to_vec()));
        let (transport, mut handles) = SerialTransport::start(
            "test",
            Box::new(SharedWriter::default()),
            Box::new(reader),
        );

        assert_eq!(
            handles.responses.recv().await.as_deref(),
            Some("echo:\u{b5}step ok")
        );
        transport.shutdown().await;
    }
}
