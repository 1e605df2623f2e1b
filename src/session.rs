//! Session context
//!
//! One `Session` owns everything the interactive surface touches: the designer
//! state, the believed machine state, the optional serial link and the event
//! bus. It lives on the UI side and is only ever used through `&mut self`;
//! background tasks hand their results back over channels that
//! `pump_telemetry` drains.

use std::sync::Arc;
use std::time::Duration;

use lasersketch_communication::{
    CommandSender, ConnectionParams, MotionEncoder, MoveRequest, PositionTracker, SerialTransport,
    TelemetryUpdate, TrackerConfig, TransportError, TransportEvent,
};
use lasersketch_communication::communication::serial::{PortReader, PortWriter};
use lasersketch_core::{
    AppEvent, Axis, CommunicationEvent, ConnectionError, ConnectionEvent, CoordinateMode,
    DesignerEvent, Direction, ErrorEvent, ErrorSeverity, EventBus, MachineError, MachineEvent,
    MachineState,
};
use lasersketch_designer::{
    DesignerState, GridOverlay, HistoryError, RestoreReport, SceneChange, Shape, StrokeStyle,
};
use lasersketch_settings::Config;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced to the user by session commands
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Machine(#[from] MachineError),
}

/// An attached controller
struct MachineLink {
    port: String,
    transport: SerialTransport,
    sender: CommandSender,
    tracker: PositionTracker,
    telemetry: mpsc::UnboundedReceiver<TelemetryUpdate>,
    transport_events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Application session
pub struct Session {
    designer: DesignerState,
    machine: MachineState,
    encoder: MotionEncoder,
    link: Option<MachineLink>,
    events: Arc<EventBus>,
    tracker_config: TrackerConfig,
}

impl Session {
    /// Session with default settings
    pub fn new() -> Self {
        Self::assemble(
            DesignerState::new(),
            MachineState::new(),
            TrackerConfig::default(),
        )
    }

    /// Session configured from settings
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let machine = MachineState::with_parameters(
            config.machine.step_size,
            config.machine.feed_rate,
            config.machine.mode,
        )?;

        let mut grid = GridOverlay::default();
        grid.set_spacing(config.designer.grid_spacing);
        grid.set_visible(config.designer.show_grid);
        let designer = DesignerState::with_options(config.designer.history_depth, grid);

        let tracker_config =
            TrackerConfig::with_interval(Duration::from_millis(config.machine.poll_interval_ms));

        Ok(Self::assemble(designer, machine, tracker_config))
    }

    fn assemble(
        mut designer: DesignerState,
        machine: MachineState,
        tracker_config: TrackerConfig,
    ) -> Self {
        let events = Arc::new(EventBus::new());

        let bus = events.clone();
        designer.on_scene_changed(move |change| {
            let (restored, skipped) = match *change {
                SceneChange::Restored { restored, skipped }
                | SceneChange::Loaded { restored, skipped } => (restored, skipped),
                SceneChange::Cleared => (0, 0),
            };
            bus.publish(AppEvent::Designer(DesignerEvent::SceneChanged {
                restored,
                skipped,
            }));
        });

        Self {
            designer,
            machine,
            encoder: MotionEncoder::new(),
            link: None,
            events,
            tracker_config,
        }
    }

    /// The session event bus
    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub fn designer(&self) -> &DesignerState {
        &self.designer
    }

    pub fn designer_mut(&mut self) -> &mut DesignerState {
        &mut self.designer
    }

    pub fn machine(&self) -> &MachineState {
        &self.machine
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Port of the attached controller
    pub fn port(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.port.as_str())
    }

    // ---- connection -------------------------------------------------------

    /// Open the serial port and start polling
    ///
    /// Failure leaves the session usable without motion features.
    pub fn connect(&mut self, params: &ConnectionParams) -> Result<(), SessionError> {
        match SerialTransport::open(params) {
            Ok((transport, handles)) => {
                self.start_link(params, transport, handles);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Motion features disabled: {}", e);
                self.events
                    .publish(AppEvent::Connection(ConnectionEvent::ConnectionFailed {
                        port: params.port.clone(),
                        error: e.to_string(),
                    }));
                Err(e.into())
            }
        }
    }

    /// Attach an already-open byte stream as the controller link
    pub fn attach(&mut self, params: &ConnectionParams, writer: PortWriter, reader: PortReader) {
        let (transport, handles) = SerialTransport::start(params.port.clone(), writer, reader);
        self.start_link(params, transport, handles);
    }

    fn start_link(
        &mut self,
        params: &ConnectionParams,
        transport: SerialTransport,
        handles: lasersketch_communication::TransportHandles,
    ) {
        let sender = transport.sender();
        let (tracker, telemetry) = PositionTracker::spawn(
            sender.clone(),
            handles.responses,
            self.tracker_config.clone(),
        );

        self.link = Some(MachineLink {
            port: params.port.clone(),
            transport,
            sender,
            tracker,
            telemetry,
            transport_events: handles.events,
        });

        tracing::info!("Connected to {} @ {} baud", params.port, params.baud_rate);
        self.events
            .publish(AppEvent::Connection(ConnectionEvent::Connected {
                port: params.port.clone(),
                baud_rate: params.baud_rate,
            }));
    }

    /// Write out queued commands, stop polling and release the port
    pub async fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            link.tracker.stop();
            link.transport.shutdown().await;
            self.events
                .publish(AppEvent::Connection(ConnectionEvent::Disconnected {
                    port: link.port,
                }));
        }
    }

    fn sender(&self) -> Result<&CommandSender, SessionError> {
        self.link
            .as_ref()
            .map(|l| &l.sender)
            .ok_or(SessionError::Connection(ConnectionError::NotConnected))
    }

    fn queued(&self, lines: &[String]) {
        for line in lines {
            self.events
                .publish(AppEvent::Communication(CommunicationEvent::CommandQueued {
                    command: line.clone(),
                }));
        }
    }

    // ---- motion -----------------------------------------------------------

    /// Jog one axis by the current step size; returns the lines queued
    pub fn jog(&mut self, axis: Axis, direction: Direction) -> Result<Vec<String>, SessionError> {
        let sender = self.sender()?;
        let request = MoveRequest::from_state(&self.machine, axis, direction);
        let lines = self.encoder.encode_move(&request);

        sender.send_all(lines.clone())?;
        // Ask for the new position straight away instead of waiting a tick
        if let Err(e) = sender.request_position(&self.tracker_config.query) {
            tracing::debug!("Post-move position query not queued: {}", e);
        }

        self.queued(&lines);
        Ok(lines)
    }

    /// Home all axes; the believed position resets to origin immediately
    pub fn home(&mut self) -> Result<(), SessionError> {
        let sender = self.sender()?;
        let mut homed = self.machine.clone();
        let line = self.encoder.encode_home(&mut homed);
        sender.send(line.clone())?;
        self.machine = homed;

        self.queued(&[line]);
        self.events
            .publish(AppEvent::Machine(MachineEvent::HomingStarted));
        self.events
            .publish(AppEvent::Machine(MachineEvent::PositionUpdated {
                position: self.machine.position(),
            }));
        Ok(())
    }

    /// Emergency stop, sent ahead of anything already queued
    pub fn emergency_stop(&mut self) -> Result<(), SessionError> {
        let line = self.encoder.encode_emergency_stop();
        self.sender()?.send_urgent(line.clone())?;

        tracing::warn!("Emergency stop sent");
        self.queued(&[line]);
        self.events
            .publish(AppEvent::Machine(MachineEvent::EmergencyStop));
        Ok(())
    }

    /// Send a raw command line
    pub fn send_raw(&mut self, line: &str) -> Result<(), SessionError> {
        let line = line.trim().to_string();
        self.sender()?.send(line.clone())?;
        self.queued(&[line]);
        Ok(())
    }

    // ---- jog parameters ---------------------------------------------------

    pub fn set_step_size(&mut self, step_size: f64) -> Result<(), SessionError> {
        self.machine.set_step_size(step_size)?;
        self.jog_parameters_changed();
        Ok(())
    }

    pub fn set_feed_rate(&mut self, feed_rate: i64) -> Result<(), SessionError> {
        self.machine.set_feed_rate(feed_rate)?;
        self.jog_parameters_changed();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: CoordinateMode) {
        self.machine.set_mode(mode);
        self.events
            .publish(AppEvent::Machine(MachineEvent::ModeChanged { mode }));
    }

    fn jog_parameters_changed(&self) {
        self.events
            .publish(AppEvent::Machine(MachineEvent::JogParametersChanged {
                step_size: self.machine.step_size(),
                feed_rate: self.machine.feed_rate(),
            }));
    }

    // ---- telemetry --------------------------------------------------------

    /// Apply everything the background tasks have delivered so far
    ///
    /// Returns the number of position reports applied.
    pub fn pump_telemetry(&mut self) -> usize {
        let Some(link) = self.link.as_mut() else {
            return 0;
        };

        let mut failures = Vec::new();
        while let Ok(event) = link.transport_events.try_recv() {
            failures.push(event);
        }

        let mut updates = Vec::new();
        while let Ok(update) = link.telemetry.try_recv() {
            updates.push(update);
        }

        let link_closed = link.transport.is_closed()
            || updates.iter().any(|u| *u == TelemetryUpdate::LinkClosed);

        for failure in failures {
            let event = match failure {
                TransportEvent::WriteFailed(TransportError::Write { line, reason }) => {
                    ErrorEvent::TransportFailed {
                        command: line,
                        message: reason,
                    }
                }
                TransportEvent::WriteFailed(other) => ErrorEvent::General {
                    severity: ErrorSeverity::Error,
                    message: other.to_string(),
                },
                TransportEvent::ReadFailed { reason } => ErrorEvent::General {
                    severity: ErrorSeverity::Error,
                    message: ConnectionError::ConnectionLost { reason }.to_string(),
                },
            };
            self.events.publish(AppEvent::Error(event));
        }

        let mut applied = 0;
        for update in updates {
            match update {
                TelemetryUpdate::Position(position) => {
                    self.machine.apply_report(position);
                    applied += 1;
                    self.events
                        .publish(AppEvent::Machine(MachineEvent::PositionUpdated { position }));
                }
                TelemetryUpdate::Response(line) => {
                    self.events.publish(AppEvent::Communication(
                        CommunicationEvent::ResponseReceived { line },
                    ));
                }
                TelemetryUpdate::LinkClosed => {}
            }
        }

        if link_closed {
            if let Some(link) = self.link.take() {
                tracing::warn!("Lost connection to {}", link.port);
                self.events
                    .publish(AppEvent::Connection(ConnectionEvent::Disconnected {
                        port: link.port.clone(),
                    }));
            }
        }

        applied
    }

    // ---- scene ------------------------------------------------------------

    /// Record the current scene after a durable change
    pub fn commit_scene(&mut self) -> usize {
        let depth = self.designer.commit();
        self.snapshot_recorded(depth);
        depth
    }

    /// Add a user shape, given in unzoomed units, and record the change
    pub fn add_shape(&mut self, shape: Shape, stroke: StrokeStyle) -> u64 {
        let zoom = self.designer.zoom();
        let id = self.designer.add_shape(shape.scaled(zoom), stroke);
        self.snapshot_recorded(self.designer.history().len());
        id
    }

    /// Delete a user shape and record the change; overlays are refused
    pub fn delete_shape(&mut self, id: u64) -> bool {
        let deleted = self.designer.delete_shape(id);
        if deleted {
            self.snapshot_recorded(self.designer.history().len());
        }
        deleted
    }

    fn snapshot_recorded(&self, depth: usize) {
        self.events
            .publish(AppEvent::Designer(DesignerEvent::SnapshotRecorded { depth }));
    }

    pub fn undo(&mut self) -> Result<RestoreReport, HistoryError> {
        self.designer.undo().inspect_err(|e| self.nothing_to_do(e))
    }

    pub fn redo(&mut self) -> Result<RestoreReport, HistoryError> {
        self.designer.redo().inspect_err(|e| self.nothing_to_do(e))
    }

    fn nothing_to_do(&self, err: &HistoryError) {
        tracing::info!("{}", err);
        self.events
            .publish(AppEvent::Designer(DesignerEvent::NothingToDo {
                message: err.to_string(),
            }));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
