//! Position tracking
//!
//! Two background tasks keep the believed position fresh: one polls the
//! controller with `M114` on a fixed interval through the shared transport
//! queue, the other reads response lines and turns complete position reports
//! into telemetry updates. Neither touches session state directly; updates
//! are delivered over a channel and applied on the session side.

use super::command_creator::POSITION_QUERY;
use super::position_parser::{classify_report, ReportLine};
use crate::communication::transport::CommandSender;
use crate::error::TransportError;
use lasersketch_core::AxisPosition;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default interval between position queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Position tracker configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Interval between position queries
    pub poll_interval: Duration,
    /// Query command sent on each tick
    pub query: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            query: POSITION_QUERY.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Config with a custom poll interval
    pub fn with_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }
}

/// Update delivered to the session
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryUpdate {
    /// A complete position report; replaces all three axes
    Position(AxisPosition),
    /// Any other line from the controller
    Response(String),
    /// The transport stopped; no more updates will follow
    LinkClosed,
}

/// Background position poller and report listener
pub struct PositionTracker {
    poll_task: JoinHandle<()>,
    listen_task: JoinHandle<()>,
}

impl PositionTracker {
    /// Start polling through `sender` and parsing lines from `responses`
    pub fn spawn(
        sender: CommandSender,
        responses: mpsc::UnboundedReceiver<String>,
        config: TrackerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TelemetryUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let poll_task = tokio::spawn(poll_loop(sender, config, update_tx.clone()));
        let listen_task = tokio::spawn(listen_loop(responses, update_tx));

        (
            Self {
                poll_task,
                listen_task,
            },
            update_rx,
        )
    }

    /// Stop both tasks
    pub fn stop(&self) {
        self.poll_task.abort();
        self.listen_task.abort();
    }

    /// True while the poller is still issuing queries
    pub fn is_polling(&self) -> bool {
        !self.poll_task.is_finished()
    }
}

impl Drop for PositionTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    sender: CommandSender,
    config: TrackerConfig,
    updates: mpsc::UnboundedSender<TelemetryUpdate>,
) {
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match sender.request_position(&config.query) {
            Ok(true) => {}
            Ok(false) => tracing::trace!("Position query still pending, skipping tick"),
            Err(TransportError::Closed) => {
                tracing::debug!("Transport closed, position polling stopped");
                let _ = updates.send(TelemetryUpdate::LinkClosed);
                break;
            }
            Err(e) => {
                tracing::warn!("Position query failed: {}", e);
            }
        }
    }
}

async fn listen_loop(
    mut responses: mpsc::UnboundedReceiver<String>,
    updates: mpsc::UnboundedSender<TelemetryUpdate>,
) {
    while let Some(line) = responses.recv().await {
        let update = match classify_report(&line) {
            ReportLine::Position(position) => TelemetryUpdate::Position(position),
            ReportLine::Malformed { axis } => {
                tracing::trace!("Dropped position report with bad {} value: {}", axis, line);
                TelemetryUpdate::Response(line)
            }
            ReportLine::Unrelated => TelemetryUpdate::Response(line),
        };
        if updates.send(update).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::transport::SerialTransport;
    use std::io::{self, Cursor};

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.query, "M114");
    }

    #[tokio::test]
    async fn test_reports_become_updates() {
        let reader = Cursor::new(b"ok\nX:1.00 Y:2.00 Z:3.00 E:0.00\nX:bad Y:0 Z:0\n".to_vec());
        let (transport, handles) =
            SerialTransport::start("test", Box::new(io::sink()), Box::new(reader));
        let (_tracker, mut updates) = PositionTracker::spawn(
            transport.sender(),
            handles.responses,
            TrackerConfig::with_interval(Duration::from_secs(60)),
        );

        assert_eq!(
            updates.recv().await,
            Some(TelemetryUpdate::Response("ok".to_string()))
        );
        assert_eq!(
            updates.recv().await,
            Some(TelemetryUpdate::Position(AxisPosition::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            updates.recv().await,
            Some(TelemetryUpdate::Response("X:bad Y:0 Z:0".to_string()))
        );
        transport.shutdown().await;
    }
}
