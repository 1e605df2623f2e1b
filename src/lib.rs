//! # LaserSketch
//!
//! Vector sketching and jog control for serial laser and pen plotters.
//!
//! ## Architecture
//!
//! LaserSketch is organized as a workspace with multiple crates:
//!
//! 1. **lasersketch-core** - Machine state, errors, event bus
//! 2. **lasersketch-communication** - Serial transport, G-code encoding, position tracking
//! 3. **lasersketch-designer** - Scene model, undo/redo snapshots, design files
//! 4. **lasersketch-settings** - Configuration files
//! 5. **lasersketch** - Session context and the console binary
//!
//! ## Features
//!
//! - **Jogging**: per-axis moves in absolute or relative mode, homing, emergency stop
//! - **Live Position**: `M114` polling with all-or-nothing position updates
//! - **Drawing**: lines, ovals, rectangles, polygons and arcs with a background grid
//! - **Undo/Redo**: bounded whole-scene snapshots that survive zoom changes

pub mod console;
pub mod session;

pub use lasersketch_communication::{ConnectionParams, TransportError};
pub use lasersketch_core::{AppEvent, Axis, AxisPosition, CoordinateMode, Direction, EventBus};
pub use lasersketch_designer::{DesignerState, HistoryError, RestoreReport};
pub use lasersketch_settings::Config;

pub use session::{Session, SessionError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so the console prompt on stdout stays readable
/// - RUST_LOG environment variable support (default level: info)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
