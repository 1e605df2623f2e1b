//! Data models for machine axes, coordinate modes and believed position
//!
//! This module provides:
//! - Axis and direction selectors used by jog requests
//! - Coordinate mode (absolute / relative)
//! - The session's `MachineState`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MachineError;

/// Default jog step in machine units
pub const DEFAULT_STEP_SIZE: f64 = 1.0;

/// Default feed rate in machine units per minute
pub const DEFAULT_FEED_RATE: u32 = 1000;

/// Linear machine axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// G-code word letter for this axis
    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Axis {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            _ => Err(MachineError::UnknownAxis(s.to_string())),
        }
    }
}

/// Jog direction along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards positive coordinates
    Positive,
    /// Towards negative coordinates
    Negative,
}

impl Direction {
    /// Apply this direction to a magnitude
    pub fn apply(&self, magnitude: f64) -> f64 {
        match self {
            Direction::Positive => magnitude,
            Direction::Negative => -magnitude,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Positive => write!(f, "+"),
            Direction::Negative => write!(f, "-"),
        }
    }
}

impl FromStr for Direction {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Direction::Positive),
            "-" => Ok(Direction::Negative),
            _ => Err(MachineError::UnknownDirection(s.to_string())),
        }
    }
}

/// Coordinate interpretation requested for a jog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Coordinates are absolute (G90); the firmware default
    #[default]
    Absolute,
    /// Coordinates are relative to the current position (G91)
    Relative,
}

impl fmt::Display for CoordinateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateMode::Absolute => write!(f, "absolute"),
            CoordinateMode::Relative => write!(f, "relative"),
        }
    }
}

impl FromStr for CoordinateMode {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abs" | "absolute" | "g90" => Ok(CoordinateMode::Absolute),
            "rel" | "relative" | "g91" => Ok(CoordinateMode::Relative),
            _ => Err(MachineError::UnknownMode(s.to_string())),
        }
    }
}

/// Three-axis position as reported by the machine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisPosition {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl AxisPosition {
    /// Create a new position
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The machine origin
    pub fn origin() -> Self {
        Self::default()
    }

    /// Value for a single axis
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl fmt::Display for AxisPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

/// What the session believes about the machine
///
/// Created with defaults at session start and never persisted. Position is
/// replaced only by a full position report or by issuing a home command.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    position: AxisPosition,
    mode: CoordinateMode,
    step_size: f64,
    feed_rate: u32,
}

impl MachineState {
    /// Create a machine state with default jog parameters
    pub fn new() -> Self {
        Self {
            position: AxisPosition::origin(),
            mode: CoordinateMode::Absolute,
            step_size: DEFAULT_STEP_SIZE,
            feed_rate: DEFAULT_FEED_RATE,
        }
    }

    /// Create a machine state with the given jog parameters
    pub fn with_parameters(
        step_size: f64,
        feed_rate: u32,
        mode: CoordinateMode,
    ) -> Result<Self, MachineError> {
        let mut state = Self::new();
        state.set_step_size(step_size)?;
        state.set_feed_rate(feed_rate as i64)?;
        state.set_mode(mode);
        Ok(state)
    }

    /// Current believed position
    pub fn position(&self) -> AxisPosition {
        self.position
    }

    /// Coordinate mode used for jogs
    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    /// Jog step size
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Jog feed rate
    pub fn feed_rate(&self) -> u32 {
        self.feed_rate
    }

    /// Set the jog step size, rejecting non-positive or non-finite values
    pub fn set_step_size(&mut self, step_size: f64) -> Result<(), MachineError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(MachineError::InvalidStepSize(step_size));
        }
        self.step_size = step_size;
        Ok(())
    }

    /// Set the jog feed rate, rejecting non-positive values
    pub fn set_feed_rate(&mut self, feed_rate: i64) -> Result<(), MachineError> {
        if feed_rate <= 0 || feed_rate > u32::MAX as i64 {
            return Err(MachineError::InvalidFeedRate(feed_rate));
        }
        self.feed_rate = feed_rate as u32;
        Ok(())
    }

    /// Set the coordinate mode used for jogs
    pub fn set_mode(&mut self, mode: CoordinateMode) {
        self.mode = mode;
    }

    /// Replace all three axes from a complete position report
    pub fn apply_report(&mut self, position: AxisPosition) {
        self.position = position;
    }

    /// Optimistically reset to origin after a home command is issued
    pub fn reset_to_origin(&mut self) {
        self.position = AxisPosition::origin();
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_and_direction() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!(" Z ".parse::<Axis>().unwrap(), Axis::Z);
        assert!("A".parse::<Axis>().is_err());
        assert_eq!("-".parse::<Direction>().unwrap(), Direction::Negative);
        assert!("*".parse::<Direction>().is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            "rel".parse::<CoordinateMode>().unwrap(),
            CoordinateMode::Relative
        );
        assert_eq!(
            "G90".parse::<CoordinateMode>().unwrap(),
            CoordinateMode::Absolute
        );
        assert!("polar".parse::<CoordinateMode>().is_err());
    }

    #[test]
    fn test_direction_apply() {
        assert_eq!(Direction::Positive.apply(2.5), 2.5);
        assert_eq!(Direction::Negative.apply(2.5), -2.5);
    }

    #[test]
    fn test_machine_state_defaults() {
        let state = MachineState::new();
        assert_eq!(state.position(), AxisPosition::origin());
        assert_eq!(state.mode(), CoordinateMode::Absolute);
        assert_eq!(state.step_size(), DEFAULT_STEP_SIZE);
        assert_eq!(state.feed_rate(), DEFAULT_FEED_RATE);
    }

    #[test]
    fn test_invalid_parameters_leave_state_unchanged() {
        let mut state = MachineState::new();
        assert_eq!(
            state.set_step_size(0.0),
            Err(MachineError::InvalidStepSize(0.0))
        );
        assert!(state.set_step_size(f64::NAN).is_err());
        assert_eq!(
            state.set_feed_rate(-5),
            Err(MachineError::InvalidFeedRate(-5))
        );
        assert_eq!(state.step_size(), DEFAULT_STEP_SIZE);
        assert_eq!(state.feed_rate(), DEFAULT_FEED_RATE);
    }

    #[test]
    fn test_apply_report_and_home() {
        let mut state = MachineState::new();
        state.apply_report(AxisPosition::new(12.5, 0.0, 5.0));
        assert_eq!(state.position().get(Axis::X), 12.5);
        assert_eq!(state.position().get(Axis::Z), 5.0);

        state.reset_to_origin();
        assert_eq!(state.position(), AxisPosition::origin());
    }
}
