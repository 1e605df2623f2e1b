//! Marlin Command Creator
//!
//! Turns jog intent into G-code lines. Encoding is pure apart from homing,
//! which resets the believed position because the machine will not report
//! back until the next poll.

use lasersketch_core::{Axis, CoordinateMode, Direction, MachineState};

/// Switch to absolute coordinates
pub const ABSOLUTE_MODE: &str = "G90";

/// Switch to relative coordinates
pub const RELATIVE_MODE: &str = "G91";

/// Home all axes
pub const HOME: &str = "G28";

/// Emergency stop; always sent on its own
pub const EMERGENCY_STOP: &str = "M112";

/// Report current position
pub const POSITION_QUERY: &str = "M114";

/// A single jog request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Axis to move
    pub axis: Axis,
    /// Sign of the move
    pub direction: Direction,
    /// Magnitude of the move, greater than zero
    pub step_size: f64,
    /// Feed rate, greater than zero
    pub feed_rate: u32,
    /// Coordinate mode to interpret the move in
    pub mode: CoordinateMode,
}

impl MoveRequest {
    /// Build a request from the session's jog parameters
    pub fn from_state(state: &MachineState, axis: Axis, direction: Direction) -> Self {
        Self {
            axis,
            direction,
            step_size: state.step_size(),
            feed_rate: state.feed_rate(),
            mode: state.mode(),
        }
    }
}

/// Motion command encoder
#[derive(Debug, Default, Clone, Copy)]
pub struct MotionEncoder;

impl MotionEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// The linear move line alone, without any mode switch
    pub fn motion_line(&self, request: &MoveRequest) -> String {
        format!(
            "G1 {}{} F{}",
            request.axis.letter(),
            format_distance(request.direction.apply(request.step_size)),
            request.feed_rate
        )
    }

    /// Encode a jog as the ordered lines to send
    ///
    /// Relative moves are wrapped as `G91`, move, `G90` so the controller is
    /// back in absolute mode afterwards and later absolute commands stay
    /// correct.
    pub fn encode_move(&self, request: &MoveRequest) -> Vec<String> {
        debug_assert!(request.step_size.is_finite() && request.step_size > 0.0);
        debug_assert!(request.feed_rate > 0);

        let motion = self.motion_line(request);
        match request.mode {
            CoordinateMode::Absolute => vec![motion],
            CoordinateMode::Relative => vec![
                RELATIVE_MODE.to_string(),
                motion,
                ABSOLUTE_MODE.to_string(),
            ],
        }
    }

    /// Encode a home command and reset the believed position to origin
    pub fn encode_home(&self, state: &mut MachineState) -> String {
        state.reset_to_origin();
        HOME.to_string()
    }

    /// Emergency stop; never wrapped with mode switches
    pub fn encode_emergency_stop(&self) -> String {
        EMERGENCY_STOP.to_string()
    }

    /// Position query
    pub fn encode_position_query(&self) -> String {
        POSITION_QUERY.to_string()
    }
}

/// Three decimals, or the shortest exact form when three would round
fn format_distance(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    if fixed.parse::<f64>().ok() == Some(value) {
        fixed
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasersketch_core::AxisPosition;

    fn request(axis: Axis, direction: Direction, mode: CoordinateMode) -> MoveRequest {
        MoveRequest {
            axis,
            direction,
            step_size: 2.5,
            feed_rate: 1200,
            mode,
        }
    }

    #[test]
    fn test_absolute_move_is_single_line() {
        let encoder = MotionEncoder::new();
        let lines = encoder.encode_move(&request(
            Axis::X,
            Direction::Negative,
            CoordinateMode::Absolute,
        ));
        assert_eq!(lines, vec!["G1 X-2.500 F1200"]);
    }

    #[test]
    fn test_relative_move_is_wrapped() {
        let encoder = MotionEncoder::new();
        let lines = encoder.encode_move(&request(
            Axis::Z,
            Direction::Positive,
            CoordinateMode::Relative,
        ));
        assert_eq!(lines, vec!["G91", "G1 Z2.500 F1200", "G90"]);
    }

    #[test]
    fn test_from_state_uses_jog_parameters() {
        let state = MachineState::with_parameters(0.1, 300, CoordinateMode::Relative).unwrap();
        let req = MoveRequest::from_state(&state, Axis::Y, Direction::Positive);
        assert_eq!(req.step_size, 0.1);
        assert_eq!(req.feed_rate, 300);
        assert_eq!(MotionEncoder::new().motion_line(&req), "G1 Y0.100 F300");
    }

    #[test]
    fn test_fine_steps_keep_full_precision() {
        let encoder = MotionEncoder::new();
        let mut state = MachineState::new();

        state.set_step_size(0.0004).unwrap();
        let req = MoveRequest::from_state(&state, Axis::X, Direction::Negative);
        assert_eq!(encoder.encode_move(&req), vec!["G1 X-0.0004 F1000"]);

        state.set_step_size(0.0125).unwrap();
        let req = MoveRequest::from_state(&state, Axis::Y, Direction::Positive);
        assert_eq!(encoder.encode_move(&req), vec!["G1 Y0.0125 F1000"]);
    }

    #[test]
    fn test_home_resets_position() {
        let mut state = MachineState::new();
        state.apply_report(AxisPosition::new(10.0, 20.0, 3.0));

        let encoder = MotionEncoder::new();
        assert_eq!(encoder.encode_home(&mut state), "G28");
        assert_eq!(state.position(), AxisPosition::origin());
    }

    #[test]
    fn test_stop_and_query() {
        let encoder = MotionEncoder::new();
        assert_eq!(encoder.encode_emergency_stop(), "M112");
        assert_eq!(encoder.encode_position_query(), "M114");
    }
}
