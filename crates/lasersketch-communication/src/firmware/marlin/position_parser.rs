//! Marlin Position Report Parsing
//!
//! `M114` answers with a line such as
//! `X:10.00 Y:20.00 Z:0.00 E:0.00 Count X:800 Y:1600 Z:0`.
//! Only lines carrying all three of `X:`, `Y:` and `Z:` are treated as
//! position reports; each value runs from its first marker to the next space.

use lasersketch_core::{Axis, AxisPosition};

/// Classification of an inbound line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportLine {
    /// A complete position report
    Position(AxisPosition),
    /// Not a position report (acks, banners, echo lines)
    Unrelated,
    /// All three markers present but an axis value did not parse
    Malformed { axis: Axis },
}

/// Classify one response line
pub fn classify_report(line: &str) -> ReportLine {
    if !(line.contains("X:") && line.contains("Y:") && line.contains("Z:")) {
        return ReportLine::Unrelated;
    }

    let x = match axis_value(line, Axis::X) {
        Some(v) => v,
        None => return ReportLine::Malformed { axis: Axis::X },
    };
    let y = match axis_value(line, Axis::Y) {
        Some(v) => v,
        None => return ReportLine::Malformed { axis: Axis::Y },
    };
    let z = match axis_value(line, Axis::Z) {
        Some(v) => v,
        None => return ReportLine::Malformed { axis: Axis::Z },
    };

    ReportLine::Position(AxisPosition::new(x, y, z))
}

/// Parse a position report, or `None` if the line is not a complete one
pub fn parse_position_report(line: &str) -> Option<AxisPosition> {
    match classify_report(line) {
        ReportLine::Position(position) => Some(position),
        _ => None,
    }
}

fn axis_value(line: &str, axis: Axis) -> Option<f64> {
    let marker = format!("{}:", axis.letter());
    let start = line.find(&marker)? + marker.len();
    let rest = &line[start..];
    let end = rest.find(' ').unwrap_or(rest.len());
    let value = rest[..end].trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
