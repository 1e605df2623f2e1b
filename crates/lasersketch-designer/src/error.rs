//! Error types for the designer crate.

use thiserror::Error;

/// Undo/redo requested with nothing to move to.
///
/// Informational: the scene is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

/// A stored record that could not be turned back into a drawable object.
///
/// The record is skipped; the rest of the restore continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RestoreItemError {
    #[error("Record {id}: unknown shape kind '{kind}'")]
    UnknownKind { id: u64, kind: String },

    #[error("Record {id}: a {kind} cannot be built from {count} coordinates")]
    BadCoordinates { id: u64, kind: String, count: usize },

    #[error("Record {id}: coordinate or angle is not a finite number")]
    NonFiniteValue { id: u64 },

    #[error("Record {id}: arc is missing its start or extent angle")]
    MissingArcAngles { id: u64 },

    #[error("Record {id}: unknown arc style '{style}'")]
    UnknownArcStyle { id: u64, style: String },

    #[error("Record {id}: invalid stroke width {width}")]
    InvalidStrokeWidth { id: u64, width: f64 },
}

impl RestoreItemError {
    /// Id of the record that failed
    pub fn record_id(&self) -> u64 {
        match self {
            Self::UnknownKind { id, .. }
            | Self::BadCoordinates { id, .. }
            | Self::NonFiniteValue { id }
            | Self::MissingArcAngles { id }
            | Self::UnknownArcStyle { id, .. }
            | Self::InvalidStrokeWidth { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(HistoryError::NothingToUndo.to_string(), "Nothing to undo");
        let err = RestoreItemError::BadCoordinates {
            id: 7,
            kind: "polygon".to_string(),
            count: 4,
        };
        assert_eq!(
            err.to_string(),
            "Record 7: a polygon cannot be built from 4 coordinates"
        );
        assert_eq!(err.record_id(), 7);
    }
}
