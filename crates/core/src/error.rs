//! Error types for rotation generation.

use thiserror::Error;

use crate::models::Line;

/// Validation failures surfaced to the user as inline messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// Lookup of a line that is not defined.
    #[error("unknown line `{0}`")]
    UnknownLine(String),

    /// A selection references a station outside its line, or accommodations
    /// were requested on a line that does not support them.
    #[error("invalid selection on line {line}: {reason}")]
    InvalidSelection {
        /// Line the selection was made for.
        line: Line,
        /// Human-readable description.
        reason: String,
    },

    /// No line produced pairs or accommodation stations.
    #[error("no operational stations available on any line; cannot generate a schedule")]
    EmptySchedule,
}

impl RotationError {
    pub(crate) fn invalid(line: Line, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            line,
            reason: reason.into(),
        }
    }
}
