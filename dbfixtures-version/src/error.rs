//! Parse errors for versions and constraints.
//!
//! Neither error escapes [`crate::matches`]; they exist for callers that want
//! to validate user input (for example a `--filter` flag) up front.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,

    /// A dot-separated core segment is empty, non-numeric or overflows.
    #[error("invalid version segment '{segment}' in '{input}'")]
    InvalidSegment { input: String, segment: String },

    #[error("invalid pre-release in '{input}': {reason}")]
    InvalidPrerelease { input: String, reason: String },

    #[error("invalid build metadata in '{input}': {reason}")]
    InvalidMetadata { input: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("empty constraint")]
    Empty,

    #[error("empty clause in constraint '{input}'")]
    EmptyClause { input: String },

    #[error("unknown operator '{operator}' in clause '{clause}'")]
    UnknownOperator { clause: String, operator: String },

    #[error("invalid version in clause '{clause}': {source}")]
    InvalidVersion {
        clause: String,
        #[source]
        source: VersionParseError,
    },
}
