//! Snapshot and visibility error types.

use std::fmt;

use super::types::TxId;

/// Snapshot text field, named in parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotField {
    Xmin,
    Xmax,
    InProgress,
}

impl fmt::Display for SnapshotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SnapshotField::Xmin => "xmin",
            SnapshotField::Xmax => "xmax",
            SnapshotField::InProgress => "xip",
        };
        f.write_str(s)
    }
}

/// Errors from parsing or constructing a [`Snapshot`](super::Snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotParseError {
    /// A field is missing or is not a non-negative integer.
    MalformedField {
        /// Which field.
        field: SnapshotField,
        /// The offending text.
        value: String,
    },
    /// `xmin` is greater than `xmax`.
    InvalidRange { xmin: TxId, xmax: TxId },
    /// An in-progress id lies outside `[xmin, xmax)`.
    InvalidMember { xid: TxId, xmin: TxId, xmax: TxId },
}

impl fmt::Display for SnapshotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotParseError::MalformedField { field, value } => {
                write!(f, "malformed snapshot field {}: {:?}", field, value)
            }
            SnapshotParseError::InvalidRange { xmin, xmax } => {
                write!(f, "snapshot xmin {} is greater than xmax {}", xmin, xmax)
            }
            SnapshotParseError::InvalidMember { xid, xmin, xmax } => write!(
                f,
                "in-progress transaction {} is outside snapshot range [{}, {})",
                xid, xmin, xmax
            ),
        }
    }
}

impl std::error::Error for SnapshotParseError {}

/// Which tuple field a status problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Xmin,
    Xmax,
}

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusField::Xmin => f.write_str("xmin"),
            StatusField::Xmax => f.write_str("xmax"),
        }
    }
}

/// Errors from visibility evaluation or tuple record normalization.
///
/// These always indicate bad caller data; the evaluator never turns them
/// into a "not visible" verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityError {
    /// `t_xmax` is set but no status was supplied for it.
    MissingXmaxStatus { t_xmax: TxId },
    /// Both the committed and the aborted flag are set for one field.
    ContradictoryStatus { field: StatusField, xid: TxId },
    /// A tuple record could not be decoded.
    MalformedRecord(String),
}

impl fmt::Display for VisibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityError::MissingXmaxStatus { t_xmax } => {
                write!(f, "tuple deleted by transaction {} has no xmax status", t_xmax)
            }
            VisibilityError::ContradictoryStatus { field, xid } => write!(
                f,
                "{} transaction {} is marked both committed and aborted",
                field, xid
            ),
            VisibilityError::MalformedRecord(msg) => {
                write!(f, "malformed tuple record: {}", msg)
            }
        }
    }
}

impl std::error::Error for VisibilityError {}

impl From<serde_json::Error> for VisibilityError {
    fn from(err: serde_json::Error) -> Self {
        VisibilityError::MalformedRecord(err.to_string())
    }
}
