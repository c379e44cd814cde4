//! Version-control metadata of one heap tuple version.
//!
//! Each tuple version carries the id of the transaction that created it
//! (`t_xmin`), the id of the transaction that deleted or replaced it
//! (`t_xmax`, INVALID while it is the newest version), and the commit-log
//! resolution of both.
//!
//! Callers usually hold this data as a flat record with two booleans per
//! field ([`TupleRecord`]). Those are normalized here, at the boundary, into
//! a [`TxStatus`] so the evaluator never sees an ambiguous state.

use serde::{Deserialize, Serialize};

use super::error::{StatusField, VisibilityError};
use super::types::{Infomask, TxId, TxStatus};

/// Version-control metadata for one tuple version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleVersionMetadata {
    /// Transaction that created this version.
    pub t_xmin: TxId,
    /// Transaction that deleted or replaced this version (INVALID if none).
    pub t_xmax: TxId,
    /// Resolution of `t_xmin`.
    pub xmin_status: TxStatus,
    /// Resolution of `t_xmax`; only meaningful when `t_xmax` is valid.
    pub xmax_status: Option<TxStatus>,
}

impl TupleVersionMetadata {
    /// Metadata for a version that has not been deleted.
    pub fn inserted(t_xmin: TxId, xmin_status: TxStatus) -> Self {
        Self {
            t_xmin,
            t_xmax: TxId::INVALID,
            xmin_status,
            xmax_status: None,
        }
    }

    /// Marks this version as deleted by `t_xmax`.
    pub fn deleted_by(self, t_xmax: TxId, xmax_status: TxStatus) -> Self {
        Self {
            t_xmax,
            xmax_status: Some(xmax_status),
            ..self
        }
    }

    /// Builds metadata from the hint bits of a raw `t_infomask`.
    ///
    /// Missing hint bits mean the transaction has not been resolved.
    pub fn from_infomask(
        t_xmin: TxId,
        t_xmax: TxId,
        infomask: Infomask,
    ) -> Result<Self, VisibilityError> {
        TupleRecord {
            t_xmin,
            t_xmax,
            xmin_committed: infomask.xmin_committed(),
            xmin_aborted: infomask.xmin_aborted(),
            xmax_committed: infomask.xmax_committed(),
            xmax_aborted: infomask.xmax_aborted(),
        }
        .try_into()
    }
}

/// Flat tuple record as supplied by callers (key/value form).
///
/// Missing flags default to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleRecord {
    pub t_xmin: TxId,
    #[serde(default = "invalid_txid")]
    pub t_xmax: TxId,
    #[serde(default)]
    pub xmin_committed: bool,
    #[serde(default)]
    pub xmin_aborted: bool,
    #[serde(default)]
    pub xmax_committed: bool,
    #[serde(default)]
    pub xmax_aborted: bool,
}

fn invalid_txid() -> TxId {
    TxId::INVALID
}

impl TupleRecord {
    /// Decodes a record from a JSON key/value map.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, VisibilityError> {
        Ok(Self::deserialize(value)?)
    }
}

impl TryFrom<TupleRecord> for TupleVersionMetadata {
    type Error = VisibilityError;

    fn try_from(record: TupleRecord) -> Result<Self, Self::Error> {
        let xmin_status = TxStatus::from_flags(record.xmin_committed, record.xmin_aborted)
            .ok_or_else(|| contradictory(StatusField::Xmin, record.t_xmin))?;
        let xmax_status = TxStatus::from_flags(record.xmax_committed, record.xmax_aborted)
            .ok_or_else(|| contradictory(StatusField::Xmax, record.t_xmax))?;

        Ok(Self {
            t_xmin: record.t_xmin,
            t_xmax: record.t_xmax,
            xmin_status,
            // The xmax flags carry no meaning for an undeleted version
            xmax_status: (!record.t_xmax.is_invalid()).then_some(xmax_status),
        })
    }
}

fn contradictory(field: StatusField, xid: TxId) -> VisibilityError {
    tracing::debug!(%field, %xid, "tuple record has both committed and aborted flags");
    VisibilityError::ContradictoryStatus { field, xid }
}
