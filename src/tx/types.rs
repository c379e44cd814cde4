//! Core MVCC types: TxId, TxStatus, and the infomask hint bits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transaction ID (64-bit, matching `xid8` / `pg_current_snapshot()`).
///
/// TxIds are assigned sequentially. TxId 0 is reserved as INVALID and is
/// stamped into `t_xmax` of a tuple version that has not been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(u64);

impl TxId {
    /// Invalid transaction ID (0).
    pub const INVALID: Self = Self(0);

    /// Create a new transaction ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check if this is an invalid transaction ID.
    pub const fn is_invalid(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TxId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Commit-log resolution of a transaction at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxStatus {
    Committed,
    Aborted,
    InProgress,
}

impl TxStatus {
    /// Normalize the paired committed/aborted flags into a status.
    ///
    /// Neither flag set means the transaction has not been resolved yet.
    /// Returns `None` when both flags are set, which no single transaction
    /// outcome can produce.
    pub const fn from_flags(committed: bool, aborted: bool) -> Option<Self> {
        match (committed, aborted) {
            (true, false) => Some(TxStatus::Committed),
            (false, true) => Some(TxStatus::Aborted),
            (false, false) => Some(TxStatus::InProgress),
            (true, true) => None,
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::Committed => "committed",
            TxStatus::Aborted => "aborted",
            TxStatus::InProgress => "in progress",
        };
        f.write_str(s)
    }
}

/// Tuple header information mask (`t_infomask`).
///
/// Only the commit/abort hint bits are interpreted. Bit values match
/// PostgreSQL's `htup_details.h` so raw `heap_page_items` output can be
/// fed in directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Infomask(u16);

impl Infomask {
    /// xmin transaction committed (hint bit).
    pub const XMIN_COMMITTED: u16 = 0x0100;
    /// xmin transaction invalid/aborted (hint bit).
    pub const XMIN_INVALID: u16 = 0x0200;
    /// xmax transaction committed (hint bit).
    pub const XMAX_COMMITTED: u16 = 0x0400;
    /// xmax transaction invalid/aborted (hint bit).
    pub const XMAX_INVALID: u16 = 0x0800;

    /// Create an empty infomask with no flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create an infomask from a raw u16 value.
    pub const fn from_raw(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw u16 value.
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn xmin_committed(&self) -> bool {
        (self.0 & Self::XMIN_COMMITTED) != 0
    }

    pub const fn xmin_aborted(&self) -> bool {
        (self.0 & Self::XMIN_INVALID) != 0
    }

    pub const fn xmax_committed(&self) -> bool {
        (self.0 & Self::XMAX_COMMITTED) != 0
    }

    pub const fn xmax_aborted(&self) -> bool {
        (self.0 & Self::XMAX_INVALID) != 0
    }

    /// Set xmin committed flag.
    pub const fn with_xmin_committed(self) -> Self {
        Self(self.0 | Self::XMIN_COMMITTED)
    }

    /// Set xmin aborted flag.
    pub const fn with_xmin_aborted(self) -> Self {
        Self(self.0 | Self::XMIN_INVALID)
    }

    /// Set xmax committed flag.
    pub const fn with_xmax_committed(self) -> Self {
        Self(self.0 | Self::XMAX_COMMITTED)
    }

    /// Set xmax aborted flag.
    pub const fn with_xmax_aborted(self) -> Self {
        Self(self.0 | Self::XMAX_INVALID)
    }
}

impl fmt::Display for Infomask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Second information mask (`t_infomask2`), HOT bits only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Infomask2(u16);

impl Infomask2 {
    /// The tuple was HOT-updated: follow `t_ctid` to the next version.
    pub const HEAP_HOT_UPDATED: u16 = 0x4000;
    /// The tuple is a heap-only tuple, not referenced from any index.
    pub const HEAP_ONLY_TUPLE: u16 = 0x8000;

    pub const fn from_raw(value: u16) -> Self {
        Self(value)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn hot_updated(&self) -> bool {
        (self.0 & Self::HEAP_HOT_UPDATED) != 0
    }

    pub const fn heap_only(&self) -> bool {
        (self.0 & Self::HEAP_ONLY_TUPLE) != 0
    }
}
