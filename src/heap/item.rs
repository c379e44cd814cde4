//! Heap page items as reported by `heap_page_items()`.
//!
//! Each item is one line pointer of a heap page plus, for `Normal` line
//! pointers, the header fields of the tuple it points at. Rows arrive from
//! the caller as key/value maps (one JSON object per line pointer) and are
//! deserialized into [`HeapItem`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tx::{Infomask, Infomask2, TupleVersionMetadata, TxId, VisibilityError};

/// Line pointer number within a page (1-based).
pub type SlotId = u16;

/// State of a line pointer (`lp_flags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LinePointerFlags {
    /// Free for reuse.
    Unused = 0,
    /// Points at a tuple.
    Normal = 1,
    /// HOT redirect; `lp_off` holds the target line pointer.
    Redirect = 2,
    /// Tuple is dead; storage may already be reclaimed.
    Dead = 3,
}

impl TryFrom<u8> for LinePointerFlags {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LinePointerFlags::Unused),
            1 => Ok(LinePointerFlags::Normal),
            2 => Ok(LinePointerFlags::Redirect),
            3 => Ok(LinePointerFlags::Dead),
            other => Err(format!("invalid lp_flags {}", other)),
        }
    }
}

impl From<LinePointerFlags> for u8 {
    fn from(flags: LinePointerFlags) -> Self {
        flags as u8
    }
}

/// Physical location of a tuple: `(block, line pointer)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemPointer {
    pub block: u64,
    pub offset: SlotId,
}

impl ItemPointer {
    pub const fn new(block: u64, offset: SlotId) -> Self {
        Self { block, offset }
    }
}

impl fmt::Display for ItemPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.block, self.offset)
    }
}

impl FromStr for ItemPointer {
    type Err = String;

    /// Parses the `(block,offset)` text form used for `ctid`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid item pointer {:?}", s);
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let (block, offset) = inner.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            block: block.trim().parse().map_err(|_| invalid())?,
            offset: offset.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ItemPointer {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemPointer> for String {
    fn from(ptr: ItemPointer) -> Self {
        ptr.to_string()
    }
}

/// One row of `heap_page_items()`.
///
/// Tuple header fields are absent (`null`) for line pointers that do not
/// point at a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapItem {
    pub lp: SlotId,
    #[serde(default)]
    pub lp_off: u16,
    pub lp_flags: LinePointerFlags,
    #[serde(default)]
    pub lp_len: u16,
    #[serde(default)]
    pub t_xmin: Option<TxId>,
    #[serde(default)]
    pub t_xmax: Option<TxId>,
    #[serde(default)]
    pub t_infomask: Option<Infomask>,
    #[serde(default)]
    pub t_infomask2: Option<Infomask2>,
    #[serde(default)]
    pub t_ctid: Option<ItemPointer>,
}

impl HeapItem {
    /// Decodes one row from a JSON key/value map.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, VisibilityError> {
        Ok(Self::deserialize(value)?)
    }

    /// A `Normal` line pointer with the given tuple header.
    pub fn tuple(lp: SlotId, t_xmin: TxId, t_xmax: TxId, infomask: Infomask) -> Self {
        Self {
            lp,
            lp_off: 0,
            lp_flags: LinePointerFlags::Normal,
            lp_len: 0,
            t_xmin: Some(t_xmin),
            t_xmax: Some(t_xmax),
            t_infomask: Some(infomask),
            t_infomask2: Some(Infomask2::default()),
            t_ctid: None,
        }
    }

    /// A redirect line pointer to `target`.
    pub fn redirect(lp: SlotId, target: SlotId) -> Self {
        Self {
            lp,
            lp_off: target,
            lp_flags: LinePointerFlags::Redirect,
            lp_len: 0,
            t_xmin: None,
            t_xmax: None,
            t_infomask: None,
            t_infomask2: None,
            t_ctid: None,
        }
    }

    /// Sets `t_ctid` (builder style).
    pub fn with_ctid(self, t_ctid: ItemPointer) -> Self {
        Self {
            t_ctid: Some(t_ctid),
            ..self
        }
    }

    /// Sets `t_infomask2` (builder style).
    pub fn with_infomask2(self, infomask2: Infomask2) -> Self {
        Self {
            t_infomask2: Some(infomask2),
            ..self
        }
    }

    pub fn is_normal(&self) -> bool {
        self.lp_flags == LinePointerFlags::Normal
    }

    /// Target line pointer of a redirect.
    pub fn redirect_target(&self) -> Option<SlotId> {
        (self.lp_flags == LinePointerFlags::Redirect).then_some(self.lp_off)
    }

    /// `unused`, `normal`, `redirect to N` or `dead`.
    pub fn state_label(&self) -> String {
        match self.lp_flags {
            LinePointerFlags::Unused => "unused".to_string(),
            LinePointerFlags::Normal => "normal".to_string(),
            LinePointerFlags::Redirect => format!("redirect to {}", self.lp_off),
            LinePointerFlags::Dead => "dead".to_string(),
        }
    }

    pub fn infomask(&self) -> Infomask {
        self.t_infomask.unwrap_or_default()
    }

    pub fn infomask2(&self) -> Infomask2 {
        self.t_infomask2.unwrap_or_default()
    }

    /// Visibility metadata of the tuple this line pointer points at.
    ///
    /// Returns `Ok(None)` for line pointers without a tuple.
    ///
    /// # Errors
    ///
    /// [`VisibilityError::MalformedRecord`] if a `Normal` item has no
    /// `t_xmin`, and [`VisibilityError::ContradictoryStatus`] if its hint
    /// bits mark a transaction both committed and aborted.
    pub fn metadata(&self) -> Result<Option<TupleVersionMetadata>, VisibilityError> {
        if !self.is_normal() {
            return Ok(None);
        }
        let t_xmin = self
            .t_xmin
            .ok_or_else(|| VisibilityError::MalformedRecord(format!("lp {} has no t_xmin", self.lp)))?;
        let t_xmax = self.t_xmax.unwrap_or(TxId::INVALID);
        TupleVersionMetadata::from_infomask(t_xmin, t_xmax, self.infomask()).map(Some)
    }
}

/// One row of `bt_page_items()` on a B-tree leaf page.
///
/// `htid` is the heap tuple the index entry points at. For a HOT chain that
/// is the chain head, which pruning may turn into a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexItem {
    pub itemoffset: SlotId,
    pub htid: ItemPointer,
    /// Set once an index scan finds every heap version dead.
    #[serde(default)]
    pub dead: bool,
}

impl IndexItem {
    pub const fn new(itemoffset: SlotId, htid: ItemPointer) -> Self {
        Self {
            itemoffset,
            htid,
            dead: false,
        }
    }

    /// Decodes one row from a JSON key/value map.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, VisibilityError> {
        Ok(Self::deserialize(value)?)
    }
}
