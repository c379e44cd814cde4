//! Heap page offsets and size constants.
//!
//! A page is described by the three offsets kept in its header plus its
//! total size:
//!
//! ```text
//! +------------------+ 0
//! | PageHeader (24B) |
//! +------------------+ 24
//! | Item pointers    | (grows toward higher offsets)
//! +------------------+ lower
//! | Free space       |
//! +------------------+ upper
//! | Items            | (grows toward lower offsets)
//! +------------------+ special
//! | Special space    | (absent when special == pagesize)
//! +------------------+ pagesize
//! ```

use serde::{Deserialize, Serialize};

use super::error::PageLayoutError;
use super::layout::{self, PageRegions};

/// 8KB page size (PostgreSQL's default `block_size`).
pub const PAGE_SIZE: u32 = 8192;

/// Size of the page header in bytes.
pub const PAGE_HEADER_SIZE: u32 = 24;

/// Size of one item pointer (line pointer) in bytes.
pub const ITEM_ID_SIZE: u32 = 4;

/// Fill factor of a heap table created without a `fillfactor` option.
pub const DEFAULT_FILLFACTOR: u8 = 100;

/// Smallest fill factor a heap table accepts.
pub const MIN_FILLFACTOR: u8 = 10;

/// Rounds a length up to the 8-byte alignment used for tuple storage.
pub const fn max_align(len: u32) -> u32 {
    (len + 7) & !7
}

/// Offsets of one fixed-size page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// End of the item-pointer array / start of free space.
    pub lower: u32,
    /// End of free space / start of item data.
    pub upper: u32,
    /// Start of the special space.
    pub special: u32,
    /// Total page size.
    pub pagesize: u32,
}

impl Page {
    pub const fn new(lower: u32, upper: u32, special: u32, pagesize: u32) -> Self {
        Self {
            lower,
            upper,
            special,
            pagesize,
        }
    }

    /// An initialized heap page with no items and no special space.
    pub const fn empty(pagesize: u32) -> Self {
        Self::new(PAGE_HEADER_SIZE, pagesize, pagesize, pagesize)
    }

    /// A heap page holding `line_pointers` item pointers and `item_bytes`
    /// bytes of tuple data, with no special space.
    ///
    /// Offsets that do not fit are left for [`Page::validate`] to reject.
    pub const fn heap(pagesize: u32, line_pointers: u32, item_bytes: u32) -> Self {
        Self::new(
            PAGE_HEADER_SIZE.saturating_add(line_pointers.saturating_mul(ITEM_ID_SIZE)),
            pagesize.saturating_sub(item_bytes),
            pagesize,
            pagesize,
        )
    }

    /// Checks `24 <= lower <= upper <= special <= pagesize`.
    pub fn validate(&self) -> Result<(), PageLayoutError> {
        let ok = PAGE_HEADER_SIZE <= self.lower
            && self.lower <= self.upper
            && self.upper <= self.special
            && self.special <= self.pagesize;
        if ok {
            Ok(())
        } else {
            Err(PageLayoutError::Inconsistent {
                lower: self.lower,
                upper: self.upper,
                special: self.special,
                pagesize: self.pagesize,
            })
        }
    }

    /// Whether the page reserves a special space at its end.
    pub fn has_special(&self) -> bool {
        self.special < self.pagesize
    }

    /// Contiguous free bytes between the item pointers and the items.
    pub fn free_space(&self) -> u32 {
        self.upper.saturating_sub(self.lower)
    }

    /// Free bytes usable by a new tuple, after reserving its item pointer.
    pub fn heap_free_space(&self) -> u32 {
        self.free_space().saturating_sub(ITEM_ID_SIZE)
    }

    /// Number of item pointers in the array (used, redirected, or unused).
    pub fn line_pointer_count(&self) -> u32 {
        self.lower.saturating_sub(PAGE_HEADER_SIZE) / ITEM_ID_SIZE
    }

    /// Splits the page into labelled regions.
    pub fn describe(&self) -> Result<PageRegions, PageLayoutError> {
        layout::describe(self)
    }

    /// Whether the next access to this page would prune it.
    ///
    /// A heap page is pruned when its free space drops below the space the
    /// fill factor reserves for updates, and never later than when less than
    /// a tenth of the page is free.
    pub fn needs_pruning(&self, fillfactor: u8) -> Result<bool, PageLayoutError> {
        if !(MIN_FILLFACTOR..=100).contains(&fillfactor) {
            return Err(PageLayoutError::FillFactor(fillfactor));
        }
        self.validate()?;

        let reserved = (u64::from(self.pagesize) * u64::from(100 - fillfactor) / 100) as u32;
        let min_free = reserved.max(self.pagesize / 10);
        Ok(self.heap_free_space() < min_free)
    }
}
