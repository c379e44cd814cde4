//! Region breakdown of a page.
//!
//! [`describe`] turns a [`Page`]'s offsets into contiguous, labelled byte
//! ranges. [`PageRegions`] renders them as a box diagram:
//!
//! ```text
//! +------------------------+ 0
//! | Header                 | 24 bytes
//! +------------------------+ 24
//! | ItemPointers           | 40 bytes
//! +------------------------+ 64
//! | FreeSpace              | 7368 bytes
//! +------------------------+ 7432
//! | Items                  | 760 bytes
//! +------------------------+ 8192
//! ```

use std::fmt;

use super::error::PageLayoutError;
use super::page::{PAGE_HEADER_SIZE, Page};

/// Kind of a page region, in increasing-offset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionKind {
    Header,
    ItemPointers,
    FreeSpace,
    Items,
    Special,
}

impl RegionKind {
    pub fn label(&self) -> &'static str {
        match self {
            RegionKind::Header => "Header",
            RegionKind::ItemPointers => "ItemPointers",
            RegionKind::FreeSpace => "FreeSpace",
            RegionKind::Items => "Items",
            RegionKind::Special => "Special",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A half-open byte range `[start, end)` of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub start: u32,
    pub end: u32,
}

impl Region {
    /// Length of the region in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {})", self.kind, self.start, self.end)
    }
}

/// The regions of one page, contiguous and covering `[0, pagesize)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegions {
    regions: Vec<Region>,
}

impl PageRegions {
    /// Regions in increasing-offset order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, kind: RegionKind) -> Option<&Region> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    pub fn has_special(&self) -> bool {
        self.get(RegionKind::Special).is_some()
    }

    /// Total size covered, equal to the page size.
    pub fn total_len(&self) -> u32 {
        self.regions.last().map_or(0, |r| r.end)
    }
}

/// Splits a page into its header, item-pointer, free-space, item and
/// (when present) special regions.
///
/// # Errors
///
/// [`PageLayoutError::Inconsistent`] if the offsets violate
/// `24 <= lower <= upper <= special <= pagesize`.
pub fn describe(page: &Page) -> Result<PageRegions, PageLayoutError> {
    page.validate()?;

    let mut regions = vec![
        Region {
            kind: RegionKind::Header,
            start: 0,
            end: PAGE_HEADER_SIZE,
        },
        Region {
            kind: RegionKind::ItemPointers,
            start: PAGE_HEADER_SIZE,
            end: page.lower,
        },
        Region {
            kind: RegionKind::FreeSpace,
            start: page.lower,
            end: page.upper,
        },
        Region {
            kind: RegionKind::Items,
            start: page.upper,
            end: page.special,
        },
    ];
    if page.has_special() {
        regions.push(Region {
            kind: RegionKind::Special,
            start: page.special,
            end: page.pagesize,
        });
    }

    Ok(PageRegions { regions })
}

const BOX_WIDTH: usize = 24;

impl fmt::Display for PageRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}+", "-".repeat(BOX_WIDTH));
        for region in &self.regions {
            writeln!(f, "{} {}", border, region.start)?;
            writeln!(
                f,
                "| {:<width$} | {} bytes",
                region.kind.label(),
                region.len(),
                width = BOX_WIDTH - 2
            )?;
        }
        writeln!(f, "{} {}", border, self.total_len())
    }
}
