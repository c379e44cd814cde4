//! Physical page layout model.
//!
//! All heap data lives in fixed-size pages (8KB by default, matching
//! PostgreSQL). This module models a page by the offsets in its header and
//! explains what those offsets mean:
//!
//! - [`Page`]: the `lower` / `upper` / `special` / `pagesize` offsets, plus
//!   the fill-factor pruning threshold
//! - [`PageRegions`]: the labelled byte ranges of a page, printable as a box
//!   diagram
//! - [`FreeSpaceReport`]: free-space ratios per block and averaged across a
//!   relation
//!
//! Nothing here reads page images; callers supply the offsets.

pub mod error;
pub mod freespace;
pub mod layout;
pub mod page;

pub use error::PageLayoutError;
pub use freespace::{
    FreeSpaceEntry, FreeSpaceReport, FreeSpaceSummary, average_free_space_ratio,
    free_space_ratio, size_pretty,
};
pub use layout::{PageRegions, Region, RegionKind, describe};
pub use page::{
    DEFAULT_FILLFACTOR, ITEM_ID_SIZE, MIN_FILLFACTOR, PAGE_HEADER_SIZE, PAGE_SIZE, Page,
    max_align,
};
