//! Heap page contents.
//!
//! A heap page stores table rows in a slotted layout: line pointers grow
//! from the header, tuples grow from the end of the page. This module reads
//! that structure as reported by `pageinspect`:
//!
//! - [`HeapItem`]: one line pointer and its tuple header
//! - [`IndexItem`]: one B-tree leaf entry pointing into the heap
//! - [`inspect`]: annotated listing of a page, optionally judged against a
//!   snapshot
//! - [`hot_chain_scenario`]: how HOT updates and pruning reshape a page

mod chain;
mod inspect;
mod item;

pub use chain::{
    ChainPhase, ChainState, ChainStep, SCENARIO_FILLFACTOR, SCENARIO_TUPLE_SIZE,
    hot_chain_scenario, render,
};
pub use inspect::{ItemRow, SnapshotView, inspect, render_index_items, render_items};
pub use item::{HeapItem, IndexItem, ItemPointer, LinePointerFlags, SlotId};
