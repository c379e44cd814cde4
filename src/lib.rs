//! Inspection toolkit for PostgreSQL-style heap storage.
//!
//! - [`tx`]: snapshots and MVCC tuple visibility
//! - [`storage`]: page layout, free space and pruning thresholds
//! - [`heap`]: heap page items and HOT chains

pub mod heap;
pub mod storage;
pub mod tx;

mod table;
