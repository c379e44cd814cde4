//! MVCC (Multi-Version Concurrency Control) visibility.
//!
//! This module implements the pieces needed to reason about which tuple
//! versions a reader can see:
//! - Transaction ids and commit-status normalization
//! - Snapshots (`xmin:xmax:xip`) for consistent reads
//! - Visibility rules over a tuple version's xmin/xmax
//! - The anomalies permitted by each isolation level

pub mod error;
pub mod isolation;
pub mod snapshot;
pub mod tuple;
pub mod types;
pub mod visibility;

pub use error::{SnapshotField, SnapshotParseError, StatusField, VisibilityError};
pub use isolation::{Anomaly, IsolationLevel, render_anomaly_table};
pub use snapshot::Snapshot;
pub use tuple::{TupleRecord, TupleVersionMetadata};
pub use types::{Infomask, Infomask2, TxId, TxStatus};
pub use visibility::{Verdict, VisibilityRule, evaluate, is_visible};
