//! MVCC visibility rules.
//!
//! Determines whether a tuple version is visible to a snapshot, given the
//! commit-log resolution of its creating and deleting transactions and,
//! optionally, the id of the transaction performing the read.
//!
//! The rules follow PostgreSQL's heap visibility at snapshot-isolation
//! granularity. Command ids inside a single transaction are not modelled:
//! a transaction sees everything it inserted and nothing it deleted.

use std::fmt;

use super::error::VisibilityError;
use super::snapshot::Snapshot;
use super::tuple::TupleVersionMetadata;
use super::types::{TxId, TxStatus};

/// The rule that decided a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityRule {
    /// The creating transaction rolled back.
    CreatorAborted,
    /// Another, still uncommitted transaction created the version.
    CreatorInProgress,
    /// The reader created the version and has not deleted it.
    OwnInsert,
    /// The reader itself deleted the version.
    OwnDelete,
    /// The creator committed, but was active relative to the snapshot.
    CreatorConcurrent,
    /// Committed creator, no deleter.
    Live,
    /// The deleting transaction rolled back.
    DeleterAborted,
    /// Another transaction is deleting the version but has not committed.
    DeleteInProgress,
    /// The delete committed before the snapshot was taken.
    DeletedBeforeSnapshot,
    /// The delete committed, but was active relative to the snapshot.
    DeleterConcurrent,
}

impl VisibilityRule {
    /// Short human-readable explanation.
    pub fn description(&self) -> &'static str {
        match self {
            VisibilityRule::CreatorAborted => "creating transaction aborted",
            VisibilityRule::CreatorInProgress => "created by another uncommitted transaction",
            VisibilityRule::OwnInsert => "inserted by the reading transaction",
            VisibilityRule::OwnDelete => "deleted by the reading transaction",
            VisibilityRule::CreatorConcurrent => "creator was active when the snapshot was taken",
            VisibilityRule::Live => "committed and not deleted",
            VisibilityRule::DeleterAborted => "deleting transaction aborted",
            VisibilityRule::DeleteInProgress => "delete not yet committed",
            VisibilityRule::DeletedBeforeSnapshot => "deleted before the snapshot was taken",
            VisibilityRule::DeleterConcurrent => "deleter was active when the snapshot was taken",
        }
    }
}

impl fmt::Display for VisibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Result of a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the tuple version is visible to the snapshot.
    pub visible: bool,
    /// The rule that decided it.
    pub rule: VisibilityRule,
}

impl Verdict {
    const fn new(visible: bool, rule: VisibilityRule) -> Self {
        Self { visible, rule }
    }
}

/// Determine if a tuple version is visible to a snapshot.
///
/// See [`evaluate`] for the rules.
pub fn is_visible(
    tuple: &TupleVersionMetadata,
    snapshot: &Snapshot,
    reading_xid: Option<TxId>,
) -> Result<bool, VisibilityError> {
    evaluate(tuple, snapshot, reading_xid).map(|verdict| verdict.visible)
}

/// Determine visibility and report the deciding rule.
///
/// Evaluated in this order:
///
/// 1. **Creator aborted** - never visible.
/// 2. **Creator in progress** - visible only to the creator itself, and only
///    while it has not deleted the version again.
/// 3. **Creator committed**:
///    - creator active relative to the snapshot → not visible
///    - no deleter, or deleter aborted → visible
///    - deleter in progress → visible to everyone except the deleter
///    - deleter committed → visible iff the deleter was active relative to
///      the snapshot
///
/// The creation must be established as committed before the deletion is
/// looked at, so rules 1 and 2 come first.
///
/// # Errors
///
/// [`VisibilityError::MissingXmaxStatus`] if `t_xmax` is set without an
/// `xmax_status`. No verdict is guessed for such input.
pub fn evaluate(
    tuple: &TupleVersionMetadata,
    snapshot: &Snapshot,
    reading_xid: Option<TxId>,
) -> Result<Verdict, VisibilityError> {
    let verdict = match tuple.xmin_status {
        TxStatus::Aborted => Verdict::new(false, VisibilityRule::CreatorAborted),
        TxStatus::InProgress => {
            if reading_xid == Some(tuple.t_xmin) {
                if tuple.t_xmax.is_invalid() {
                    Verdict::new(true, VisibilityRule::OwnInsert)
                } else {
                    Verdict::new(false, VisibilityRule::OwnDelete)
                }
            } else {
                Verdict::new(false, VisibilityRule::CreatorInProgress)
            }
        }
        TxStatus::Committed => check_deletion(tuple, snapshot, reading_xid)?,
    };

    tracing::trace!(
        t_xmin = %tuple.t_xmin,
        t_xmax = %tuple.t_xmax,
        snapshot = %snapshot,
        visible = verdict.visible,
        rule = ?verdict.rule,
        "visibility check"
    );
    Ok(verdict)
}

/// Rule 3: the creator committed; decide from the snapshot and the deleter.
fn check_deletion(
    tuple: &TupleVersionMetadata,
    snapshot: &Snapshot,
    reading_xid: Option<TxId>,
) -> Result<Verdict, VisibilityError> {
    if snapshot.contains_active(tuple.t_xmin) {
        return Ok(Verdict::new(false, VisibilityRule::CreatorConcurrent));
    }

    let t_xmax = tuple.t_xmax;
    if t_xmax.is_invalid() {
        return Ok(Verdict::new(true, VisibilityRule::Live));
    }

    let xmax_status = tuple
        .xmax_status
        .ok_or(VisibilityError::MissingXmaxStatus { t_xmax })?;

    let verdict = match xmax_status {
        TxStatus::Aborted => Verdict::new(true, VisibilityRule::DeleterAborted),
        TxStatus::InProgress => {
            if reading_xid == Some(t_xmax) {
                Verdict::new(false, VisibilityRule::OwnDelete)
            } else {
                Verdict::new(true, VisibilityRule::DeleteInProgress)
            }
        }
        TxStatus::Committed => {
            if snapshot.contains_active(t_xmax) {
                Verdict::new(true, VisibilityRule::DeleterConcurrent)
            } else {
                Verdict::new(false, VisibilityRule::DeletedBeforeSnapshot)
            }
        }
    };
    Ok(verdict)
}
