//! HOT chains and page pruning, as a sequence of described states.
//!
//! A HOT (heap-only tuple) update writes the new version on the same page
//! and links it from the old one, without new index entries. Pruning later
//! reclaims the dead versions, leaving a redirect line pointer at the head
//! of the chain so index entries still resolve.
//!
//! Nothing here simulates a page. [`hot_chain_scenario`] is fixed data
//! describing the canonical insert, update, prune and chain-split sequence,
//! with the [`Page`] offsets at each point.

use std::fmt;

use crate::storage::{PAGE_SIZE, Page, max_align};
use crate::table::TextTable;

use super::item::{HeapItem, SlotId};

/// Bytes of a tuple header.
const TUPLE_HEADER_SIZE: u32 = 24;

/// Stored length of a `char(2000)` column value.
const SCENARIO_VALUE_SIZE: u32 = 2004;

/// Aligned size of one tuple in the scenario table.
pub const SCENARIO_TUPLE_SIZE: u32 = max_align(TUPLE_HEADER_SIZE + SCENARIO_VALUE_SIZE);

/// Fill factor of the scenario table.
pub const SCENARIO_FILLFACTOR: u8 = 75;

/// One line pointer of a HOT chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStep {
    pub tuple_slot: SlotId,
    /// Whether the version's creator committed. Always false for redirects.
    pub committed: bool,
    pub is_redirect: bool,
    pub redirect_target: Option<SlotId>,
}

impl ChainStep {
    /// A line pointer holding a tuple version.
    pub const fn normal(tuple_slot: SlotId, committed: bool) -> Self {
        Self {
            tuple_slot,
            committed,
            is_redirect: false,
            redirect_target: None,
        }
    }

    /// A redirect line pointer left behind by pruning.
    pub const fn redirect(tuple_slot: SlotId, target: SlotId) -> Self {
        Self {
            tuple_slot,
            committed: false,
            is_redirect: true,
            redirect_target: Some(target),
        }
    }

    /// Chain step for a heap page item; `None` for unused and dead line
    /// pointers, which are not part of any chain.
    pub fn from_item(item: &HeapItem) -> Option<Self> {
        if let Some(target) = item.redirect_target() {
            return Some(Self::redirect(item.lp, target));
        }
        item.is_normal()
            .then(|| Self::normal(item.lp, item.infomask().xmin_committed()))
    }

    /// `normal` or `redirect to N`.
    pub fn state_label(&self) -> String {
        match self.redirect_target {
            Some(target) if self.is_redirect => format!("redirect to {}", target),
            _ => "normal".to_string(),
        }
    }
}

/// Renders steps as a `ctid | state | xmin` table on block 0.
///
/// The `xmin` column shows `c` for committed versions.
pub fn render(steps: &[ChainStep]) -> String {
    let mut table = TextTable::new(&["ctid", "state", "xmin"]);
    for step in steps {
        let xmin = if !step.is_redirect && step.committed {
            "c"
        } else {
            ""
        };
        table.push_row(vec![
            format!("(0,{})", step.tuple_slot),
            step.state_label(),
            xmin.to_string(),
        ]);
    }
    table.render()
}

/// Phases of the HOT chain scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    Initial,
    AfterInsert,
    /// After the n-th update of the same row.
    AfterUpdate(u32),
    AfterPruning,
    AfterChainSplit,
}

impl fmt::Display for ChainPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainPhase::Initial => f.write_str("initial"),
            ChainPhase::AfterInsert => f.write_str("after insert"),
            ChainPhase::AfterUpdate(n) => write!(f, "after update #{}", n),
            ChainPhase::AfterPruning => f.write_str("after pruning"),
            ChainPhase::AfterChainSplit => f.write_str("after chain split"),
        }
    }
}

/// Page 0 of the scenario table at one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pub phase: ChainPhase,
    pub caption: &'static str,
    pub steps: Vec<ChainStep>,
    pub page: Page,
}

impl ChainState {
    fn new(phase: ChainPhase, caption: &'static str, steps: Vec<ChainStep>) -> Self {
        let line_pointers = steps.iter().map(|s| u32::from(s.tuple_slot)).max().unwrap_or(0);
        let tuples = steps.iter().filter(|s| !s.is_redirect).count() as u32;
        Self {
            phase,
            caption,
            steps,
            page: Page::heap(PAGE_SIZE, line_pointers, tuples * SCENARIO_TUPLE_SIZE),
        }
    }

    /// Number of tuple versions stored on the page.
    pub fn tuple_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_redirect).count()
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.phase)?;
        writeln!(f, "{}", self.caption)?;
        writeln!(
            f,
            "lower {}, upper {}, {} bytes free",
            self.page.lower,
            self.page.upper,
            self.page.free_space()
        )?;
        if !self.steps.is_empty() {
            writeln!(f)?;
            f.write_str(&render(&self.steps))?;
        }
        Ok(())
    }
}

/// The canonical HOT chain sequence on a `fillfactor = 75` table whose rows
/// hold one `char(2000)` column and carry no index on the updated column.
///
/// Four tuples fill a page. The third update leaves less free space than
/// the fill factor reserves, so the fourth update prunes the page first.
pub fn hot_chain_scenario() -> Vec<ChainState> {
    vec![
        ChainState::new(ChainPhase::Initial, "empty page", vec![]),
        ChainState::new(
            ChainPhase::AfterInsert,
            "one row inserted, creator not yet known to be committed",
            vec![ChainStep::normal(1, false)],
        ),
        ChainState::new(
            ChainPhase::AfterUpdate(1),
            "HOT update: new version on the same page, linked from the old one",
            vec![ChainStep::normal(1, true), ChainStep::normal(2, false)],
        ),
        ChainState::new(
            ChainPhase::AfterUpdate(2),
            "chain of three versions",
            vec![
                ChainStep::normal(1, true),
                ChainStep::normal(2, true),
                ChainStep::normal(3, false),
            ],
        ),
        ChainState::new(
            ChainPhase::AfterUpdate(3),
            "page full: free space is below the fill factor reserve",
            vec![
                ChainStep::normal(1, true),
                ChainStep::normal(2, true),
                ChainStep::normal(3, true),
                ChainStep::normal(4, false),
            ],
        ),
        ChainState::new(
            ChainPhase::AfterPruning,
            "fourth update pruned dead versions first: lp 1 redirects to the \
             live head, lp 3 is unused, the new version reuses lp 2",
            vec![
                ChainStep::redirect(1, 4),
                ChainStep::normal(2, false),
                ChainStep::normal(4, true),
            ],
        ),
        ChainState::new(
            ChainPhase::AfterChainSplit,
            "a repeatable read snapshot still sees the old versions, so pruning \
             frees nothing and the next update goes to page 1",
            vec![
                ChainStep::redirect(1, 2),
                ChainStep::normal(2, true),
                ChainStep::normal(3, true),
                ChainStep::normal(4, true),
                ChainStep::normal(5, true),
            ],
        ),
    ]
}
