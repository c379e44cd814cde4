//! Annotated listing of a heap page's items.
//!
//! Produces the same view as a `heap_page(rel, blkno)` helper over
//! `pageinspect`: one row per line pointer with its state, xmin/xmax
//! annotated with their hint bits (`c` committed, `a` aborted), the HOT
//! flags and `t_ctid`. When a snapshot is supplied, each tuple also gets a
//! visibility verdict.

use crate::table::TextTable;
use crate::tx::{Snapshot, TxId, Verdict, VisibilityError, evaluate};

use super::item::{HeapItem, IndexItem, ItemPointer};

/// The snapshot (and optional reading transaction) to judge tuples by.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView<'a> {
    pub snapshot: &'a Snapshot,
    pub reading_xid: Option<TxId>,
}

/// One annotated line pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub ctid: ItemPointer,
    pub state: String,
    /// `t_xmin` with hint suffix, empty without a tuple.
    pub xmin: String,
    /// `t_xmax` with hint suffix, empty without a tuple.
    pub xmax: String,
    /// Heap Hot Updated: follow `t_ctid` to the next version.
    pub hot_updated: bool,
    /// Heap Only Tuple: not referenced from any index.
    pub heap_only: bool,
    pub t_ctid: Option<ItemPointer>,
    /// Present only when inspected under a snapshot and the line pointer
    /// holds a tuple.
    pub verdict: Option<Verdict>,
}

/// Annotates the items of block `block`.
///
/// # Errors
///
/// With a snapshot, fails on the first item whose tuple header cannot be
/// normalized (see [`HeapItem::metadata`]) or evaluated. Bad data is never
/// rendered as "not visible". Without a snapshot the hint bits are only
/// annotated, so frozen tuples list as committed.
pub fn inspect(
    block: u64,
    items: &[HeapItem],
    view: Option<SnapshotView<'_>>,
) -> Result<Vec<ItemRow>, VisibilityError> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let verdict = match view {
            Some(view) => item
                .metadata()?
                .map(|meta| evaluate(&meta, view.snapshot, view.reading_xid))
                .transpose()?,
            None => None,
        };

        let (xmin, xmax) = match item.t_xmin {
            Some(t_xmin) if item.is_normal() => {
                let mask = item.infomask();
                (
                    annotate(t_xmin, mask.xmin_committed(), mask.xmin_aborted()),
                    annotate(
                        item.t_xmax.unwrap_or(TxId::INVALID),
                        mask.xmax_committed(),
                        mask.xmax_aborted(),
                    ),
                )
            }
            _ => (String::new(), String::new()),
        };

        rows.push(ItemRow {
            ctid: ItemPointer::new(block, item.lp),
            state: item.state_label(),
            xmin,
            xmax,
            hot_updated: item.infomask2().hot_updated(),
            heap_only: item.infomask2().heap_only(),
            t_ctid: item.t_ctid,
            verdict,
        });
    }

    tracing::debug!(block, items = rows.len(), with_snapshot = view.is_some(), "inspected heap page");
    Ok(rows)
}

/// Committed wins when both bits are set (a frozen xmin).
fn annotate(xid: TxId, committed: bool, aborted: bool) -> String {
    let suffix = if committed {
        " c"
    } else if aborted {
        " a"
    } else {
        ""
    };
    format!("{}{}", xid, suffix)
}

fn flag(set: bool) -> String {
    if set { "t".to_string() } else { String::new() }
}

/// Renders annotated rows as a table.
///
/// A `visible` column is added when any row carries a verdict.
pub fn render_items(rows: &[ItemRow]) -> String {
    let with_visibility = rows.iter().any(|row| row.verdict.is_some());
    let mut headers = vec!["ctid", "state", "xmin", "xmax", "hhu", "hot", "t_ctid"];
    if with_visibility {
        headers.push("visible");
    }

    let mut table = TextTable::new(&headers);
    for row in rows {
        let mut cells = vec![
            row.ctid.to_string(),
            row.state.clone(),
            row.xmin.clone(),
            row.xmax.clone(),
            flag(row.hot_updated),
            flag(row.heap_only),
            row.t_ctid.map(|c| c.to_string()).unwrap_or_default(),
        ];
        if with_visibility {
            let visible = match row.verdict {
                Some(verdict) if verdict.visible => "t",
                Some(_) => "f",
                None => "",
            };
            cells.push(visible.to_string());
        }
        table.push_row(cells);
    }
    table.render()
}

/// Renders B-tree leaf items as an `itemoffset | htid | dead` table.
pub fn render_index_items(items: &[IndexItem]) -> String {
    let mut table = TextTable::new(&["itemoffset", "htid", "dead"]).align_right(0);
    for item in items {
        let dead = if item.dead { "t" } else { "f" };
        table.push_row(vec![
            item.itemoffset.to_string(),
            item.htid.to_string(),
            dead.to_string(),
        ]);
    }
    tracing::debug!(items = items.len(), "rendered index page");
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::LinePointerFlags;
    use crate::tx::{Infomask, Infomask2, VisibilityRule};

    /// Page after one HOT update by 791 of a row inserted by 790, plus an
    /// unused slot.
    fn hot_updated_page() -> Vec<HeapItem> {
        vec![
            HeapItem::tuple(
                1,
                TxId::new(790),
                TxId::new(791),
                Infomask::empty().with_xmin_committed(),
            )
            .with_infomask2(Infomask2::from_raw(Infomask2::HEAP_HOT_UPDATED))
            .with_ctid(ItemPointer::new(0, 2)),
            HeapItem::tuple(
                2,
                TxId::new(791),
                TxId::INVALID,
                Infomask::empty().with_xmax_aborted(),
            )
            .with_infomask2(Infomask2::from_raw(Infomask2::HEAP_ONLY_TUPLE))
            .with_ctid(ItemPointer::new(0, 2)),
            HeapItem {
                lp_flags: LinePointerFlags::Unused,
                ..HeapItem::redirect(3, 0)
            },
        ]
    }

    #[test]
    fn test_inspect_annotates_hint_bits() {
        let rows = inspect(0, &hot_updated_page(), None).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].ctid, ItemPointer::new(0, 1));
        assert_eq!(rows[0].xmin, "790 c");
        assert_eq!(rows[0].xmax, "791");
        assert!(rows[0].hot_updated);
        assert!(!rows[0].heap_only);

        assert_eq!(rows[1].xmin, "791");
        assert_eq!(rows[1].xmax, "0 a");
        assert!(rows[1].heap_only);

        assert_eq!(rows[2].state, "unused");
        assert_eq!(rows[2].xmin, "");
        assert!(rows.iter().all(|row| row.verdict.is_none()));
    }

    #[test]
    fn test_inspect_redirect() {
        let items = [
            HeapItem::redirect(1, 4),
            HeapItem::tuple(4, TxId::new(795), TxId::INVALID, Infomask::empty()),
        ];
        let snapshot = Snapshot::parse("796:796:").unwrap();
        let view = SnapshotView {
            snapshot: &snapshot,
            reading_xid: None,
        };
        let rows = inspect(3, &items, Some(view)).unwrap();

        assert_eq!(rows[0].ctid.to_string(), "(3,1)");
        assert_eq!(rows[0].state, "redirect to 4");
        assert_eq!(rows[0].verdict, None);
        assert_eq!(rows[1].verdict.map(|v| v.visible), Some(true));
    }

    #[test]
    fn test_inspect_with_snapshot() {
        let snapshot = Snapshot::parse("791:792:791").unwrap();

        let outsider = SnapshotView {
            snapshot: &snapshot,
            reading_xid: None,
        };
        let rows = inspect(0, &hot_updated_page(), Some(outsider)).unwrap();
        let old = rows[0].verdict.unwrap();
        let new = rows[1].verdict.unwrap();
        assert!(old.visible);
        assert_eq!(old.rule, VisibilityRule::DeleteInProgress);
        assert!(!new.visible);
        assert_eq!(new.rule, VisibilityRule::CreatorInProgress);

        let updater = SnapshotView {
            snapshot: &snapshot,
            reading_xid: Some(TxId::new(791)),
        };
        let rows = inspect(0, &hot_updated_page(), Some(updater)).unwrap();
        assert_eq!(rows[0].verdict.map(|v| v.rule), Some(VisibilityRule::OwnDelete));
        assert_eq!(rows[1].verdict.map(|v| v.rule), Some(VisibilityRule::OwnInsert));
    }

    #[test]
    fn test_inspect_lists_frozen_tuple() {
        // Frozen: both xmin bits, plus XMAX_INVALID
        let items = [HeapItem::tuple(1, TxId::new(2), TxId::INVALID, Infomask::from_raw(0x0B00))];
        let rows = inspect(0, &items, None).unwrap();
        assert_eq!(rows[0].xmin, "2 c");
        assert_eq!(rows[0].xmax, "0 a");
        assert_eq!(rows[0].verdict, None);
    }

    #[test]
    fn test_inspect_rejects_contradictory_hints_under_snapshot() {
        let mask = Infomask::empty().with_xmin_committed().with_xmin_aborted();
        let items = [HeapItem::tuple(1, TxId::new(5), TxId::INVALID, mask)];
        let snapshot = Snapshot::parse("10:10:").unwrap();
        let view = SnapshotView {
            snapshot: &snapshot,
            reading_xid: None,
        };
        assert!(matches!(
            inspect(0, &items, Some(view)),
            Err(VisibilityError::ContradictoryStatus { .. })
        ));
    }

    #[test]
    fn test_render_items() {
        let rows = inspect(0, &hot_updated_page(), None).unwrap();
        let expected = "\
 ctid  | state  | xmin  | xmax | hhu | hot | t_ctid
-------+--------+-------+------+-----+-----+--------
 (0,1) | normal | 790 c | 791  | t   |     | (0,2)
 (0,2) | normal | 791   | 0 a  |     | t   | (0,2)
 (0,3) | unused |       |      |     |     |
";
        assert_eq!(render_items(&rows), expected);
    }

    #[test]
    fn test_render_items_with_visibility() {
        let snapshot = Snapshot::parse("791:792:791").unwrap();
        let view = SnapshotView {
            snapshot: &snapshot,
            reading_xid: None,
        };
        let rows = inspect(0, &hot_updated_page(), Some(view)).unwrap();
        let expected = "\
 ctid  | state  | xmin  | xmax | hhu | hot | t_ctid | visible
-------+--------+-------+------+-----+-----+--------+---------
 (0,1) | normal | 790 c | 791  | t   |     | (0,2)  | t
 (0,2) | normal | 791   | 0 a  |     | t   | (0,2)  | f
 (0,3) | unused |       |      |     |     |        |
";
        assert_eq!(render_items(&rows), expected);
    }

    #[test]
    fn test_render_index_items() {
        let items = [
            IndexItem::new(1, ItemPointer::new(0, 1)),
            IndexItem {
                dead: true,
                ..IndexItem::new(2, ItemPointer::new(0, 4))
            },
        ];
        let expected = "\
 itemoffset | htid  | dead
------------+-------+------
          1 | (0,1) | f
          2 | (0,4) | t
";
        assert_eq!(render_index_items(&items), expected);
    }
}
