//! Visibility scenarios driven through the record boundary.
//!
//! Tuple records arrive as key/value maps, are normalized into
//! `TupleVersionMetadata`, and are judged against parsed snapshots.

use heapscope::storage::{Page, PageLayoutError, RegionKind, free_space_ratio};
use heapscope::tx::{
    Snapshot, StatusField, TupleRecord, TupleVersionMetadata, TxId, TxStatus, VisibilityError,
    VisibilityRule, evaluate, is_visible,
};
use serde_json::{Value, json};

fn metadata(record: Value) -> TupleVersionMetadata {
    TupleRecord::from_json(&record)
        .and_then(TupleVersionMetadata::try_from)
        .unwrap()
}

fn visible(snapshot: &str, record: Value, reading_xid: Option<u64>) -> bool {
    let snapshot = Snapshot::parse(snapshot).unwrap();
    is_visible(&metadata(record), &snapshot, reading_xid.map(TxId::new)).unwrap()
}

#[test]
fn test_committed_before_snapshot_is_visible() {
    let record = json!({ "t_xmin": 99, "xmin_committed": true, "t_xmax": 0 });
    assert!(visible("100:105:101,103", record, None));
}

#[test]
fn test_concurrent_creator_is_invisible() {
    let record = json!({ "t_xmin": 101, "xmin_committed": true, "t_xmax": 0 });
    assert!(!visible("100:105:101,103", record, None));
}

#[test]
fn test_deleted_before_snapshot_is_invisible() {
    let record = json!({
        "t_xmin": 90,
        "xmin_committed": true,
        "t_xmax": 90,
        "xmax_committed": true,
    });
    assert!(!visible("100:105:[]", record, None));
}

#[test]
fn test_delete_by_concurrent_transaction_is_ignored() {
    let record = json!({
        "t_xmin": 90,
        "xmin_committed": true,
        "t_xmax": 103,
        "xmax_committed": true,
    });
    assert!(visible("100:105:101,103", record.clone(), None));

    // Committed after the snapshot was taken
    let record = json!({
        "t_xmin": 90,
        "xmin_committed": true,
        "t_xmax": 107,
        "xmax_committed": true,
    });
    assert!(visible("100:105:101,103", record, None));
}

#[test]
fn test_own_changes() {
    let inserted = json!({ "t_xmin": 103, "t_xmax": 0 });
    assert!(visible("100:105:101,103", inserted.clone(), Some(103)));
    assert!(!visible("100:105:101,103", inserted, Some(101)));

    let inserted_then_deleted = json!({ "t_xmin": 103, "t_xmax": 103 });
    assert!(!visible("100:105:101,103", inserted_then_deleted, Some(103)));

    let deleting = json!({ "t_xmin": 50, "xmin_committed": true, "t_xmax": 103 });
    assert!(!visible("100:105:101,103", deleting.clone(), Some(103)));
    assert!(visible("100:105:101,103", deleting, Some(101)));
}

#[test]
fn test_aborted_deleter_leaves_tuple_visible() {
    let record = json!({
        "t_xmin": 50,
        "xmin_committed": true,
        "t_xmax": 98,
        "xmax_aborted": true,
    });
    let snapshot = Snapshot::parse("100:105:").unwrap();
    let verdict = evaluate(&metadata(record), &snapshot, None).unwrap();
    assert!(verdict.visible);
    assert_eq!(verdict.rule, VisibilityRule::DeleterAborted);
}

#[test]
fn test_contradictory_record_is_rejected() {
    let record = json!({
        "t_xmin": 50,
        "xmin_committed": true,
        "xmin_aborted": true,
    });
    let err = TupleRecord::from_json(&record)
        .and_then(TupleVersionMetadata::try_from)
        .unwrap_err();
    assert_eq!(
        err,
        VisibilityError::ContradictoryStatus {
            field: StatusField::Xmin,
            xid: TxId::new(50),
        }
    );
}

#[test]
fn test_malformed_record_is_rejected() {
    for record in [json!({ "t_xmax": 5 }), json!({ "t_xmin": "abc" }), json!("790")] {
        assert!(matches!(
            TupleRecord::from_json(&record),
            Err(VisibilityError::MalformedRecord(_))
        ));
    }
}

#[test]
fn test_missing_xmax_status_is_an_error() {
    let tuple = TupleVersionMetadata {
        t_xmin: TxId::new(50),
        t_xmax: TxId::new(60),
        xmin_status: TxStatus::Committed,
        xmax_status: None,
    };
    let snapshot = Snapshot::parse("100:105:").unwrap();
    assert_eq!(
        is_visible(&tuple, &snapshot, None),
        Err(VisibilityError::MissingXmaxStatus {
            t_xmax: TxId::new(60)
        })
    );
}

#[test]
fn test_page_layout_scenarios() {
    assert_eq!(
        Page::new(100, 50, 200, 8192).describe(),
        Err(PageLayoutError::Inconsistent {
            lower: 100,
            upper: 50,
            special: 200,
            pagesize: 8192,
        })
    );

    let page = Page::new(64, 7432, 8192, 8192);
    let regions = page.describe().unwrap();
    assert!(regions.get(RegionKind::Special).is_none());
    assert!(!regions.to_string().contains("Special"));

    let ratio = free_space_ratio(7432 - 64, 8192);
    assert!((ratio - 89.94).abs() < 0.01);
}
