//! Snapshot for MVCC visibility.
//!
//! A snapshot captures which transactions were resolved at the moment it was
//! taken. It uses the same three-part structure as PostgreSQL's
//! `pg_current_snapshot()`, and the same text form: `xmin:xmax:xip_list`.
//!
//! # Transaction Ranges
//!
//! - `txid < xmin`: **Past** (resolved before the snapshot)
//! - `xmin <= txid < xmax`: **Present** (active iff listed in `in_progress`)
//! - `xmax <= txid`: **Future** (not yet assigned when the snapshot was taken)

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::{SnapshotField, SnapshotParseError};
use super::types::TxId;

/// Immutable transaction snapshot.
///
/// Fields are private so that every `Snapshot` satisfies
/// `xmin <= xmax` and `xmin <= id < xmax` for each in-progress id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    xmin: TxId,
    xmax: TxId,
    in_progress: BTreeSet<TxId>,
}

impl Snapshot {
    /// Builds a snapshot, checking the range invariants.
    pub fn new(
        xmin: TxId,
        xmax: TxId,
        in_progress: impl IntoIterator<Item = TxId>,
    ) -> Result<Self, SnapshotParseError> {
        if xmin > xmax {
            return Err(SnapshotParseError::InvalidRange { xmin, xmax });
        }
        let in_progress: BTreeSet<TxId> = in_progress.into_iter().collect();
        if let Some(&xid) = in_progress.iter().find(|&&xid| xid < xmin || xid >= xmax) {
            return Err(SnapshotParseError::InvalidMember { xid, xmin, xmax });
        }
        Ok(Self {
            xmin,
            xmax,
            in_progress,
        })
    }

    /// Parses the canonical `"<xmin>:<xmax>:<xid,xid,...>"` form.
    ///
    /// The in-progress list may be empty (`"100:105:"`) and may be wrapped
    /// in brackets (`"100:105:[]"`, `"100:105:[101,103]"`).
    pub fn parse(text: &str) -> Result<Self, SnapshotParseError> {
        let result = Self::parse_inner(text.trim());
        if let Err(err) = &result {
            tracing::debug!(input = text, error = %err, "rejected snapshot");
        }
        result
    }

    fn parse_inner(text: &str) -> Result<Self, SnapshotParseError> {
        let mut parts = text.splitn(3, ':');
        let xmin = parse_xid(parts.next(), SnapshotField::Xmin)?;
        let xmax = parse_xid(parts.next(), SnapshotField::Xmax)?;
        let list = parts.next().ok_or_else(|| SnapshotParseError::MalformedField {
            field: SnapshotField::InProgress,
            value: String::new(),
        })?;

        let list = list.trim();
        let list = list
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(list)
            .trim();

        let mut in_progress = Vec::new();
        if !list.is_empty() {
            for member in list.split(',') {
                in_progress.push(parse_xid(Some(member), SnapshotField::InProgress)?);
            }
        }

        Self::new(xmin, xmax, in_progress)
    }

    /// Lowest transaction id still active at snapshot time.
    pub fn xmin(&self) -> TxId {
        self.xmin
    }

    /// First transaction id not yet assigned at snapshot time.
    pub fn xmax(&self) -> TxId {
        self.xmax
    }

    /// In-progress transaction ids in ascending order.
    pub fn in_progress(&self) -> impl Iterator<Item = TxId> + '_ {
        self.in_progress.iter().copied()
    }

    /// Was `txid` concurrently active relative to this snapshot?
    ///
    /// True for every future id (`txid >= xmax`) and for every id listed as
    /// in progress. Ids below `xmin`, and unlisted ids in `[xmin, xmax)`,
    /// were resolved before the snapshot was taken.
    pub fn contains_active(&self, txid: TxId) -> bool {
        txid >= self.xmax || self.in_progress.contains(&txid)
    }
}

fn parse_xid(field_text: Option<&str>, field: SnapshotField) -> Result<TxId, SnapshotParseError> {
    let raw = field_text.unwrap_or("");
    let trimmed = raw.trim();
    // u64::from_str accepts a leading '+', which is not part of the format
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SnapshotParseError::MalformedField {
            field,
            value: raw.to_string(),
        });
    }
    trimmed
        .parse::<u64>()
        .map(TxId::new)
        .map_err(|_| SnapshotParseError::MalformedField {
            field,
            value: raw.to_string(),
        })
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:", self.xmin, self.xmax)?;
        for (i, xid) in self.in_progress.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", xid)?;
        }
        Ok(())
    }
}

impl FromStr for Snapshot {
    type Err = SnapshotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snapshot::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xids(ids: &[u64]) -> Vec<TxId> {
        ids.iter().copied().map(TxId::new).collect()
    }

    #[test]
    fn test_parse_canonical() {
        let snapshot = Snapshot::parse("100:105:101,103").unwrap();
        assert_eq!(snapshot.xmin(), TxId::new(100));
        assert_eq!(snapshot.xmax(), TxId::new(105));
        assert_eq!(snapshot.in_progress().collect::<Vec<_>>(), xids(&[101, 103]));
    }

    #[test]
    fn test_parse_empty_list_forms() {
        for text in ["100:105:", "100:105:[]", " 100:105:[ ] ", "100:105: "] {
            let snapshot = Snapshot::parse(text).unwrap();
            assert_eq!(snapshot.in_progress().count(), 0, "input {:?}", text);
        }
    }

    #[test]
    fn test_parse_bracketed_list() {
        let snapshot = Snapshot::parse("100:105:[103, 101]").unwrap();
        assert_eq!(snapshot.in_progress().collect::<Vec<_>>(), xids(&[101, 103]));
    }

    #[test]
    fn test_parse_malformed_fields() {
        for (text, field) in [
            ("abc:105:", SnapshotField::Xmin),
            ("-1:105:", SnapshotField::Xmin),
            ("+1:105:", SnapshotField::Xmin),
            ("100:x:", SnapshotField::Xmax),
            ("100", SnapshotField::Xmax),
            ("100:105", SnapshotField::InProgress),
            ("100:105:101,", SnapshotField::InProgress),
            ("100:105:101:102", SnapshotField::InProgress),
            ("", SnapshotField::Xmin),
        ] {
            match Snapshot::parse(text) {
                Err(SnapshotParseError::MalformedField { field: got, .. }) => {
                    assert_eq!(got, field, "input {:?}", text)
                }
                other => panic!("input {:?}: expected MalformedField, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_parse_invalid_range() {
        assert_eq!(
            Snapshot::parse("106:105:"),
            Err(SnapshotParseError::InvalidRange {
                xmin: TxId::new(106),
                xmax: TxId::new(105),
            })
        );
    }

    #[test]
    fn test_parse_invalid_member() {
        for member in [99, 105, 200] {
            let text = format!("100:105:{}", member);
            assert_eq!(
                Snapshot::parse(&text),
                Err(SnapshotParseError::InvalidMember {
                    xid: TxId::new(member),
                    xmin: TxId::new(100),
                    xmax: TxId::new(105),
                })
            );
        }
    }

    #[test]
    fn test_empty_range_snapshot() {
        // xmin == xmax is valid but admits no members
        let snapshot = Snapshot::parse("7:7:").unwrap();
        assert!(snapshot.contains_active(TxId::new(7)));
        assert!(!snapshot.contains_active(TxId::new(6)));
        assert!(Snapshot::parse("7:7:7").is_err());
    }

    #[test]
    fn test_contains_active() {
        let snapshot = Snapshot::parse("100:105:101,103").unwrap();
        for (txid, active) in [
            (1, false),   // past
            (99, false),  // past
            (100, false), // present, resolved
            (101, true),  // present, in progress
            (102, false), // present, resolved
            (103, true),  // present, in progress
            (104, false), // present, resolved
            (105, true),  // future
            (1000, true), // future
        ] {
            assert_eq!(snapshot.contains_active(TxId::new(txid)), active, "txid {}", txid);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        let snapshot = Snapshot::new(TxId::new(100), TxId::new(105), xids(&[103, 101])).unwrap();
        assert_eq!(snapshot.to_string(), "100:105:101,103");
        assert_eq!(snapshot.to_string().parse::<Snapshot>().unwrap(), snapshot);

        let empty = Snapshot::new(TxId::new(3), TxId::new(3), Vec::new()).unwrap();
        assert_eq!(empty.to_string(), "3:3:");
        assert_eq!(Snapshot::parse(&empty.to_string()).unwrap(), empty);
    }
}
