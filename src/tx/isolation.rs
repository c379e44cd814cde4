//! Isolation levels and the anomalies each one permits.

use std::fmt;

use crate::table::TextTable;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub const ALL: [IsolationLevel; 3] = [
        IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable,
    ];

    /// Whether this level permits `anomaly` (PostgreSQL semantics).
    ///
    /// READ UNCOMMITTED is not listed: PostgreSQL runs it as READ COMMITTED,
    /// so dirty reads never occur.
    pub fn permits(&self, anomaly: Anomaly) -> bool {
        match (self, anomaly) {
            (_, Anomaly::DirtyRead) => false,
            (IsolationLevel::ReadCommitted, _) => true,
            (IsolationLevel::RepeatableRead, Anomaly::Other) => true,
            (IsolationLevel::RepeatableRead, _) => false,
            (IsolationLevel::Serializable, _) => false,
        }
    }

    /// Whether each statement takes a fresh snapshot (as opposed to one
    /// snapshot for the whole transaction).
    pub fn snapshot_per_statement(&self) -> bool {
        matches!(self, IsolationLevel::ReadCommitted)
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IsolationLevel::ReadCommitted => "Read Committed",
            IsolationLevel::RepeatableRead => "Repeatable Read",
            IsolationLevel::Serializable => "Serializable",
        };
        f.write_str(s)
    }
}

/// Concurrency anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    LostUpdate,
    DirtyRead,
    NonRepeatableRead,
    PhantomRead,
    /// Serialization anomalies such as write skew.
    Other,
}

impl Anomaly {
    pub const ALL: [Anomaly; 5] = [
        Anomaly::LostUpdate,
        Anomaly::DirtyRead,
        Anomaly::NonRepeatableRead,
        Anomaly::PhantomRead,
        Anomaly::Other,
    ];
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Anomaly::LostUpdate => "lost updates",
            Anomaly::DirtyRead => "dirty read",
            Anomaly::NonRepeatableRead => "non-repeatable reads",
            Anomaly::PhantomRead => "phantom reads",
            Anomaly::Other => "other anomalies",
        };
        f.write_str(s)
    }
}

/// Renders the level/anomaly matrix (`y` = permitted, `-` = prevented).
pub fn render_anomaly_table() -> String {
    let anomalies: Vec<String> = Anomaly::ALL.iter().map(|a| a.to_string()).collect();
    let mut headers = vec!["level"];
    headers.extend(anomalies.iter().map(String::as_str));

    let mut table = TextTable::new(&headers);
    for level in IsolationLevel::ALL {
        let mut row = vec![level.to_string()];
        for anomaly in Anomaly::ALL {
            let mark = if level.permits(anomaly) { "y" } else { "-" };
            row.push(mark.to_string());
        }
        table.push_row(row);
    }
    table.render()
}
