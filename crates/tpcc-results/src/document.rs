//! The results document written at the end of a run.

use crate::error::ResultsError;
use crate::snapshot::{ResultsSnapshot, TransactionOutcome, TxnStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tpcc_types::TransactionType;
use tracing::info;

/// Per-type row of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxnRow {
    pub txn: TransactionType,
    pub ct: u64,
    pub time: f64,
}

/// Totals row of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TotalRow {
    pub ct: u64,
    pub time: f64,
    pub duration: f64,
}

/// Serializable summary of a (merged) snapshot.
///
/// Rows are sorted by transaction name and only list types that occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_time: Option<f64>,
    pub txns: Vec<TxnRow>,
    pub txns_aborted: Vec<TxnRow>,
    pub txns_total: TotalRow,
    pub txns_aborted_total: TotalRow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txns_detail: Option<Vec<TransactionOutcome>>,
    pub delivery_skipped: u64,
    pub new_order_rollbacks: u64,
    pub interrupted: u64,
}

impl ResultsDocument {
    pub fn from_snapshot(snapshot: &ResultsSnapshot, load_time: Option<f64>) -> Self {
        let duration = snapshot.duration_secs();
        let committed = snapshot.committed_total();
        let aborted = snapshot.aborted_total();
        Self {
            load_time,
            txns: rows(&snapshot.committed),
            txns_aborted: rows(&snapshot.aborted),
            txns_total: TotalRow {
                ct: committed.count,
                time: committed.total_time,
                duration,
            },
            txns_aborted_total: TotalRow {
                ct: aborted.count,
                time: aborted.total_time,
                duration,
            },
            txns_detail: snapshot.details.clone(),
            delivery_skipped: snapshot.delivery_skipped,
            new_order_rollbacks: snapshot.new_order_rollbacks,
            interrupted: snapshot.interrupted,
        }
    }
}

fn rows(stats: &BTreeMap<TransactionType, TxnStats>) -> Vec<TxnRow> {
    stats
        .iter()
        .map(|(txn, s)| TxnRow {
            txn: *txn,
            ct: s.count,
            time: s.total_time,
        })
        .collect()
}

/// Append the document to `path` as a single JSON line.
pub fn append_json_line(path: &Path, document: &ResultsDocument) -> Result<(), ResultsError> {
    let mut line = serde_json::to_string(document)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    info!("Results appended to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> ResultsSnapshot {
        let mut snapshot = ResultsSnapshot::default();
        snapshot.committed.insert(
            TransactionType::Payment,
            TxnStats {
                count: 4,
                total_time: 1.0,
            },
        );
        snapshot.committed.insert(
            TransactionType::Delivery,
            TxnStats {
                count: 2,
                total_time: 0.5,
            },
        );
        snapshot.aborted.insert(
            TransactionType::NewOrder,
            TxnStats {
                count: 1,
                total_time: 0.25,
            },
        );
        snapshot.window_start = Utc.timestamp_opt(100, 0).single();
        snapshot.window_end = Utc.timestamp_opt(110, 0).single();
        snapshot.delivery_skipped = 2;
        snapshot
    }

    #[test]
    fn test_totals_match_rows() {
        let document = ResultsDocument::from_snapshot(&sample(), None);
        let names: Vec<_> = document.txns.iter().map(|r| r.txn).collect();
        assert_eq!(
            names,
            vec![TransactionType::Delivery, TransactionType::Payment]
        );
        assert_eq!(
            document.txns_total.ct,
            document.txns.iter().map(|r| r.ct).sum::<u64>()
        );
        assert_eq!(document.txns_total.time, 1.5);
        assert_eq!(document.txns_total.duration, 10.0);
        assert_eq!(document.txns_aborted_total.ct, 1);
    }

    #[test]
    fn test_json_keys() {
        let document = ResultsDocument::from_snapshot(&sample(), Some(3.0));
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["LoadTime"], 3.0);
        assert_eq!(value["Txns"][0]["Txn"], "DELIVERY");
        assert_eq!(value["Txns"][0]["Ct"], 2);
        assert_eq!(value["TxnsAborted"][0]["Txn"], "NEW_ORDER");
        assert_eq!(value["TxnsTotal"]["Duration"], 10.0);
        assert_eq!(value["DeliverySkipped"], 2);
        assert!(value.get("TxnsDetail").is_none());
    }

    #[test]
    fn test_append_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let document = ResultsDocument::from_snapshot(&sample(), None);
        append_json_line(&path, &document).unwrap();
        append_json_line(&path, &document).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ResultsDocument = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, document);
    }
}
