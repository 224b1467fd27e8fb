//! Mergeable per-worker statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tpcc_types::TransactionType;

/// Count and accumulated latency (seconds) for one transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnStats {
    pub count: u64,
    pub total_time: f64,
}

impl TxnStats {
    pub fn record(&mut self, elapsed: f64) {
        self.count += 1;
        self.total_time += elapsed;
    }

    fn add(&mut self, other: &TxnStats) {
        self.count += other.count;
        self.total_time += other.total_time;
    }
}

/// One finished attempt, kept only when detailed timing is enabled.
///
/// Times are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    #[serde(rename = "txn_name")]
    pub txn: TransactionType,
    pub start_time: f64,
    pub end_time: f64,
    pub success: bool,
}

impl TransactionOutcome {
    fn total_cmp(&self, other: &Self) -> Ordering {
        self.start_time
            .total_cmp(&other.start_time)
            .then(self.end_time.total_cmp(&other.end_time))
            .then(self.txn.cmp(&other.txn))
            .then(self.success.cmp(&other.success))
    }
}

/// Statistics gathered by one worker, or the merge of several.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    pub committed: BTreeMap<TransactionType, TxnStats>,
    pub aborted: BTreeMap<TransactionType, TxnStats>,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<TransactionOutcome>>,
    /// Attempts cut short by an interrupt.
    pub interrupted: u64,
    /// Districts a Delivery found without undelivered orders.
    pub delivery_skipped: u64,
    /// NewOrder invocations that rolled back on an unused item.
    pub new_order_rollbacks: u64,
}

impl ResultsSnapshot {
    /// Combine two snapshots.
    ///
    /// Counts and times are summed per type, the window spans both inputs and
    /// detail lists are concatenated in start-time order.
    pub fn merge(mut self, other: &ResultsSnapshot) -> ResultsSnapshot {
        for (txn, stats) in &other.committed {
            self.committed.entry(*txn).or_default().add(stats);
        }
        for (txn, stats) in &other.aborted {
            self.aborted.entry(*txn).or_default().add(stats);
        }

        self.window_start = match (self.window_start, other.window_start) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.window_end = match (self.window_end, other.window_end) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        if let Some(theirs) = &other.details {
            let details = self.details.get_or_insert_with(Vec::new);
            details.extend(theirs.iter().cloned());
            details.sort_by(TransactionOutcome::total_cmp);
        }

        self.interrupted += other.interrupted;
        self.delivery_skipped += other.delivery_skipped;
        self.new_order_rollbacks += other.new_order_rollbacks;
        self
    }

    /// Reduce any number of snapshots. The empty reduction is the default
    /// snapshot.
    pub fn merge_all<'a>(snapshots: impl IntoIterator<Item = &'a ResultsSnapshot>) -> Self {
        snapshots
            .into_iter()
            .fold(ResultsSnapshot::default(), |acc, s| acc.merge(s))
    }

    pub fn committed_total(&self) -> TxnStats {
        total(&self.committed)
    }

    pub fn aborted_total(&self) -> TxnStats {
        total(&self.aborted)
    }

    /// Wall-clock length of the measurement window in seconds.
    ///
    /// A window that has not been closed is measured up to now.
    pub fn duration_secs(&self) -> f64 {
        match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => seconds_between(start, end),
            (Some(start), None) => seconds_between(start, Utc::now()),
            _ => 0.0,
        }
    }
}

fn total(stats: &BTreeMap<TransactionType, TxnStats>) -> TxnStats {
    let mut sum = TxnStats::default();
    for s in stats.values() {
        sum.add(s);
    }
    sum
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start)
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}
