//! Per-worker statistics recorder.

use crate::error::ResultsError;
use crate::snapshot::{ResultsSnapshot, TransactionOutcome};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tpcc_types::TransactionType;
use tracing::debug;

/// Timing handle for one in-flight transaction attempt.
///
/// Consumed by exactly one of [`Results::commit`], [`Results::abort`] or
/// [`Results::interrupt`].
#[derive(Debug)]
#[must_use = "a running transaction must be committed, aborted or interrupted"]
pub struct RunningTransaction {
    txn: TransactionType,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl RunningTransaction {
    pub fn transaction_type(&self) -> TransactionType {
        self.txn
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Collects committed and aborted counts and latencies for one worker.
#[derive(Debug, Default)]
pub struct Results {
    snapshot: ResultsSnapshot,
    record_detail: bool,
}

impl Results {
    pub fn new(record_detail: bool) -> Self {
        Self {
            snapshot: ResultsSnapshot {
                details: record_detail.then(Vec::new),
                ..ResultsSnapshot::default()
            },
            record_detail,
        }
    }

    /// Open the measurement window.
    pub fn start_benchmark(&mut self) -> Result<DateTime<Utc>, ResultsError> {
        if self.snapshot.window_start.is_some() {
            return Err(ResultsError::AlreadyStarted);
        }
        debug!("Starting benchmark statistics collection");
        let now = Utc::now();
        self.snapshot.window_start = Some(now);
        Ok(now)
    }

    /// Close the measurement window.
    pub fn stop_benchmark(&mut self) -> Result<(), ResultsError> {
        if self.snapshot.window_start.is_none() {
            return Err(ResultsError::NotStarted);
        }
        if self.snapshot.window_end.is_some() {
            return Err(ResultsError::AlreadyStopped);
        }
        debug!("Stopping benchmark statistics collection");
        self.snapshot.window_end = Some(Utc::now());
        Ok(())
    }

    pub fn start_transaction(&self, txn: TransactionType) -> RunningTransaction {
        RunningTransaction {
            txn,
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record a successful attempt.
    pub fn commit(&mut self, running: RunningTransaction) {
        let elapsed = running.elapsed_secs();
        self.snapshot
            .committed
            .entry(running.txn)
            .or_default()
            .record(elapsed);
        self.push_detail(&running, elapsed, true);
    }

    /// Record an attempt that exhausted its retries.
    pub fn abort(&mut self, running: RunningTransaction) {
        let elapsed = running.elapsed_secs();
        self.snapshot
            .aborted
            .entry(running.txn)
            .or_default()
            .record(elapsed);
        self.push_detail(&running, elapsed, false);
    }

    /// Discard an attempt cut short by an interrupt.
    pub fn interrupt(&mut self, running: RunningTransaction) {
        debug!("Discarding interrupted {} attempt", running.txn);
        self.snapshot.interrupted += 1;
    }

    pub fn record_delivery_skipped(&mut self, districts: usize) {
        self.snapshot.delivery_skipped += districts as u64;
    }

    pub fn record_new_order_rollback(&mut self) {
        self.snapshot.new_order_rollbacks += 1;
    }

    pub fn snapshot(&self) -> &ResultsSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> ResultsSnapshot {
        self.snapshot
    }

    fn push_detail(&mut self, running: &RunningTransaction, elapsed: f64, success: bool) {
        if !self.record_detail {
            return;
        }
        let start_time = epoch_secs(running.started_at);
        if let Some(details) = self.snapshot.details.as_mut() {
            details.push(TransactionOutcome {
                txn: running.txn,
                start_time,
                end_time: start_time + elapsed,
                success,
            });
        }
    }
}

fn epoch_secs(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_lifecycle() {
        let mut results = Results::new(false);
        assert!(matches!(
            results.stop_benchmark(),
            Err(ResultsError::NotStarted)
        ));
        results.start_benchmark().unwrap();
        assert!(matches!(
            results.start_benchmark(),
            Err(ResultsError::AlreadyStarted)
        ));
        results.stop_benchmark().unwrap();
        assert!(matches!(
            results.stop_benchmark(),
            Err(ResultsError::AlreadyStopped)
        ));
        assert!(results.snapshot().duration_secs() >= 0.0);
    }

    #[test]
    fn test_outcomes_land_in_one_bucket() {
        let mut results = Results::new(false);
        let first = results.start_transaction(TransactionType::Payment);
        results.commit(first);
        let second = results.start_transaction(TransactionType::Payment);
        results.abort(second);
        let third = results.start_transaction(TransactionType::NewOrder);
        results.interrupt(third);

        let snapshot = results.into_snapshot();
        assert_eq!(snapshot.committed[&TransactionType::Payment].count, 1);
        assert_eq!(snapshot.aborted[&TransactionType::Payment].count, 1);
        assert!(!snapshot.committed.contains_key(&TransactionType::NewOrder));
        assert_eq!(snapshot.interrupted, 1);
        assert_eq!(snapshot.details, None);
    }

    #[test]
    fn test_detail_trace() {
        let mut results = Results::new(true);
        let running = results.start_transaction(TransactionType::StockLevel);
        results.commit(running);
        let running = results.start_transaction(TransactionType::Delivery);
        results.abort(running);

        let details = results.snapshot().details.clone().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].txn, TransactionType::StockLevel);
        assert!(details[0].success);
        assert!(!details[1].success);
        assert!(details[0].end_time >= details[0].start_time);
    }

    #[test]
    fn test_supplementary_counters() {
        let mut results = Results::new(false);
        results.record_delivery_skipped(3);
        results.record_delivery_skipped(0);
        results.record_new_order_rollback();
        assert_eq!(results.snapshot().delivery_skipped, 3);
        assert_eq!(results.snapshot().new_order_rollbacks, 1);
    }
}
