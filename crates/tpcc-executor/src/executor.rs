//! The per-worker execution loop.

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::fence::Fence;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tpcc_backend::Backend;
use tpcc_generator::{ParameterGenerator, TransactionMix};
use tpcc_results::{Results, ResultsSnapshot};
use tpcc_types::{TransactionParams, TransactionResult};
use tracing::{debug, error, info, warn};

/// How a worker's run ended. Every variant carries the statistics gathered
/// up to that point.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(ResultsSnapshot),
    Interrupted(ResultsSnapshot),
    Failed {
        snapshot: ResultsSnapshot,
        error: ExecutorError,
    },
}

impl RunOutcome {
    pub fn snapshot(&self) -> &ResultsSnapshot {
        match self {
            RunOutcome::Completed(s) | RunOutcome::Interrupted(s) => s,
            RunOutcome::Failed { snapshot, .. } => snapshot,
        }
    }

    pub fn into_snapshot(self) -> ResultsSnapshot {
        match self {
            RunOutcome::Completed(s) | RunOutcome::Interrupted(s) => s,
            RunOutcome::Failed { snapshot, .. } => snapshot,
        }
    }
}

/// Result of one transaction after retries.
enum Attempts {
    Committed(TransactionResult),
    Aborted(ExecutorError),
    Fatal(ExecutorError),
    Interrupted,
}

pub struct Executor<B: Backend> {
    backend: B,
    generator: ParameterGenerator,
    mix: TransactionMix,
    config: ExecutorConfig,
    fence: Option<Box<dyn Fence + Send>>,
    interrupt: Arc<AtomicBool>,
}

impl<B: Backend> Executor<B> {
    pub fn new(
        backend: B,
        generator: ParameterGenerator,
        mix: TransactionMix,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            backend,
            generator,
            mix,
            config,
            fence: None,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wrap every attempt in `fence`.
    pub fn with_fence(mut self, fence: Box<dyn Fence + Send>) -> Self {
        self.fence = Some(fence);
        self
    }

    /// Observe `flag`; once set, the run ends after the current attempt.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    pub fn backend(&mut self) -> &mut B {
        &mut self.backend
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Run transactions until the configured duration elapses.
    pub fn run(&mut self) -> RunOutcome {
        let mut results = Results::new(self.config.record_detail);
        if let Err(e) = results.start_benchmark() {
            return RunOutcome::Failed {
                snapshot: results.into_snapshot(),
                error: e.into(),
            };
        }
        let started = Instant::now();
        // None when the duration runs past what Instant can represent
        let deadline = started.checked_add(self.config.duration);
        info!("Executing benchmark for {:?}", self.config.duration);

        while !past(deadline) {
            thread::sleep(self.config.think_time);
            if self.interrupted() {
                info!("Interrupted after {:?}", started.elapsed());
                return RunOutcome::Interrupted(finish(results));
            }

            let txn = self.mix.pick(self.generator.random().rng());
            let params = self.generator.generate(txn);
            debug!("Executing '{txn}' transaction");
            let running = results.start_transaction(txn);

            match self.attempt(&params, deadline) {
                Attempts::Committed(result) => {
                    match &result {
                        TransactionResult::NewOrder(None) => results.record_new_order_rollback(),
                        TransactionResult::Delivery(delivery) => {
                            results.record_delivery_skipped(delivery.skipped.len())
                        }
                        _ => {}
                    }
                    results.commit(running);
                }
                Attempts::Aborted(error) => {
                    warn!("Failed to execute transaction '{txn}': {error}");
                    results.abort(running);
                    if self.config.stop_on_error {
                        return RunOutcome::Failed {
                            snapshot: finish(results),
                            error,
                        };
                    }
                }
                Attempts::Fatal(error) => {
                    error!("Fatal error in transaction '{txn}': {error}");
                    results.abort(running);
                    return RunOutcome::Failed {
                        snapshot: finish(results),
                        error,
                    };
                }
                Attempts::Interrupted => {
                    results.interrupt(running);
                    info!("Interrupted after {:?}", started.elapsed());
                    return RunOutcome::Interrupted(finish(results));
                }
            }
        }

        info!("Benchmark finished after {:?}", started.elapsed());
        RunOutcome::Completed(finish(results))
    }

    /// Run one transaction under the retry policy.
    fn attempt(&mut self, params: &TransactionParams, deadline: Option<Instant>) -> Attempts {
        let txn = params.transaction_type();
        let retry = self.config.retry;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match self.attempt_once(params) {
                Ok(result) => return Attempts::Committed(result),
                Err(e) if e.is_fatal() => return Attempts::Fatal(e),
                Err(e) => e,
            };
            let retryable = error.is_retryable();
            debug!(
                "Attempt {attempts}/{} of '{txn}' failed: {error}",
                retry.max_attempts
            );

            let exhausted = ExecutorError::Aborted {
                txn,
                attempts,
                source: Box::new(error),
            };
            if !retryable || attempts >= retry.max_attempts {
                return Attempts::Aborted(exhausted);
            }
            if self.interrupted() {
                return Attempts::Interrupted;
            }
            thread::sleep(retry.backoff(attempts));
            if past(deadline) {
                return Attempts::Aborted(exhausted);
            }
        }
    }

    /// One attempt, inside the fence when there is one. A failed attempt
    /// leaves the fence aborted, and the backend too unless it had already
    /// committed when the fence commit failed.
    fn attempt_once(&mut self, params: &TransactionParams) -> Result<TransactionResult, ExecutorError> {
        if let Some(fence) = self.fence.as_mut() {
            fence.begin()?;
        }

        match self.backend.execute(params) {
            Ok(result) => {
                if let Some(fence) = self.fence.as_mut() {
                    if let Err(commit_err) = fence.commit() {
                        if let Err(abort_err) = fence.abort() {
                            warn!("Fence abort failed: {abort_err}");
                        }
                        return Err(ExecutorError::FenceCommit(commit_err));
                    }
                }
                Ok(result)
            }
            Err(e) => {
                if let Err(abort_err) = self.backend.abort() {
                    warn!("Backend abort failed: {abort_err}");
                }
                if let Some(fence) = self.fence.as_mut() {
                    if let Err(abort_err) = fence.abort() {
                        warn!("Fence abort failed: {abort_err}");
                    }
                }
                Err(e.into())
            }
        }
    }
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() > deadline)
}

fn finish(mut results: Results) -> ResultsSnapshot {
    if let Err(e) = results.stop_benchmark() {
        warn!("Failed to close the measurement window: {e}");
    }
    results.into_snapshot()
}
