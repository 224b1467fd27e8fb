//! Worker fan-out and the merge barrier.

use crate::config::{DriverConfig, SystemKind};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::task::JoinSet;
use tpcc_backend::Backend;
use tpcc_executor::{Executor, ExecutorConfig, IoctlFence, RunOutcome};
use tpcc_generator::{NuRandConstants, ParameterGenerator, RandomSource, TransactionMix};
use tpcc_results::ResultsSnapshot;
use tpcc_types::ScaleParameters;
use tracing::{error, info, warn};

/// Everything a benchmark run needs.
#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    pub system: SystemKind,
    pub config: DriverConfig,
    pub scale: ScaleParameters,
    pub mix: TransactionMix,
    pub executor: ExecutorConfig,
    pub clients: usize,
    /// Worker `i` is seeded with `seed + i`.
    pub seed: Option<u64>,
    pub fence_control: Option<PathBuf>,
}

/// A worker that stopped with an error.
#[derive(Debug, Clone)]
pub struct WorkerFailure {
    pub worker: usize,
    pub error: String,
}

/// Merged outcome of all workers.
#[derive(Debug)]
pub struct BenchmarkReport {
    pub snapshot: ResultsSnapshot,
    pub completed: usize,
    pub interrupted: usize,
    pub failures: Vec<WorkerFailure>,
}

impl BenchmarkReport {
    pub fn was_interrupted(&self) -> bool {
        self.interrupted > 0
    }
}

/// NURand constants shared by all workers of one run.
pub fn nurand_constants(seed: Option<u64>) -> NuRandConstants {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let load = NuRandConstants::for_load(&mut rng);
    NuRandConstants::for_run(&load, &mut rng)
}

/// Run `options.clients` workers to completion and merge their results.
///
/// Workers only share read-only inputs and `interrupt`.
pub async fn run_benchmark(
    options: BenchmarkOptions,
    interrupt: Arc<AtomicBool>,
) -> anyhow::Result<BenchmarkReport> {
    if options.clients == 0 {
        anyhow::bail!("At least one client is required");
    }
    let nurand = nurand_constants(options.seed);
    info!(
        "Starting {} client(s) against {} ({})",
        options.clients, options.system, options.scale
    );

    let options = Arc::new(options);
    let mut workers = JoinSet::new();
    for worker in 0..options.clients {
        let options = Arc::clone(&options);
        let interrupt = Arc::clone(&interrupt);
        workers.spawn_blocking(move || {
            let outcome = run_worker(worker, &options, nurand, interrupt);
            (worker, outcome)
        });
    }

    let mut snapshots = Vec::with_capacity(options.clients);
    let mut report = BenchmarkReport {
        snapshot: ResultsSnapshot::default(),
        completed: 0,
        interrupted: 0,
        failures: Vec::new(),
    };
    while let Some(joined) = workers.join_next().await {
        let (worker, outcome) = joined.context("Worker task panicked")?;
        match outcome {
            Ok(RunOutcome::Completed(snapshot)) => {
                report.completed += 1;
                snapshots.push(snapshot);
            }
            Ok(RunOutcome::Interrupted(snapshot)) => {
                report.interrupted += 1;
                snapshots.push(snapshot);
            }
            Ok(RunOutcome::Failed { snapshot, error }) => {
                error!("Worker {worker} failed: {error}");
                report.failures.push(WorkerFailure {
                    worker,
                    error: error.to_string(),
                });
                snapshots.push(snapshot);
            }
            Err(e) => {
                error!("Worker {worker} could not start: {e:#}");
                report.failures.push(WorkerFailure {
                    worker,
                    error: format!("{e:#}"),
                });
            }
        }
    }

    report.snapshot = ResultsSnapshot::merge_all(&snapshots);
    report.failures.sort_by_key(|f| f.worker);
    info!(
        "{} worker(s) completed, {} interrupted, {} failed",
        report.completed,
        report.interrupted,
        report.failures.len()
    );
    Ok(report)
}

fn run_worker(
    worker: usize,
    options: &BenchmarkOptions,
    nurand: NuRandConstants,
    interrupt: Arc<AtomicBool>,
) -> anyhow::Result<RunOutcome> {
    let districts = options.scale.districts_per_warehouse;
    match options.system {
        SystemKind::Sqlite => {
            let backend = tpcc_sqlite::connect(&options.config.sqlite, districts)
                .with_context(|| format!("Worker {worker}: failed to open SQLite session"))?;
            drive(worker, backend, options, nurand, interrupt)
        }
        SystemKind::SqliteProxy => {
            let proxy = &options.config.sqliteproxy;
            let backend = tpcc_sqlite_proxy::connect(proxy, districts).with_context(|| {
                format!(
                    "Worker {worker}: failed to connect to proxy at {}:{}",
                    proxy.host, proxy.port
                )
            })?;
            drive(worker, backend, options, nurand, interrupt)
        }
    }
}

fn drive<B: Backend>(
    worker: usize,
    backend: B,
    options: &BenchmarkOptions,
    nurand: NuRandConstants,
    interrupt: Arc<AtomicBool>,
) -> anyhow::Result<RunOutcome> {
    let random = match options.seed {
        Some(seed) => RandomSource::from_seed(seed.wrapping_add(worker as u64), nurand),
        None => RandomSource::from_entropy(nurand),
    };
    let generator = ParameterGenerator::new(options.scale, random);
    let mut executor = Executor::new(
        backend,
        generator,
        options.mix.clone(),
        options.executor.clone(),
    )
    .with_interrupt(interrupt);

    if let Some(path) = &options.fence_control {
        let fence = IoctlFence::open(path)
            .with_context(|| format!("Worker {worker}: failed to open fence"))?;
        executor = executor.with_fence(Box::new(fence));
    }

    let outcome = executor.run();
    if let RunOutcome::Interrupted(_) = &outcome {
        warn!("Worker {worker} interrupted");
    }
    Ok(outcome)
}
