//! Command-line interface for tpcc-driver
//!
//! # Usage Examples
//!
//! ## Execute
//! ```bash
//! # One minute against local partition files
//! tpcc-driver execute sqlite --warehouses 4 --clients 4
//!
//! # Read-heavy mix, results appended as JSON
//! tpcc-driver execute sqlite --frac-read 0.9 --duration 5m --json-output results.jsonl
//! ```
//!
//! ## Proxy
//! ```bash
//! tpcc-driver serve --listen 0.0.0.0:5478 --database :memory:
//! tpcc-driver execute sqliteproxy --config tpcc.toml
//! ```
//!
//! ## Configuration
//! ```bash
//! tpcc-driver print-config sqlite > tpcc.toml
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tpcc_driver::config::duration::parse_duration;
use tpcc_driver::{run_benchmark, BenchmarkOptions, DriverConfig, SystemKind};
use tpcc_executor::{ExecutorConfig, RetryPolicy};
use tpcc_results::{append_json_line, format_table, ResultsDocument};
use tpcc_sqlite::SqliteConfig;
use tpcc_sqlite_proxy::server::MEMORY_DATABASE;
use tpcc_sqlite_proxy::ProxyServer;
use tpcc_types::ScaleParameters;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tpcc-driver")]
#[command(about = "A TPC-C workload driver for partitioned SQLite backends")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug log messages
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the transaction mix and report throughput
    Execute(ExecuteArgs),

    /// Serve SQLite sessions to sqliteproxy drivers
    Serve(ServeArgs),

    /// Print the default configuration for a backend and exit
    PrintConfig {
        #[arg(value_enum)]
        system: SystemKind,
    },
}

#[derive(Args)]
struct ExecuteArgs {
    /// Target backend
    #[arg(value_enum)]
    system: SystemKind,

    /// Path to the TOML configuration file
    #[arg(long, env = "TPCC_CONFIG")]
    config: Option<PathBuf>,

    /// Number of warehouses
    #[arg(long, default_value_t = 4)]
    warehouses: i64,

    /// Benchmark scale factor
    #[arg(long, default_value_t = 1.0)]
    scalefactor: f64,

    /// How long to run (e.g. "300", "300s", "5m", "1h")
    #[arg(long, default_value = "60", value_parser = parse_duration)]
    duration: Duration,

    /// Number of concurrent clients
    #[arg(long, default_value_t = 1)]
    clients: usize,

    /// Fraction of read-only transactions, replaces the configured mix
    #[arg(long)]
    frac_read: Option<f64>,

    /// Stop a client at the first transaction that exhausts its retries
    #[arg(long)]
    stop_on_error: bool,

    /// Record start and end time of every transaction
    #[arg(long)]
    timing_details: bool,

    /// Append the results document to this file as one JSON line
    #[arg(long)]
    json_output: Option<PathBuf>,

    /// Control file of a transactional filesystem; wraps each attempt in its transaction
    #[arg(long)]
    cffs_mount: Option<PathBuf>,

    /// Seed for reproducible parameter streams
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between transactions in milliseconds
    #[arg(long, default_value_t = 10)]
    think_time_ms: u64,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5478")]
    listen: String,

    /// Main database opened for every session
    #[arg(long, default_value = MEMORY_DATABASE)]
    database: String,

    /// Configuration file whose [sqlite] table sets the session pragmas
    #[arg(long, env = "TPCC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Execute(args) => execute(args).await,
        Commands::Serve(args) => serve(args).await,
        Commands::PrintConfig { system } => {
            println!("{}", DriverConfig::default_table(system));
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DriverConfig> {
    match path {
        Some(path) => DriverConfig::load(path),
        None => Ok(DriverConfig::default()),
    }
}

async fn execute(args: ExecuteArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let scale = ScaleParameters::with_scale_factor(args.warehouses, args.scalefactor)
        .context("Invalid scale parameters")?;
    let mix = config.mix(args.frac_read)?;

    let options = BenchmarkOptions {
        system: args.system,
        config,
        scale,
        mix,
        executor: ExecutorConfig {
            duration: args.duration,
            think_time: Duration::from_millis(args.think_time_ms),
            stop_on_error: args.stop_on_error,
            record_detail: args.timing_details,
            retry: RetryPolicy::default(),
        },
        clients: args.clients,
        seed: args.seed,
        fence_control: args.cffs_mount,
    };

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal (Ctrl+C), stopping clients");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let report = run_benchmark(options, interrupt).await?;
    let document = ResultsDocument::from_snapshot(&report.snapshot, None);

    if let Some(path) = &args.json_output {
        append_json_line(path, &document)
            .with_context(|| format!("Failed to write results to {path:?}"))?;
    }
    println!("{}", format_table(&document));

    if report.was_interrupted() {
        warn!("Run was interrupted; results cover the completed part only");
    }
    if !report.failures.is_empty() {
        for failure in &report.failures {
            eprintln!("  worker {}: {}", failure.worker, failure.error);
        }
        anyhow::bail!("{} client(s) failed", report.failures.len());
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let sqlite = match &args.config {
        Some(path) => DriverConfig::load(path)?.sqlite,
        None => SqliteConfig::default(),
    };
    let server = ProxyServer::bind(&args.listen, args.database, sqlite)
        .with_context(|| format!("Failed to start proxy server on {}", args.listen))?;

    tokio::task::spawn_blocking(move || server.serve())
        .await
        .context("Proxy server task panicked")?
}
