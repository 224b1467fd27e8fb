//! TPC-C workload driver.
//!
//! Drives the TPC-C transaction mix against a partitioned SQLite backend,
//! either in process or through a proxy server, and reports per-transaction
//! throughput and latency.
//!
//! # Crates
//!
//! - `tpcc_types` - scale parameters, transaction parameters and results
//! - `tpcc_generator` - random distributions, parameter synthesis, transaction mix
//! - `tpcc_backend` - backend contract and the partition-aware profiles
//! - `tpcc_sqlite` - local SQLite sessions
//! - `tpcc_sqlite_proxy` - remote SQLite protocol, client and server
//! - `tpcc_results` - statistics, merging and reports
//! - `tpcc_executor` - the per-worker execution loop
//!
//! # CLI Usage
//!
//! ```bash
//! # Four warehouses, eight clients, five minutes
//! tpcc-driver execute sqlite --config tpcc.toml --warehouses 4 --clients 8 --duration 5m
//!
//! # Serve SQLite to remote drivers
//! tpcc-driver serve --listen 0.0.0.0:5478
//! tpcc-driver execute sqliteproxy --config tpcc.toml
//! ```

pub mod benchmark;
pub mod config;

pub use benchmark::{run_benchmark, BenchmarkOptions, BenchmarkReport, WorkerFailure};
pub use config::{DriverConfig, SystemKind};
