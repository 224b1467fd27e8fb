//! End-to-end runs of the workload driver against a small loaded dataset.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tpcc_driver::{run_benchmark, BenchmarkOptions, DriverConfig, SystemKind};
use tpcc_executor::ExecutorConfig;
use tpcc_generator::TransactionMix;
use tpcc_results::ResultsDocument;
use tpcc_sqlite::{fixture, SqliteConfig};
use tpcc_sqlite_proxy::server::MEMORY_DATABASE;
use tpcc_sqlite_proxy::{ProxyConfig, ProxyServer};
use tpcc_types::ScaleParameters;

fn options(system: SystemKind, config: DriverConfig, scale: ScaleParameters) -> BenchmarkOptions {
    BenchmarkOptions {
        system,
        config,
        scale,
        mix: TransactionMix::default(),
        executor: ExecutorConfig {
            duration: Duration::from_millis(500),
            ..ExecutorConfig::default()
        },
        clients: 2,
        seed: Some(42),
        fence_control: None,
    }
}

fn assert_totals(document: &ResultsDocument) {
    assert!(document.txns_total.ct > 0);
    assert_eq!(
        document.txns_total.ct,
        document.txns.iter().map(|r| r.ct).sum::<u64>()
    );
    assert_eq!(
        document.txns_aborted_total.ct,
        document.txns_aborted.iter().map(|r| r.ct).sum::<u64>()
    );
    assert!(document.txns_total.duration > 0.0);
}

#[tokio::test]
async fn test_local_sqlite_run() {
    let dir = tempfile::tempdir().unwrap();
    let scale = ScaleParameters::with_scale_factor(1, 100.0).unwrap();
    let template = fixture::create_partitions(dir.path(), &scale).unwrap();
    let config = DriverConfig {
        sqlite: SqliteConfig::with_database(template),
        ..DriverConfig::default()
    };

    let report = run_benchmark(
        options(SystemKind::Sqlite, config, scale),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.completed, 2);
    assert_totals(&ResultsDocument::from_snapshot(&report.snapshot, None));
}

#[tokio::test]
async fn test_proxy_run() {
    let dir = tempfile::tempdir().unwrap();
    let scale = ScaleParameters::with_scale_factor(2, 100.0).unwrap();
    let template = fixture::create_partitions(dir.path(), &scale).unwrap();

    let server =
        ProxyServer::bind("127.0.0.1:0", MEMORY_DATABASE, SqliteConfig::default()).unwrap();
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.serve());

    let config = DriverConfig {
        sqliteproxy: ProxyConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            database: template,
        },
        ..DriverConfig::default()
    };

    let report = run_benchmark(
        options(SystemKind::SqliteProxy, config, scale),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_totals(&ResultsDocument::from_snapshot(&report.snapshot, None));
}

#[tokio::test]
async fn test_interrupted_run_keeps_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let scale = ScaleParameters::with_scale_factor(1, 100.0).unwrap();
    let template = fixture::create_partitions(dir.path(), &scale).unwrap();
    let config = DriverConfig {
        sqlite: SqliteConfig::with_database(template),
        ..DriverConfig::default()
    };

    let report = run_benchmark(
        options(SystemKind::Sqlite, config, scale),
        Arc::new(AtomicBool::new(true)),
    )
    .await
    .unwrap();

    assert_eq!(report.interrupted, 2);
    assert_eq!(report.snapshot.committed_total().count, 0);
    assert!(report.snapshot.window_start.is_some());
}

#[tokio::test]
async fn test_unreachable_proxy_is_reported() {
    let scale = ScaleParameters::with_scale_factor(1, 100.0).unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = DriverConfig {
        sqliteproxy: ProxyConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..ProxyConfig::default()
        },
        ..DriverConfig::default()
    };
    let report = run_benchmark(
        options(SystemKind::SqliteProxy, config, scale),
        Arc::new(AtomicBool::new(false)),
    )
    .await
    .unwrap();

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.completed, 0);
}
