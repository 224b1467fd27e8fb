//! Local SQLite transport for the TPC-C workload driver.
//!
//! [`SqliteConnection`] implements [`tpcc_backend::SqlConnection`] over a
//! rusqlite connection whose main database is in memory; warehouse
//! partitions are attached as separate files. The same connection type is
//! used by the proxy server for each client it serves.

pub mod config;
pub mod connection;
pub mod error;
#[cfg(feature = "test-fixture")]
pub mod fixture;

pub use config::{JournalMode, LockingMode, SqliteConfig};
pub use connection::{connect, SqliteBackend, SqliteConnection};
pub use error::SqliteError;
