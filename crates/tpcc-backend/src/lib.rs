//! Backend access layer for the TPC-C workload driver.
//!
//! The [`Backend`] trait is what the executor drives: one handler per
//! transaction type, each running its full profile and committing before it
//! returns. [`PartitionedBackend`] implements it on top of any
//! [`SqlConnection`], with data split into one database file per warehouse
//! and attached on demand under the schema name `P<w_id>`.
//!
//! ```text
//!            Backend (trait)
//!                 │
//!      PartitionedBackend<C: SqlConnection>
//!         │                       │
//!   SqliteConnection        ProxyConnection
//!   (tpcc-sqlite)           (tpcc-sqlite-proxy)
//! ```

pub mod connection;
pub mod contract;
pub mod error;
pub mod partition;
pub mod partitioned;
pub mod queries;

pub use connection::SqlConnection;
pub use contract::Backend;
pub use error::BackendError;
pub use partition::{PartitionId, PartitionLayout, PartitionSet, MAX_ATTACHED_PARTITIONS};
pub use partitioned::PartitionedBackend;
