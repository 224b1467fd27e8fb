//! Core types for the TPC-C workload driver.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - [`ScaleParameters`] - Table cardinalities derived from a scale factor
//! - [`TransactionType`] - The five TPC-C transaction types
//! - [`TransactionParams`] - Per-invocation parameter bundles
//! - [`TransactionResult`] - What a backend hands back for each type
//! - [`SqlValue`] - Values crossing the SQL boundary (local or remote)
//!
//! # Architecture
//!
//! ```text
//! tpcc-types (this crate)
//!    │
//!    ├─── tpcc-generator     (random source, parameter synthesis, mix)
//!    ├─── tpcc-backend       (backend contract, partitioned profiles)
//!    │       ├─── tpcc-sqlite        (local rusqlite connection)
//!    │       └─── tpcc-sqlite-proxy  (remote wire protocol)
//!    ├─── tpcc-results       (counters, snapshots, merge)
//!    └─── tpcc-executor      (per-worker execution loop)
//! ```

pub mod constants;
pub mod scale;
pub mod transaction;
pub mod values;

// Re-exports for convenience
pub use scale::{ScaleError, ScaleParameters};
pub use transaction::{
    CustomerSelector, DeliveredOrder, DeliveryParams, DeliveryResult, NewOrderLine,
    NewOrderLineResult, NewOrderParams, NewOrderResult, OrderStatusParams, OrderStatusResult,
    PaymentParams, PaymentResult, StockLevelParams, TransactionParams, TransactionResult,
    TransactionType,
};
pub use values::{format_timestamp, Row, SqlValue, TIMESTAMP_FORMAT};
