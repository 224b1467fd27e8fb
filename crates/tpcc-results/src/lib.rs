//! Transaction statistics for the TPC-C workload driver.
//!
//! Each worker owns a [`Results`] recorder. When the worker finishes it hands
//! back a [`ResultsSnapshot`]; snapshots from all workers are reduced with
//! [`ResultsSnapshot::merge_all`] and rendered as a [`ResultsDocument`].

pub mod document;
pub mod error;
pub mod format;
pub mod recorder;
pub mod snapshot;

pub use document::{append_json_line, ResultsDocument, TotalRow, TxnRow};
pub use error::ResultsError;
pub use format::format_table;
pub use recorder::{Results, RunningTransaction};
pub use snapshot::{ResultsSnapshot, TransactionOutcome, TxnStats};
