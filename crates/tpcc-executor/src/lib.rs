//! Execution loop for the TPC-C workload driver.
//!
//! One [`Executor`] drives one backend session until its deadline:
//!
//! ```text
//! loop {
//!     think time ─► interrupt? ─► mix.pick ─► generator.generate
//!         ─► [fence.begin] backend.execute [fence.commit]   (≤ 3 attempts)
//!         ─► results.commit | results.abort | results.interrupt
//! }
//! ```
//!
//! Executors share nothing but read-only inputs and the interrupt flag, so
//! many of them can run side by side and their snapshots merged afterwards.

pub mod config;
pub mod error;
pub mod executor;
pub mod fence;

pub use config::{ExecutorConfig, RetryPolicy};
pub use error::{ExecutorError, FenceError};
pub use executor::{Executor, RunOutcome};
pub use fence::{Fence, IoctlFence};
