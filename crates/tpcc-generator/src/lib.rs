//! Parameter synthesis for the TPC-C workload driver.
//!
//! Each worker owns one [`RandomSource`] and one [`ParameterGenerator`].
//! The NURand run constants are drawn once per process and handed to every
//! worker, so skew is identical across workers while their draws differ.
//!
//! ```text
//! TransactionMix::pick ──► TransactionType
//!                              │
//!                              ▼
//!              ParameterGenerator::generate ──► TransactionParams
//!                              │
//!                              ▼
//!                      RandomSource (StdRng + NuRandConstants)
//! ```

pub mod params;
pub mod random;
pub mod selector;

pub use params::ParameterGenerator;
pub use random::{make_last_name, NuRandConstants, RandomSource};
pub use selector::{MixError, TransactionMix};
