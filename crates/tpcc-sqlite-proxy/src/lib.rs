//! Remote SQLite backend for the TPC-C workload driver.
//!
//! A thin request/response protocol that forwards statements to a SQLite
//! connection living in another process:
//!
//! ```text
//! PartitionedBackend<ProxyConnection> ──frame──► ProxyServer
//!                                      ◄─frame──   └─ thread per client
//!                                                       └─ SqliteConnection
//! ```
//!
//! Every message is a 4-byte big-endian length followed by UTF-8 JSON.
//! Requests are strictly sequential on one connection.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::{connect, ProxyBackend, ProxyConnection};
pub use config::ProxyConfig;
pub use error::ProtocolError;
pub use protocol::{Request, Response};
pub use server::ProxyServer;
