//! Settings for the `sqliteproxy` driver.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9845;

/// Where the proxy server listens and how it names partition files.
///
/// `database` is resolved on the server host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: tpcc_sqlite::config::DEFAULT_DATABASE.to_string(),
        }
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "host = {:?}", self.host)?;
        writeln!(f, "port = {}", self.port)?;
        write!(f, "database = {:?}", self.database)
    }
}
