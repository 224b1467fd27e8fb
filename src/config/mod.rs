//! Driver configuration file.
//!
//! One TOML table per backend plus an optional `[workload]` table:
//!
//! ```toml
//! [sqlite]
//! database = "/tmp/tpcc-{w_id}.db"
//! journal_mode = "wal"
//!
//! [sqliteproxy]
//! host = "localhost"
//! port = 9845
//!
//! [workload.weights]
//! NEW_ORDER = 45
//! PAYMENT = 43
//! ```

pub mod duration;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tpcc_generator::TransactionMix;
use tpcc_sqlite::SqliteConfig;
use tpcc_sqlite_proxy::ProxyConfig;
use tpcc_types::TransactionType;

/// Backend a benchmark runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemKind {
    /// Local SQLite partition files
    #[value(name = "sqlite")]
    Sqlite,
    /// SQLite behind a proxy server
    #[value(name = "sqliteproxy")]
    SqliteProxy,
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemKind::Sqlite => write!(f, "sqlite"),
            SystemKind::SqliteProxy => write!(f, "sqliteproxy"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Per-type weight overrides on top of the default mix, keyed by
    /// transaction name (case-insensitive).
    pub weights: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub sqlite: SqliteConfig,
    pub sqliteproxy: ProxyConfig,
    pub workload: WorkloadConfig,
}

impl DriverConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {path:?}"))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Transaction mix: `frac_read` wins over configured weights.
    pub fn mix(&self, frac_read: Option<f64>) -> anyhow::Result<TransactionMix> {
        let mix = match frac_read {
            Some(f) => TransactionMix::read_fraction(f)?,
            None if self.workload.weights.is_empty() => TransactionMix::default(),
            None => TransactionMix::default().with_overrides(&self.weight_overrides()?)?,
        };
        Ok(mix)
    }

    fn weight_overrides(&self) -> anyhow::Result<BTreeMap<TransactionType, u32>> {
        self.workload
            .weights
            .iter()
            .map(|(name, weight)| {
                let txn = name.parse::<TransactionType>().map_err(anyhow::Error::msg)?;
                Ok((txn, *weight))
            })
            .collect()
    }

    /// Default settings for one backend, as a config file table.
    pub fn default_table(system: SystemKind) -> String {
        let defaults = DriverConfig::default();
        match system {
            SystemKind::Sqlite => format!("[sqlite]\n{}\n", defaults.sqlite),
            SystemKind::SqliteProxy => format!("[sqliteproxy]\n{}\n", defaults.sqliteproxy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DriverConfig::parse("").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.sqliteproxy.port, 9845);
        assert_eq!(config.mix(None).unwrap(), TransactionMix::default());
    }

    #[test]
    fn test_parse_tables() {
        let config = DriverConfig::parse(
            r#"
            [sqlite]
            database = "/data/w{w_id}.db"
            locking_mode = "exclusive"

            [sqliteproxy]
            host = "db.internal"

            [workload.weights]
            NEW_ORDER = 50
            delivery = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.sqlite.database, "/data/w{w_id}.db");
        assert_eq!(config.sqliteproxy.host, "db.internal");
        assert_eq!(config.sqliteproxy.port, 9845);

        let mix = config.mix(None).unwrap();
        let weights: BTreeMap<_, _> = mix.weights().iter().copied().collect();
        assert_eq!(weights[&TransactionType::NewOrder], 50);
        assert_eq!(weights[&TransactionType::Delivery], 0);
        assert_eq!(weights[&TransactionType::Payment], 43);
    }

    #[test]
    fn test_unknown_weight_name() {
        let config = DriverConfig::parse("[workload.weights]\nREFUND = 3\n").unwrap();
        assert!(config.mix(None).is_err());
    }

    #[test]
    fn test_frac_read_overrides_weights() {
        let config = DriverConfig::default();
        let mix = config.mix(Some(1.0)).unwrap();
        let weights: BTreeMap<_, _> = mix.weights().iter().copied().collect();
        assert_eq!(weights[&TransactionType::StockLevel], 500);
        assert_eq!(weights[&TransactionType::NewOrder], 0);
        assert!(config.mix(Some(1.5)).is_err());
    }

    #[test]
    fn test_default_tables_round_trip() {
        for system in [SystemKind::Sqlite, SystemKind::SqliteProxy] {
            let table = DriverConfig::default_table(system);
            assert_eq!(DriverConfig::parse(&table).unwrap(), DriverConfig::default());
        }
    }
}
