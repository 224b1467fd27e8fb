//! rusqlite-backed [`SqlConnection`].

use crate::config::SqliteConfig;
use crate::error::SqliteError;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, DatabaseName};
use std::path::Path;
use std::time::Duration;
use tpcc_backend::{BackendError, PartitionId, PartitionLayout, PartitionedBackend, SqlConnection};
use tpcc_types::{Row, SqlValue};
use tracing::debug;

/// Partitioned backend over a local SQLite connection.
pub type SqliteBackend = PartitionedBackend<SqliteConnection>;

/// Statements that must run outside of an explicit transaction, or that
/// manage the transaction themselves.
const NON_TRANSACTIONAL: [&str; 9] = [
    "ATTACH", "DETACH", "PRAGMA", "BEGIN", "COMMIT", "END", "ROLLBACK", "SAVEPOINT", "VACUUM",
];

/// One SQLite session.
///
/// A transaction is opened lazily by the first transactional statement and
/// stays open until [`commit`](SqlConnection::commit) or
/// [`rollback`](SqlConnection::rollback).
pub struct SqliteConnection {
    conn: Connection,
    config: SqliteConfig,
}

impl SqliteConnection {
    /// Open a connection whose main database lives at `path`.
    pub fn open(path: impl AsRef<Path>, config: &SqliteConfig) -> Result<Self, SqliteError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, config)
    }

    /// Open a connection with an in-memory main database.
    pub fn open_in_memory(config: &SqliteConfig) -> Result<Self, SqliteError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: &SqliteConfig) -> Result<Self, SqliteError> {
        if config.cache_size < 0 {
            return Err(SqliteError::Config(format!(
                "cache_size must not be negative, got {}",
                config.cache_size
            )));
        }
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self {
            conn,
            config: config.clone(),
        })
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Apply the configured pragmas to one schema.
    fn apply_pragmas(&self, schema: &str) -> Result<(), SqliteError> {
        let db = Some(DatabaseName::Attached(schema));
        self.conn
            .pragma_update(db, "cache_size", -self.config.cache_size)?;
        let locking_mode: String = self.conn.pragma_update_and_check(
            db,
            "locking_mode",
            self.config.locking_mode.pragma_value(),
            |row| row.get(0),
        )?;
        let journal_mode: String = self.conn.pragma_update_and_check(
            db,
            "journal_mode",
            self.config.journal_mode.pragma_value(),
            |row| row.get(0),
        )?;
        debug!("{schema}: locking_mode={locking_mode} journal_mode={journal_mode}");
        Ok(())
    }

    fn run(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>, SqliteError> {
        if self.conn.is_autocommit() && is_transactional(statement) {
            self.conn.execute_batch("BEGIN")?;
        }

        let mut stmt = self.conn.prepare_cached(statement)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(args.iter().map(to_sqlite)))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(from_sqlite(row.get_ref(idx)?));
            }
            result.push(values);
        }
        Ok(result)
    }

    fn finish(&mut self, command: &str) -> Result<(), SqliteError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch(command)?;
        }
        Ok(())
    }
}

impl SqlConnection for SqliteConnection {
    fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>, BackendError> {
        Ok(self.run(statement, args)?)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        Ok(self.finish("COMMIT")?)
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        Ok(self.finish("ROLLBACK")?)
    }

    fn attach(&mut self, partition: PartitionId, path: &str) -> Result<(), BackendError> {
        let schema = partition.schema_name();
        self.run(
            &format!("ATTACH DATABASE ?1 AS {schema}"),
            &[SqlValue::from(path)],
        )?;
        self.apply_pragmas(&schema)?;
        debug!("Attached {path} as {schema}");
        Ok(())
    }

    fn detach(&mut self, partition: PartitionId) -> Result<(), BackendError> {
        // Cached statements may still reference the schema
        self.conn.flush_prepared_statement_cache();
        self.run(&format!("DETACH DATABASE {}", partition.schema_name()), &[])?;
        Ok(())
    }
}

/// Open an in-memory session and wrap it in a partitioned backend.
pub fn connect(
    config: &SqliteConfig,
    districts_per_warehouse: i64,
) -> Result<SqliteBackend, BackendError> {
    let layout = PartitionLayout::new(config.database.clone())?;
    let conn = SqliteConnection::open_in_memory(config)?;
    Ok(PartitionedBackend::new(conn, layout, districts_per_warehouse))
}

fn is_transactional(statement: &str) -> bool {
    let keyword = statement
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    !NON_TRANSACTIONAL
        .iter()
        .any(|k| k.eq_ignore_ascii_case(keyword))
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpcc_backend::Backend;

    fn memory() -> SqliteConnection {
        SqliteConnection::open_in_memory(&SqliteConfig::default()).unwrap()
    }

    #[test]
    fn test_statement_classification() {
        assert!(is_transactional("SELECT 1"));
        assert!(is_transactional("  insert into t values (1)"));
        assert!(!is_transactional("ATTACH DATABASE ?1 AS P1"));
        assert!(!is_transactional("pragma cache_size"));
        assert!(!is_transactional("COMMIT"));
    }

    #[test]
    fn test_execute_returns_rows() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (id INTEGER, name TEXT, price REAL)", &[])
            .unwrap();
        conn.execute(
            "INSERT INTO t VALUES (?1, ?2, ?3)",
            &[
                SqlValue::Integer(1),
                SqlValue::from("one"),
                SqlValue::Real(1.5),
            ],
        )
        .unwrap();
        conn.execute("INSERT INTO t VALUES (2, NULL, NULL)", &[])
            .unwrap();
        conn.commit().unwrap();

        let rows = conn
            .execute("SELECT id, name, price FROM t ORDER BY id", &[])
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec![
                    SqlValue::Integer(1),
                    SqlValue::Text("one".into()),
                    SqlValue::Real(1.5)
                ],
                vec![SqlValue::Integer(2), SqlValue::Null, SqlValue::Null],
            ]
        );
    }

    #[test]
    fn test_rollback_discards_changes() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (id INTEGER)", &[]).unwrap();
        conn.commit().unwrap();
        assert!(!conn.in_transaction());

        conn.execute("INSERT INTO t VALUES (1)", &[]).unwrap();
        assert!(conn.in_transaction());
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());

        let rows = conn.execute("SELECT COUNT(*) FROM t", &[]).unwrap();
        assert_eq!(rows[0][0], SqlValue::Integer(0));
    }

    #[test]
    fn test_commit_without_transaction_is_noop() {
        let mut conn = memory();
        conn.commit().unwrap();
        conn.rollback().unwrap();
    }

    #[test]
    fn test_sql_error_maps_to_backend_error() {
        let mut conn = memory();
        let err = conn.execute("SELEKT nonsense", &[]).unwrap_err();
        assert!(matches!(err, BackendError::Sql(_)));
    }

    #[test]
    fn test_attach_partition_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w3.db");
        let mut conn = memory();

        let partition = PartitionId::new(3).unwrap();
        conn.attach(partition, path.to_str().unwrap()).unwrap();
        conn.execute("CREATE TABLE P3.T (ID INTEGER)", &[]).unwrap();
        conn.execute("INSERT INTO P3.T VALUES (?1)", &[SqlValue::Integer(7)])
            .unwrap();
        conn.commit().unwrap();

        let rows = conn.execute("SELECT ID FROM P3.T", &[]).unwrap();
        assert_eq!(rows, vec![vec![SqlValue::Integer(7)]]);
        assert!(path.exists());
    }

    #[test]
    fn test_backend_attaches_more_partitions_than_sqlite_allows() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("w{w_id}.db");
        let layout = PartitionLayout::new(template.to_str().unwrap()).unwrap();
        let mut backend = PartitionedBackend::new(memory(), layout, 10);

        for w_id in 1..=12 {
            backend.attach_partition(w_id).unwrap();
            let conn = backend.connection();
            conn.execute(&format!("CREATE TABLE P{w_id}.T (ID INTEGER)"), &[])
                .unwrap();
            conn.execute(
                &format!("INSERT INTO P{w_id}.T VALUES (?1)"),
                &[SqlValue::Integer(w_id)],
            )
            .unwrap();
            conn.commit().unwrap();
        }
        assert_eq!(backend.attached().len(), 10);

        // The two oldest partitions were detached
        let err = backend
            .connection()
            .execute("SELECT ID FROM P1.T", &[])
            .unwrap_err();
        assert!(matches!(err, BackendError::Sql(_)));
        backend.connection().rollback().unwrap();

        backend.attach_partition(1).unwrap();
        let rows = backend
            .connection()
            .execute("SELECT ID FROM P1.T", &[])
            .unwrap();
        assert_eq!(rows, vec![vec![SqlValue::Integer(1)]]);
        backend.connection().commit().unwrap();
        assert!(!backend
            .attached()
            .contains(PartitionId::new(3).unwrap()));
    }
}
