//! Cursor-style SQL capability implemented by each transport.

use crate::error::BackendError;
use crate::partition::PartitionId;
use tpcc_types::{Row, SqlValue};

/// A single SQL session.
///
/// Statements run inside an implicit transaction that lasts until
/// [`commit`](SqlConnection::commit) or [`rollback`](SqlConnection::rollback).
pub trait SqlConnection {
    /// Run one statement with positional arguments and return all rows.
    fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>, BackendError>;

    fn commit(&mut self) -> Result<(), BackendError>;

    fn rollback(&mut self) -> Result<(), BackendError>;

    /// Attach the database file at `path` under the partition's schema name.
    ///
    /// Must be called outside of an open transaction.
    fn attach(&mut self, partition: PartitionId, path: &str) -> Result<(), BackendError> {
        let statement = format!("ATTACH DATABASE ?1 AS {}", partition.schema_name());
        self.execute(&statement, &[SqlValue::from(path)])?;
        Ok(())
    }

    /// Detach a partition attached earlier. Must be called outside of an
    /// open transaction.
    fn detach(&mut self, partition: PartitionId) -> Result<(), BackendError> {
        let statement = format!("DETACH DATABASE {}", partition.schema_name());
        self.execute(&statement, &[])?;
        Ok(())
    }
}

impl<C: SqlConnection + ?Sized> SqlConnection for Box<C> {
    fn execute(&mut self, statement: &str, args: &[SqlValue]) -> Result<Vec<Row>, BackendError> {
        (**self).execute(statement, args)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        (**self).rollback()
    }

    fn attach(&mut self, partition: PartitionId, path: &str) -> Result<(), BackendError> {
        (**self).attach(partition, path)
    }

    fn detach(&mut self, partition: PartitionId) -> Result<(), BackendError> {
        (**self).detach(partition)
    }
}
