//! [`Backend`] over a [`SqlConnection`] with one database file per warehouse.

mod delivery;
mod new_order;
mod order_status;
mod payment;
mod stock_level;

pub use new_order::restock;
pub use payment::bad_credit_data;

use crate::connection::SqlConnection;
use crate::contract::Backend;
use crate::error::BackendError;
use crate::partition::{PartitionId, PartitionLayout, PartitionSet, MAX_ATTACHED_PARTITIONS};
use crate::queries::render;
use std::collections::BTreeSet;
use tpcc_types::{
    CustomerSelector, DeliveryParams, DeliveryResult, NewOrderParams, NewOrderResult,
    OrderStatusParams, OrderStatusResult, PaymentParams, PaymentResult, Row, SqlValue,
    StockLevelParams,
};
use tracing::debug;

/// Backend session owning one connection and the set of partitions
/// attached to it.
pub struct PartitionedBackend<C: SqlConnection> {
    conn: C,
    layout: PartitionLayout,
    attached: PartitionSet,
    districts_per_warehouse: i64,
}

impl<C: SqlConnection> PartitionedBackend<C> {
    pub fn new(conn: C, layout: PartitionLayout, districts_per_warehouse: i64) -> Self {
        Self::with_partition_limit(conn, layout, districts_per_warehouse, MAX_ATTACHED_PARTITIONS)
    }

    /// Like [`new`](Self::new) with a custom cap on simultaneously attached
    /// partitions.
    pub fn with_partition_limit(
        conn: C,
        layout: PartitionLayout,
        districts_per_warehouse: i64,
        limit: usize,
    ) -> Self {
        Self {
            conn,
            layout,
            attached: PartitionSet::with_capacity(limit),
            districts_per_warehouse,
        }
    }

    pub fn attached(&self) -> &PartitionSet {
        &self.attached
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Attach every partition in `needed`, detaching the least recently
    /// used partitions outside `needed` once the set is full.
    fn attach_set(&mut self, needed: &BTreeSet<PartitionId>) -> Result<(), BackendError> {
        let limit = self.attached.capacity();
        if needed.len() > limit {
            return Err(BackendError::TooManyPartitions {
                needed: needed.len(),
                limit,
            });
        }
        for &id in needed {
            self.attached.touch(id);
        }
        for &id in needed {
            if self.attached.contains(id) {
                continue;
            }
            if self.attached.is_full() {
                let victim = self.attached.eviction_candidate(needed).ok_or(
                    BackendError::TooManyPartitions {
                        needed: needed.len(),
                        limit,
                    },
                )?;
                debug!("Detaching partition {victim}");
                self.conn.detach(victim)?;
                self.attached.remove(victim);
            }
            let path = self.layout.path_for(id);
            debug!("Attaching partition {id} from {path}");
            self.conn.attach(id, &path)?;
            self.attached.insert(id);
        }
        Ok(())
    }

    fn query(
        &mut self,
        template: &str,
        partitions: &[PartitionId],
        args: &[SqlValue],
    ) -> Result<Vec<Row>, BackendError> {
        let sql = render(template, partitions);
        debug!("Run query {sql} with args {args:?}");
        self.conn.execute(&sql, args)
    }

    fn query_one(
        &mut self,
        template: &str,
        partitions: &[PartitionId],
        args: &[SqlValue],
    ) -> Result<Option<Row>, BackendError> {
        Ok(self.query(template, partitions, args)?.into_iter().next())
    }

    fn query_required(
        &mut self,
        template: &str,
        partitions: &[PartitionId],
        args: &[SqlValue],
        what: impl FnOnce() -> String,
    ) -> Result<Row, BackendError> {
        self.query_one(template, partitions, args)?
            .ok_or_else(|| BackendError::NotFound(what()))
    }

    /// Resolve a customer by id, or by last name picking the midpoint of the
    /// matches ordered by first name.
    fn resolve_customer(
        &mut self,
        by_id: &str,
        by_last_name: &str,
        partition: PartitionId,
        w_id: i64,
        d_id: i64,
        selector: &CustomerSelector,
    ) -> Result<Row, BackendError> {
        match selector {
            CustomerSelector::ById(c_id) => self.query_required(
                by_id,
                &[partition],
                &[w_id.into(), d_id.into(), (*c_id).into()],
                || format!("customer {c_id} in district {d_id} of warehouse {w_id}"),
            ),
            CustomerSelector::ByLastName(c_last) => {
                let rows = self.query(
                    by_last_name,
                    &[partition],
                    &[w_id.into(), d_id.into(), c_last.as_str().into()],
                )?;
                let index = midpoint_index(rows.len()).ok_or_else(|| {
                    BackendError::NotFound(format!(
                        "customer named {c_last} in district {d_id} of warehouse {w_id}"
                    ))
                })?;
                Ok(rows.into_iter().nth(index).unwrap_or_default())
            }
        }
    }
}

/// Index of the customer picked out of `n` same-name matches.
pub fn midpoint_index(n: usize) -> Option<usize> {
    n.checked_sub(1).map(|last| last / 2)
}

/// Typed column access for result rows.
pub(crate) fn column_i64(row: &Row, idx: usize, what: &str) -> Result<i64, BackendError> {
    row.get(idx)
        .and_then(SqlValue::as_i64)
        .ok_or_else(|| BackendError::Sql(format!("expected integer {what} in column {idx}")))
}

pub(crate) fn column_f64(row: &Row, idx: usize, what: &str) -> Result<f64, BackendError> {
    row.get(idx)
        .and_then(SqlValue::as_f64)
        .ok_or_else(|| BackendError::Sql(format!("expected number {what} in column {idx}")))
}

pub(crate) fn column_text(row: &Row, idx: usize) -> String {
    match row.get(idx) {
        Some(SqlValue::Text(s)) => s.clone(),
        Some(SqlValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl<C: SqlConnection> Backend for PartitionedBackend<C> {
    fn attach_partition(&mut self, w_id: i64) -> Result<(), BackendError> {
        self.attach_set(&BTreeSet::from([PartitionId::new(w_id)?]))
    }

    fn attach_partitions(&mut self, w_ids: &BTreeSet<i64>) -> Result<(), BackendError> {
        let needed = w_ids
            .iter()
            .map(|&w_id| PartitionId::new(w_id))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.attach_set(&needed)
    }

    fn new_order(
        &mut self,
        params: &NewOrderParams,
    ) -> Result<Option<NewOrderResult>, BackendError> {
        new_order::run(self, params)
    }

    fn payment(&mut self, params: &PaymentParams) -> Result<PaymentResult, BackendError> {
        payment::run(self, params)
    }

    fn order_status(
        &mut self,
        params: &OrderStatusParams,
    ) -> Result<OrderStatusResult, BackendError> {
        order_status::run(self, params)
    }

    fn delivery(&mut self, params: &DeliveryParams) -> Result<DeliveryResult, BackendError> {
        delivery::run(self, params)
    }

    fn stock_level(&mut self, params: &StockLevelParams) -> Result<i64, BackendError> {
        stock_level::run(self, params)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.conn.commit()
    }

    fn abort(&mut self) -> Result<(), BackendError> {
        self.conn.rollback()
    }
}
