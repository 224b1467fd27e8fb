//! The contract every backend fulfils.

use crate::error::BackendError;
use std::collections::BTreeSet;
use tpcc_types::{
    DeliveryParams, DeliveryResult, NewOrderParams, NewOrderResult, OrderStatusParams,
    OrderStatusResult, PaymentParams, PaymentResult, StockLevelParams, TransactionParams,
    TransactionResult,
};

/// A transactional backend capable of running the five TPC-C profiles.
///
/// Each handler performs exactly its profile and commits before returning.
/// Handlers expect every partition their parameters touch to be attached;
/// [`execute`](Backend::execute) takes care of that. On error the
/// transaction is left open; callers must invoke [`abort`](Backend::abort)
/// before retrying.
pub trait Backend {
    /// Make the partition holding warehouse `w_id` reachable. Idempotent.
    fn attach_partition(&mut self, w_id: i64) -> Result<(), BackendError>;

    /// Make every partition in `w_ids` reachable at once.
    fn attach_partitions(&mut self, w_ids: &BTreeSet<i64>) -> Result<(), BackendError> {
        for &w_id in w_ids {
            self.attach_partition(w_id)?;
        }
        Ok(())
    }

    /// Returns `None` when the order referenced an unused item and was
    /// rolled back.
    fn new_order(&mut self, params: &NewOrderParams)
        -> Result<Option<NewOrderResult>, BackendError>;

    fn payment(&mut self, params: &PaymentParams) -> Result<PaymentResult, BackendError>;

    fn order_status(
        &mut self,
        params: &OrderStatusParams,
    ) -> Result<OrderStatusResult, BackendError>;

    fn delivery(&mut self, params: &DeliveryParams) -> Result<DeliveryResult, BackendError>;

    /// Number of distinct recently ordered items below the stock threshold.
    fn stock_level(&mut self, params: &StockLevelParams) -> Result<i64, BackendError>;

    fn commit(&mut self) -> Result<(), BackendError>;

    /// Roll back whatever the current transaction has done.
    fn abort(&mut self) -> Result<(), BackendError>;

    /// Attach the partitions `params` touches, then dispatch on the tag.
    fn execute(&mut self, params: &TransactionParams) -> Result<TransactionResult, BackendError> {
        self.attach_partitions(&params.partitions())?;
        match params {
            TransactionParams::Delivery(p) => self.delivery(p).map(TransactionResult::Delivery),
            TransactionParams::NewOrder(p) => self.new_order(p).map(TransactionResult::NewOrder),
            TransactionParams::OrderStatus(p) => {
                self.order_status(p).map(TransactionResult::OrderStatus)
            }
            TransactionParams::Payment(p) => self.payment(p).map(TransactionResult::Payment),
            TransactionParams::StockLevel(p) => {
                self.stock_level(p).map(TransactionResult::StockLevel)
            }
        }
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn attach_partition(&mut self, w_id: i64) -> Result<(), BackendError> {
        (**self).attach_partition(w_id)
    }

    fn attach_partitions(&mut self, w_ids: &BTreeSet<i64>) -> Result<(), BackendError> {
        (**self).attach_partitions(w_ids)
    }

    fn new_order(
        &mut self,
        params: &NewOrderParams,
    ) -> Result<Option<NewOrderResult>, BackendError> {
        (**self).new_order(params)
    }

    fn payment(&mut self, params: &PaymentParams) -> Result<PaymentResult, BackendError> {
        (**self).payment(params)
    }

    fn order_status(
        &mut self,
        params: &OrderStatusParams,
    ) -> Result<OrderStatusResult, BackendError> {
        (**self).order_status(params)
    }

    fn delivery(&mut self, params: &DeliveryParams) -> Result<DeliveryResult, BackendError> {
        (**self).delivery(params)
    }

    fn stock_level(&mut self, params: &StockLevelParams) -> Result<i64, BackendError> {
        (**self).stock_level(params)
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        (**self).commit()
    }

    fn abort(&mut self) -> Result<(), BackendError> {
        (**self).abort()
    }

    fn execute(&mut self, params: &TransactionParams) -> Result<TransactionResult, BackendError> {
        (**self).execute(params)
    }
}
