//! Order-Status profile.

use super::{column_i64, PartitionedBackend};
use crate::connection::SqlConnection;
use crate::error::BackendError;
use crate::partition::PartitionId;
use crate::queries::order_status as q;
use tpcc_types::{OrderStatusParams, OrderStatusResult};

pub(super) fn run<C: SqlConnection>(
    backend: &mut PartitionedBackend<C>,
    params: &OrderStatusParams,
) -> Result<OrderStatusResult, BackendError> {
    let (w_id, d_id) = (params.w_id, params.d_id);

    let home = PartitionId::new(w_id)?;

    let customer = backend.resolve_customer(
        q::GET_CUSTOMER_BY_ID,
        q::GET_CUSTOMERS_BY_LAST_NAME,
        home,
        w_id,
        d_id,
        &params.customer,
    )?;
    let c_id = column_i64(&customer, 0, "C_ID")?;

    let order = backend.query_one(
        q::GET_LAST_ORDER,
        &[home],
        &[w_id.into(), d_id.into(), c_id.into()],
    )?;
    let lines = match &order {
        Some(order) => {
            let o_id = column_i64(order, 0, "O_ID")?;
            backend.query(
                q::GET_ORDER_LINES,
                &[home],
                &[w_id.into(), d_id.into(), o_id.into()],
            )?
        }
        None => Vec::new(),
    };

    backend.conn.commit()?;

    Ok(OrderStatusResult {
        customer,
        order,
        lines,
    })
}
