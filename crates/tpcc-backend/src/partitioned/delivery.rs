//! Delivery profile.

use super::{column_i64, PartitionedBackend};
use crate::connection::SqlConnection;
use crate::error::BackendError;
use crate::partition::PartitionId;
use crate::queries::delivery as q;
use tpcc_types::{DeliveredOrder, DeliveryParams, DeliveryResult, SqlValue};
use tracing::warn;

pub(super) fn run<C: SqlConnection>(
    backend: &mut PartitionedBackend<C>,
    params: &DeliveryParams,
) -> Result<DeliveryResult, BackendError> {
    let w_id = params.w_id;

    let home = PartitionId::new(w_id)?;

    let mut result = DeliveryResult::default();
    for d_id in 1..=backend.districts_per_warehouse {
        let Some(new_order) =
            backend.query_one(q::GET_NEW_ORDER, &[home], &[d_id.into(), w_id.into()])?
        else {
            warn!("No undelivered order in district {d_id} of warehouse {w_id}");
            result.skipped.push(d_id);
            continue;
        };
        let o_id = column_i64(&new_order, 0, "NO_O_ID")?;

        let order = backend.query_required(
            q::GET_C_ID,
            &[home],
            &[o_id.into(), d_id.into(), w_id.into()],
            || format!("order {o_id} in district {d_id} of warehouse {w_id}"),
        )?;
        let c_id = column_i64(&order, 0, "O_C_ID")?;

        let sum = backend.query_one(
            q::SUM_OL_AMOUNT,
            &[home],
            &[o_id.into(), d_id.into(), w_id.into()],
        )?;
        let ol_total = match sum.as_ref().and_then(|row| row.first()) {
            Some(value) if !value.is_null() => value.as_f64().unwrap_or(0.0),
            _ => {
                return Err(BackendError::Integrity(format!(
                    "order {o_id} in district {d_id} of warehouse {w_id} has no order lines"
                )))
            }
        };
        if ol_total <= 0.0 {
            return Err(BackendError::Integrity(format!(
                "order {o_id} in district {d_id} of warehouse {w_id} totals {ol_total}"
            )));
        }

        backend.query(
            q::DELETE_NEW_ORDER,
            &[home],
            &[d_id.into(), w_id.into(), o_id.into()],
        )?;
        backend.query(
            q::UPDATE_ORDERS,
            &[home],
            &[
                params.o_carrier_id.into(),
                o_id.into(),
                d_id.into(),
                w_id.into(),
            ],
        )?;
        backend.query(
            q::UPDATE_ORDER_LINE,
            &[home],
            &[
                SqlValue::from(params.ol_delivery_d),
                o_id.into(),
                d_id.into(),
                w_id.into(),
            ],
        )?;
        backend.query(
            q::UPDATE_CUSTOMER,
            &[home],
            &[ol_total.into(), c_id.into(), d_id.into(), w_id.into()],
        )?;

        result.delivered.push(DeliveredOrder { d_id, o_id });
    }

    backend.conn.commit()?;

    Ok(result)
}
