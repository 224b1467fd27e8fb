//! Stock-Level profile.

use super::{column_i64, PartitionedBackend};
use crate::connection::SqlConnection;
use crate::error::BackendError;
use crate::partition::PartitionId;
use crate::queries::stock_level as q;
use tpcc_types::constants::STOCK_LEVEL_ORDERS;
use tpcc_types::StockLevelParams;

pub(super) fn run<C: SqlConnection>(
    backend: &mut PartitionedBackend<C>,
    params: &StockLevelParams,
) -> Result<i64, BackendError> {
    let StockLevelParams {
        w_id,
        d_id,
        threshold,
    } = *params;

    let home = PartitionId::new(w_id)?;

    let district = backend.query_required(
        q::GET_O_ID,
        &[home],
        &[w_id.into(), d_id.into()],
        || format!("district {d_id} of warehouse {w_id}"),
    )?;
    let next_o_id = column_i64(&district, 0, "D_NEXT_O_ID")?;

    let count = backend.query_required(
        q::GET_STOCK_COUNT,
        &[home, home],
        &[
            w_id.into(),
            d_id.into(),
            next_o_id.into(),
            (next_o_id - STOCK_LEVEL_ORDERS).into(),
            w_id.into(),
            threshold.into(),
        ],
        || "stock count".to_string(),
    )?;
    let count = column_i64(&count, 0, "COUNT")?;

    backend.conn.commit()?;

    Ok(count)
}
