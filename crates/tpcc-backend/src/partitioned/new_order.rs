//! New-Order profile.

use super::{column_f64, column_i64, column_text, PartitionedBackend};
use crate::connection::SqlConnection;
use crate::error::BackendError;
use crate::partition::PartitionId;
use crate::queries::{new_order as q, stock_dist_column};
use tpcc_types::constants::{NULL_CARRIER_ID, ORIGINAL_STRING};
use tpcc_types::{NewOrderLineResult, NewOrderParams, NewOrderResult, Row, SqlValue};
use tracing::{debug, warn};

/// Stock quantity after ordering `ordered` units.
///
/// Stock that would drop below 10 is topped up by 91.
pub fn restock(s_quantity: i64, ordered: i64) -> i64 {
    if s_quantity >= ordered + 10 {
        s_quantity - ordered
    } else {
        s_quantity + 91 - ordered
    }
}

struct ItemInfo {
    price: f64,
    name: String,
    data: String,
}

pub(super) fn run<C: SqlConnection>(
    backend: &mut PartitionedBackend<C>,
    params: &NewOrderParams,
) -> Result<Option<NewOrderResult>, BackendError> {
    let NewOrderParams {
        w_id,
        d_id,
        c_id,
        o_entry_d,
        lines,
    } = params;
    let (w_id, d_id, c_id) = (*w_id, *d_id, *c_id);

    let home = PartitionId::new(w_id)?;
    let dist_column = stock_dist_column(d_id)?;

    // Item lookups come first: an unused id rolls the whole order back
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let row = backend.query_one(q::GET_ITEM_INFO, &[home], &[line.i_id.into()])?;
        match row {
            Some(row) => items.push(ItemInfo {
                price: column_f64(&row, 0, "I_PRICE")?,
                name: column_text(&row, 1),
                data: column_text(&row, 2),
            }),
            None => {
                debug!("Item {} does not exist, rolling back new order", line.i_id);
                backend.conn.rollback()?;
                return Ok(None);
            }
        }
    }

    let warehouse = backend.query_required(
        q::GET_WAREHOUSE_TAX_RATE,
        &[home],
        &[w_id.into()],
        || format!("warehouse {w_id}"),
    )?;
    let w_tax = column_f64(&warehouse, 0, "W_TAX")?;

    let district = backend.query_required(
        q::GET_DISTRICT,
        &[home],
        &[d_id.into(), w_id.into()],
        || format!("district {d_id} of warehouse {w_id}"),
    )?;
    let d_tax = column_f64(&district, 0, "D_TAX")?;
    let o_id = column_i64(&district, 1, "D_NEXT_O_ID")?;

    let customer: Row = backend.query_required(
        q::GET_CUSTOMER,
        &[home],
        &[w_id.into(), d_id.into(), c_id.into()],
        || format!("customer {c_id} in district {d_id} of warehouse {w_id}"),
    )?;
    let c_discount = column_f64(&customer, 0, "C_DISCOUNT")?;

    let ol_cnt = lines.len() as i64;
    let all_local = params.all_local();

    backend.query(
        q::INCREMENT_NEXT_ORDER_ID,
        &[home],
        &[(o_id + 1).into(), d_id.into(), w_id.into()],
    )?;
    backend.query(
        q::CREATE_ORDER,
        &[home],
        &[
            o_id.into(),
            d_id.into(),
            w_id.into(),
            c_id.into(),
            (*o_entry_d).into(),
            NULL_CARRIER_ID.into(),
            ol_cnt.into(),
            all_local.into(),
        ],
    )?;
    backend.query(
        q::CREATE_NEW_ORDER,
        &[home],
        &[o_id.into(), d_id.into(), w_id.into()],
    )?;

    let stock_sql = q::GET_STOCK_INFO.replace("{dist}", dist_column);
    let mut line_results = Vec::with_capacity(lines.len());
    let mut total = 0.0;

    for (idx, (line, item)) in lines.iter().zip(&items).enumerate() {
        let ol_number = idx as i64 + 1;
        let supplier = PartitionId::new(line.supply_w_id)?;

        let Some(stock) = backend.query_one(
            &stock_sql,
            &[supplier],
            &[line.i_id.into(), line.supply_w_id.into()],
        )?
        else {
            warn!(
                "No STOCK record for (ol_i_id={}, ol_supply_w_id={})",
                line.i_id, line.supply_w_id
            );
            continue;
        };

        let s_quantity = restock(column_i64(&stock, 0, "S_QUANTITY")?, line.quantity);
        let s_data = column_text(&stock, 1);
        let s_ytd = column_i64(&stock, 2, "S_YTD")? + line.quantity;
        let s_order_cnt = column_i64(&stock, 3, "S_ORDER_CNT")? + 1;
        let mut s_remote_cnt = column_i64(&stock, 4, "S_REMOTE_CNT")?;
        if line.supply_w_id != w_id {
            s_remote_cnt += 1;
        }
        let s_dist_info = column_text(&stock, 5);

        backend.query(
            q::UPDATE_STOCK,
            &[supplier],
            &[
                s_quantity.into(),
                s_ytd.into(),
                s_order_cnt.into(),
                s_remote_cnt.into(),
                line.i_id.into(),
                line.supply_w_id.into(),
            ],
        )?;

        let brand_generic =
            if item.data.contains(ORIGINAL_STRING) && s_data.contains(ORIGINAL_STRING) {
                'B'
            } else {
                'G'
            };

        let ol_amount = line.quantity as f64 * item.price;
        total += ol_amount;

        backend.query(
            q::CREATE_ORDER_LINE,
            &[home],
            &[
                o_id.into(),
                d_id.into(),
                w_id.into(),
                ol_number.into(),
                line.i_id.into(),
                line.supply_w_id.into(),
                (*o_entry_d).into(),
                line.quantity.into(),
                ol_amount.into(),
                SqlValue::Text(s_dist_info),
            ],
        )?;

        line_results.push(NewOrderLineResult {
            supply_w_id: line.supply_w_id,
            i_id: line.i_id,
            i_name: item.name.clone(),
            quantity: line.quantity,
            s_quantity,
            brand_generic,
            i_price: item.price,
            ol_amount,
        });
    }

    backend.conn.commit()?;

    total *= (1.0 - c_discount) * (1.0 + w_tax + d_tax);

    Ok(Some(NewOrderResult {
        customer,
        w_tax,
        d_tax,
        o_id,
        total,
        lines: line_results,
    }))
}
