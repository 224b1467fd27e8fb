//! Payment profile.

use super::{column_f64, column_i64, column_text, PartitionedBackend};
use crate::connection::SqlConnection;
use crate::error::BackendError;
use crate::partition::PartitionId;
use crate::queries::payment as q;
use tpcc_types::constants::{BAD_CREDIT, HISTORY_DATA_SEPARATOR, MAX_C_DATA};
use tpcc_types::{PaymentParams, PaymentResult};

// Column positions in the customer row
const C_ID: usize = 0;
const C_CREDIT: usize = 11;
const C_BALANCE: usize = 14;
const C_YTD_PAYMENT: usize = 15;
const C_PAYMENT_CNT: usize = 16;
const C_DATA: usize = 17;

/// New `C_DATA` for a bad-credit customer: the payment note followed by the
/// old data, cut to [`MAX_C_DATA`] characters.
pub fn bad_credit_data(
    c_id: i64,
    c_d_id: i64,
    c_w_id: i64,
    d_id: i64,
    w_id: i64,
    h_amount: f64,
    c_data: &str,
) -> String {
    format!("{c_id} {c_d_id} {c_w_id} {d_id} {w_id} {h_amount:.2}|{c_data}")
        .chars()
        .take(MAX_C_DATA)
        .collect()
}

pub(super) fn run<C: SqlConnection>(
    backend: &mut PartitionedBackend<C>,
    params: &PaymentParams,
) -> Result<PaymentResult, BackendError> {
    let PaymentParams {
        w_id,
        d_id,
        h_amount,
        c_w_id,
        c_d_id,
        customer: selector,
        h_date,
    } = params;
    let (w_id, d_id, h_amount, c_w_id, c_d_id) = (*w_id, *d_id, *h_amount, *c_w_id, *c_d_id);

    let home = PartitionId::new(w_id)?;
    let customer_partition = PartitionId::new(c_w_id)?;

    // The customer lives in the customer warehouse and district
    let customer = backend.resolve_customer(
        q::GET_CUSTOMER_BY_ID,
        q::GET_CUSTOMERS_BY_LAST_NAME,
        customer_partition,
        c_w_id,
        c_d_id,
        selector,
    )?;
    let c_id = column_i64(&customer, C_ID, "C_ID")?;
    let c_balance = column_f64(&customer, C_BALANCE, "C_BALANCE")? - h_amount;
    let c_ytd_payment = column_f64(&customer, C_YTD_PAYMENT, "C_YTD_PAYMENT")? + h_amount;
    let c_payment_cnt = column_i64(&customer, C_PAYMENT_CNT, "C_PAYMENT_CNT")? + 1;
    let c_credit = column_text(&customer, C_CREDIT);

    let warehouse = backend.query_required(q::GET_WAREHOUSE, &[home], &[w_id.into()], || {
        format!("warehouse {w_id}")
    })?;
    let district = backend.query_required(
        q::GET_DISTRICT,
        &[home],
        &[w_id.into(), d_id.into()],
        || format!("district {d_id} of warehouse {w_id}"),
    )?;

    backend.query(
        q::UPDATE_WAREHOUSE_BALANCE,
        &[home],
        &[h_amount.into(), w_id.into()],
    )?;
    backend.query(
        q::UPDATE_DISTRICT_BALANCE,
        &[home],
        &[h_amount.into(), w_id.into(), d_id.into()],
    )?;

    if c_credit == BAD_CREDIT {
        let c_data = bad_credit_data(
            c_id,
            c_d_id,
            c_w_id,
            d_id,
            w_id,
            h_amount,
            &column_text(&customer, C_DATA),
        );
        backend.query(
            q::UPDATE_BC_CUSTOMER,
            &[customer_partition],
            &[
                c_balance.into(),
                c_ytd_payment.into(),
                c_payment_cnt.into(),
                c_data.into(),
                c_w_id.into(),
                c_d_id.into(),
                c_id.into(),
            ],
        )?;
    } else {
        backend.query(
            q::UPDATE_GC_CUSTOMER,
            &[customer_partition],
            &[
                c_balance.into(),
                c_ytd_payment.into(),
                c_payment_cnt.into(),
                c_w_id.into(),
                c_d_id.into(),
                c_id.into(),
            ],
        )?;
    }

    let h_data = format!(
        "{}{HISTORY_DATA_SEPARATOR}{}",
        column_text(&warehouse, 0),
        column_text(&district, 0)
    );
    backend.query(
        q::INSERT_HISTORY,
        &[home],
        &[
            c_id.into(),
            c_d_id.into(),
            c_w_id.into(),
            d_id.into(),
            w_id.into(),
            (*h_date).into(),
            h_amount.into(),
            h_data.into(),
        ],
    )?;

    backend.conn.commit()?;

    Ok(PaymentResult {
        warehouse,
        district,
        customer,
    })
}
