//! Statement templates for the five transaction profiles.
//!
//! `{0}` and `{1}` stand for partition schema names and are filled in by
//! [`render`] from validated [`PartitionId`]s. Every data value is a bound
//! positional argument.

use crate::error::BackendError;
use crate::partition::PartitionId;

/// Stock distribution info columns, indexed by district id - 1.
const STOCK_DIST_COLUMNS: [&str; 10] = [
    "S_DIST_01",
    "S_DIST_02",
    "S_DIST_03",
    "S_DIST_04",
    "S_DIST_05",
    "S_DIST_06",
    "S_DIST_07",
    "S_DIST_08",
    "S_DIST_09",
    "S_DIST_10",
];

/// Substitute partition schema names into a template.
pub fn render(template: &str, partitions: &[PartitionId]) -> String {
    partitions
        .iter()
        .enumerate()
        .fold(template.to_string(), |sql, (idx, id)| {
            sql.replace(&format!("{{{idx}}}"), &id.schema_name())
        })
}

/// `S_DIST_xx` column for a district.
pub fn stock_dist_column(d_id: i64) -> Result<&'static str, BackendError> {
    usize::try_from(d_id - 1)
        .ok()
        .and_then(|idx| STOCK_DIST_COLUMNS.get(idx))
        .copied()
        .ok_or(BackendError::InvalidDistrict(d_id))
}

pub mod delivery {
    pub const GET_NEW_ORDER: &str = "SELECT NO_O_ID FROM {0}.NEW_ORDER \
        WHERE NO_D_ID = ?1 AND NO_W_ID = ?2 AND NO_O_ID > -1 \
        ORDER BY NO_O_ID ASC LIMIT 1";
    pub const DELETE_NEW_ORDER: &str =
        "DELETE FROM {0}.NEW_ORDER WHERE NO_D_ID = ?1 AND NO_W_ID = ?2 AND NO_O_ID = ?3";
    pub const GET_C_ID: &str =
        "SELECT O_C_ID FROM {0}.ORDERS WHERE O_ID = ?1 AND O_D_ID = ?2 AND O_W_ID = ?3";
    pub const UPDATE_ORDERS: &str = "UPDATE {0}.ORDERS SET O_CARRIER_ID = ?1 \
        WHERE O_ID = ?2 AND O_D_ID = ?3 AND O_W_ID = ?4";
    pub const UPDATE_ORDER_LINE: &str = "UPDATE {0}.ORDER_LINE SET OL_DELIVERY_D = ?1 \
        WHERE OL_O_ID = ?2 AND OL_D_ID = ?3 AND OL_W_ID = ?4";
    pub const SUM_OL_AMOUNT: &str = "SELECT SUM(OL_AMOUNT) FROM {0}.ORDER_LINE \
        WHERE OL_O_ID = ?1 AND OL_D_ID = ?2 AND OL_W_ID = ?3";
    pub const UPDATE_CUSTOMER: &str = "UPDATE {0}.CUSTOMER \
        SET C_BALANCE = C_BALANCE + ?1, C_DELIVERY_CNT = C_DELIVERY_CNT + 1 \
        WHERE C_ID = ?2 AND C_D_ID = ?3 AND C_W_ID = ?4";
}

pub mod new_order {
    pub const GET_WAREHOUSE_TAX_RATE: &str = "SELECT W_TAX FROM {0}.WAREHOUSE WHERE W_ID = ?1";
    pub const GET_DISTRICT: &str =
        "SELECT D_TAX, D_NEXT_O_ID FROM {0}.DISTRICT WHERE D_ID = ?1 AND D_W_ID = ?2";
    pub const INCREMENT_NEXT_ORDER_ID: &str =
        "UPDATE {0}.DISTRICT SET D_NEXT_O_ID = ?1 WHERE D_ID = ?2 AND D_W_ID = ?3";
    pub const GET_CUSTOMER: &str = "SELECT C_DISCOUNT, C_LAST, C_CREDIT FROM {0}.CUSTOMER \
        WHERE C_W_ID = ?1 AND C_D_ID = ?2 AND C_ID = ?3";
    pub const CREATE_ORDER: &str = "INSERT INTO {0}.ORDERS \
        (O_ID, O_D_ID, O_W_ID, O_C_ID, O_ENTRY_D, O_CARRIER_ID, O_OL_CNT, O_ALL_LOCAL) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
    pub const CREATE_NEW_ORDER: &str =
        "INSERT INTO {0}.NEW_ORDER (NO_O_ID, NO_D_ID, NO_W_ID) VALUES (?1, ?2, ?3)";
    pub const GET_ITEM_INFO: &str = "SELECT I_PRICE, I_NAME, I_DATA FROM {0}.ITEM WHERE I_ID = ?1";
    /// `{dist}` is replaced by a column from [`super::stock_dist_column`].
    pub const GET_STOCK_INFO: &str = "SELECT S_QUANTITY, S_DATA, S_YTD, S_ORDER_CNT, \
        S_REMOTE_CNT, {dist} FROM {0}.STOCK WHERE S_I_ID = ?1 AND S_W_ID = ?2";
    pub const UPDATE_STOCK: &str = "UPDATE {0}.STOCK \
        SET S_QUANTITY = ?1, S_YTD = ?2, S_ORDER_CNT = ?3, S_REMOTE_CNT = ?4 \
        WHERE S_I_ID = ?5 AND S_W_ID = ?6";
    pub const CREATE_ORDER_LINE: &str = "INSERT INTO {0}.ORDER_LINE \
        (OL_O_ID, OL_D_ID, OL_W_ID, OL_NUMBER, OL_I_ID, OL_SUPPLY_W_ID, OL_DELIVERY_D, \
        OL_QUANTITY, OL_AMOUNT, OL_DIST_INFO) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
}

pub mod order_status {
    pub const GET_CUSTOMER_BY_ID: &str = "SELECT C_ID, C_FIRST, C_MIDDLE, C_LAST, C_BALANCE \
        FROM {0}.CUSTOMER WHERE C_W_ID = ?1 AND C_D_ID = ?2 AND C_ID = ?3";
    pub const GET_CUSTOMERS_BY_LAST_NAME: &str = "SELECT C_ID, C_FIRST, C_MIDDLE, C_LAST, \
        C_BALANCE FROM {0}.CUSTOMER WHERE C_W_ID = ?1 AND C_D_ID = ?2 AND C_LAST = ?3 \
        ORDER BY C_FIRST";
    pub const GET_LAST_ORDER: &str = "SELECT O_ID, O_CARRIER_ID, O_ENTRY_D FROM {0}.ORDERS \
        WHERE O_W_ID = ?1 AND O_D_ID = ?2 AND O_C_ID = ?3 ORDER BY O_ID DESC LIMIT 1";
    pub const GET_ORDER_LINES: &str = "SELECT OL_SUPPLY_W_ID, OL_I_ID, OL_QUANTITY, \
        OL_AMOUNT, OL_DELIVERY_D FROM {0}.ORDER_LINE \
        WHERE OL_W_ID = ?1 AND OL_D_ID = ?2 AND OL_O_ID = ?3";
}

pub mod payment {
    pub const GET_WAREHOUSE: &str = "SELECT W_NAME, W_STREET_1, W_STREET_2, W_CITY, \
        W_STATE, W_ZIP FROM {0}.WAREHOUSE WHERE W_ID = ?1";
    pub const UPDATE_WAREHOUSE_BALANCE: &str =
        "UPDATE {0}.WAREHOUSE SET W_YTD = W_YTD + ?1 WHERE W_ID = ?2";
    pub const GET_DISTRICT: &str = "SELECT D_NAME, D_STREET_1, D_STREET_2, D_CITY, \
        D_STATE, D_ZIP FROM {0}.DISTRICT WHERE D_W_ID = ?1 AND D_ID = ?2";
    pub const UPDATE_DISTRICT_BALANCE: &str =
        "UPDATE {0}.DISTRICT SET D_YTD = D_YTD + ?1 WHERE D_W_ID = ?2 AND D_ID = ?3";
    pub const GET_CUSTOMER_BY_ID: &str = "SELECT C_ID, C_FIRST, C_MIDDLE, C_LAST, \
        C_STREET_1, C_STREET_2, C_CITY, C_STATE, C_ZIP, C_PHONE, C_SINCE, C_CREDIT, \
        C_CREDIT_LIM, C_DISCOUNT, C_BALANCE, C_YTD_PAYMENT, C_PAYMENT_CNT, C_DATA \
        FROM {0}.CUSTOMER WHERE C_W_ID = ?1 AND C_D_ID = ?2 AND C_ID = ?3";
    pub const GET_CUSTOMERS_BY_LAST_NAME: &str = "SELECT C_ID, C_FIRST, C_MIDDLE, C_LAST, \
        C_STREET_1, C_STREET_2, C_CITY, C_STATE, C_ZIP, C_PHONE, C_SINCE, C_CREDIT, \
        C_CREDIT_LIM, C_DISCOUNT, C_BALANCE, C_YTD_PAYMENT, C_PAYMENT_CNT, C_DATA \
        FROM {0}.CUSTOMER WHERE C_W_ID = ?1 AND C_D_ID = ?2 AND C_LAST = ?3 \
        ORDER BY C_FIRST";
    pub const UPDATE_BC_CUSTOMER: &str = "UPDATE {0}.CUSTOMER \
        SET C_BALANCE = ?1, C_YTD_PAYMENT = ?2, C_PAYMENT_CNT = ?3, C_DATA = ?4 \
        WHERE C_W_ID = ?5 AND C_D_ID = ?6 AND C_ID = ?7";
    pub const UPDATE_GC_CUSTOMER: &str = "UPDATE {0}.CUSTOMER \
        SET C_BALANCE = ?1, C_YTD_PAYMENT = ?2, C_PAYMENT_CNT = ?3 \
        WHERE C_W_ID = ?4 AND C_D_ID = ?5 AND C_ID = ?6";
    pub const INSERT_HISTORY: &str = "INSERT INTO {0}.HISTORY \
        (H_C_ID, H_C_D_ID, H_C_W_ID, H_D_ID, H_W_ID, H_DATE, H_AMOUNT, H_DATA) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
}

pub mod stock_level {
    pub const GET_O_ID: &str =
        "SELECT D_NEXT_O_ID FROM {0}.DISTRICT WHERE D_W_ID = ?1 AND D_ID = ?2";
    /// `{0}` holds the order lines, `{1}` the stock.
    pub const GET_STOCK_COUNT: &str = "SELECT COUNT(DISTINCT(OL_I_ID)) \
        FROM {0}.ORDER_LINE, {1}.STOCK \
        WHERE OL_W_ID = ?1 AND OL_D_ID = ?2 AND OL_O_ID < ?3 AND OL_O_ID >= ?4 \
        AND S_W_ID = ?5 AND S_I_ID = OL_I_ID AND S_QUANTITY < ?6";
}
