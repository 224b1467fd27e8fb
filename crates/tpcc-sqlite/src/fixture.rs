//! Small deterministic TPC-C dataset for tests.
//!
//! Creates the nine tables in one partition file per warehouse. Values are
//! derived from ids rather than drawn at random so tests can reason about
//! them: every tenth customer has bad credit, each customer has exactly one
//! order with five lines, and the newest `new_orders_per_district` orders of
//! each district are still undelivered.

use crate::error::SqliteError;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tpcc_generator::make_last_name;
use tpcc_types::constants::{BAD_CREDIT, GOOD_CREDIT, NULL_CARRIER_ID};
use tpcc_types::ScaleParameters;
use tracing::debug;

/// Order lines per loaded order.
pub const LINES_PER_ORDER: i64 = 5;

/// Entry date of every loaded order.
pub const LOAD_TIMESTAMP: &str = "2024-01-01 00:00:00.000000";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS WAREHOUSE (
  W_ID SMALLINT DEFAULT '0' NOT NULL,
  W_NAME VARCHAR(16) DEFAULT NULL,
  W_STREET_1 VARCHAR(32) DEFAULT NULL,
  W_STREET_2 VARCHAR(32) DEFAULT NULL,
  W_CITY VARCHAR(32) DEFAULT NULL,
  W_STATE VARCHAR(2) DEFAULT NULL,
  W_ZIP VARCHAR(9) DEFAULT NULL,
  W_TAX FLOAT DEFAULT NULL,
  W_YTD FLOAT DEFAULT NULL,
  CONSTRAINT W_PK_ARRAY PRIMARY KEY (W_ID)
);
CREATE TABLE IF NOT EXISTS DISTRICT (
  D_ID TINYINT DEFAULT '0' NOT NULL,
  D_W_ID SMALLINT DEFAULT '0' NOT NULL,
  D_NAME VARCHAR(16) DEFAULT NULL,
  D_STREET_1 VARCHAR(32) DEFAULT NULL,
  D_STREET_2 VARCHAR(32) DEFAULT NULL,
  D_CITY VARCHAR(32) DEFAULT NULL,
  D_STATE VARCHAR(2) DEFAULT NULL,
  D_ZIP VARCHAR(9) DEFAULT NULL,
  D_TAX FLOAT DEFAULT NULL,
  D_YTD FLOAT DEFAULT NULL,
  D_NEXT_O_ID INT DEFAULT NULL,
  PRIMARY KEY (D_W_ID,D_ID)
);
CREATE TABLE IF NOT EXISTS ITEM (
  I_ID INTEGER DEFAULT '0' NOT NULL,
  I_IM_ID INTEGER DEFAULT NULL,
  I_NAME VARCHAR(32) DEFAULT NULL,
  I_PRICE FLOAT DEFAULT NULL,
  I_DATA VARCHAR(64) DEFAULT NULL,
  CONSTRAINT I_PK_ARRAY PRIMARY KEY (I_ID)
);
CREATE TABLE IF NOT EXISTS CUSTOMER (
  C_ID INTEGER DEFAULT '0' NOT NULL,
  C_D_ID TINYINT DEFAULT '0' NOT NULL,
  C_W_ID SMALLINT DEFAULT '0' NOT NULL,
  C_FIRST VARCHAR(32) DEFAULT NULL,
  C_MIDDLE VARCHAR(2) DEFAULT NULL,
  C_LAST VARCHAR(32) DEFAULT NULL,
  C_STREET_1 VARCHAR(32) DEFAULT NULL,
  C_STREET_2 VARCHAR(32) DEFAULT NULL,
  C_CITY VARCHAR(32) DEFAULT NULL,
  C_STATE VARCHAR(2) DEFAULT NULL,
  C_ZIP VARCHAR(9) DEFAULT NULL,
  C_PHONE VARCHAR(32) DEFAULT NULL,
  C_SINCE TIMESTAMP DEFAULT NULL,
  C_CREDIT VARCHAR(2) DEFAULT NULL,
  C_CREDIT_LIM FLOAT DEFAULT NULL,
  C_DISCOUNT FLOAT DEFAULT NULL,
  C_BALANCE FLOAT DEFAULT NULL,
  C_YTD_PAYMENT FLOAT DEFAULT NULL,
  C_PAYMENT_CNT INTEGER DEFAULT NULL,
  C_DELIVERY_CNT INTEGER DEFAULT NULL,
  C_DATA VARCHAR(500),
  PRIMARY KEY (C_W_ID,C_D_ID,C_ID)
);
CREATE INDEX IF NOT EXISTS IDX_CUSTOMER_NAME ON CUSTOMER (C_W_ID,C_D_ID,C_LAST);
CREATE TABLE IF NOT EXISTS HISTORY (
  H_C_ID INTEGER DEFAULT NULL,
  H_C_D_ID TINYINT DEFAULT NULL,
  H_C_W_ID SMALLINT DEFAULT NULL,
  H_D_ID TINYINT DEFAULT NULL,
  H_W_ID SMALLINT DEFAULT '0' NOT NULL,
  H_DATE TIMESTAMP DEFAULT NULL,
  H_AMOUNT FLOAT DEFAULT NULL,
  H_DATA VARCHAR(32) DEFAULT NULL
);
CREATE TABLE IF NOT EXISTS STOCK (
  S_I_ID INTEGER DEFAULT '0' NOT NULL,
  S_W_ID SMALLINT DEFAULT '0 ' NOT NULL,
  S_QUANTITY INTEGER DEFAULT '0' NOT NULL,
  S_DIST_01 VARCHAR(32) DEFAULT NULL,
  S_DIST_02 VARCHAR(32) DEFAULT NULL,
  S_DIST_03 VARCHAR(32) DEFAULT NULL,
  S_DIST_04 VARCHAR(32) DEFAULT NULL,
  S_DIST_05 VARCHAR(32) DEFAULT NULL,
  S_DIST_06 VARCHAR(32) DEFAULT NULL,
  S_DIST_07 VARCHAR(32) DEFAULT NULL,
  S_DIST_08 VARCHAR(32) DEFAULT NULL,
  S_DIST_09 VARCHAR(32) DEFAULT NULL,
  S_DIST_10 VARCHAR(32) DEFAULT NULL,
  S_YTD INTEGER DEFAULT NULL,
  S_ORDER_CNT INTEGER DEFAULT NULL,
  S_REMOTE_CNT INTEGER DEFAULT NULL,
  S_DATA VARCHAR(64) DEFAULT NULL,
  PRIMARY KEY (S_W_ID,S_I_ID)
);
CREATE TABLE IF NOT EXISTS ORDERS (
  O_ID INTEGER DEFAULT '0' NOT NULL,
  O_C_ID INTEGER DEFAULT NULL,
  O_D_ID TINYINT DEFAULT '0' NOT NULL,
  O_W_ID SMALLINT DEFAULT '0' NOT NULL,
  O_ENTRY_D TIMESTAMP DEFAULT NULL,
  O_CARRIER_ID INTEGER DEFAULT NULL,
  O_OL_CNT INTEGER DEFAULT NULL,
  O_ALL_LOCAL INTEGER DEFAULT NULL,
  PRIMARY KEY (O_W_ID,O_D_ID,O_ID)
);
CREATE INDEX IF NOT EXISTS IDX_ORDERS ON ORDERS (O_W_ID,O_D_ID,O_C_ID);
CREATE TABLE IF NOT EXISTS NEW_ORDER (
  NO_O_ID INTEGER DEFAULT '0' NOT NULL,
  NO_D_ID TINYINT DEFAULT '0' NOT NULL,
  NO_W_ID SMALLINT DEFAULT '0' NOT NULL,
  CONSTRAINT NO_PK_TREE PRIMARY KEY (NO_D_ID,NO_W_ID,NO_O_ID)
);
CREATE TABLE IF NOT EXISTS ORDER_LINE (
  OL_O_ID INTEGER DEFAULT '0' NOT NULL,
  OL_D_ID TINYINT DEFAULT '0' NOT NULL,
  OL_W_ID SMALLINT DEFAULT '0' NOT NULL,
  OL_NUMBER INTEGER DEFAULT '0' NOT NULL,
  OL_I_ID INTEGER DEFAULT NULL,
  OL_SUPPLY_W_ID SMALLINT DEFAULT NULL,
  OL_DELIVERY_D TIMESTAMP DEFAULT NULL,
  OL_QUANTITY INTEGER DEFAULT NULL,
  OL_AMOUNT FLOAT DEFAULT NULL,
  OL_DIST_INFO VARCHAR(32) DEFAULT NULL,
  PRIMARY KEY (OL_W_ID,OL_D_ID,OL_O_ID,OL_NUMBER)
);
";

/// Whether order `o_id` is still undelivered after the load.
pub fn is_undelivered(o_id: i64, scale: &ScaleParameters) -> bool {
    o_id > scale.customers_per_district - scale.new_orders_per_district
}

/// Item id of line `ol_number` of order `o_id`.
pub fn order_line_item(o_id: i64, ol_number: i64, scale: &ScaleParameters) -> i64 {
    ((o_id * LINES_PER_ORDER + ol_number) % scale.items) + 1
}

/// Price of item `i_id`.
pub fn item_price(i_id: i64) -> f64 {
    1.0 + (i_id % 100) as f64
}

/// Initial stock quantity of item `i_id`, always within `[10, 100]`.
pub fn stock_quantity(i_id: i64) -> i64 {
    10 + (i_id % 91)
}

/// Create and load one partition file.
pub fn create_partition(
    path: impl AsRef<Path>,
    w_id: i64,
    scale: &ScaleParameters,
) -> Result<(), SqliteError> {
    let mut conn = Connection::open(path.as_ref())?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    load_items(&tx, scale)?;
    load_warehouse(&tx, w_id, scale)?;
    load_stock(&tx, w_id, scale)?;
    for d_id in 1..=scale.districts_per_warehouse {
        load_district(&tx, w_id, d_id, scale)?;
    }
    tx.commit()?;

    debug!("Loaded warehouse {w_id} into {}", path.as_ref().display());
    Ok(())
}

/// Create every partition of `scale` under `dir` and return the path
/// template addressing them.
pub fn create_partitions(dir: &Path, scale: &ScaleParameters) -> Result<String, SqliteError> {
    for w_id in scale.warehouse_ids() {
        create_partition(partition_path(dir, w_id), w_id, scale)?;
    }
    let template = dir.join("tpcc-{w_id}.db");
    template
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| SqliteError::Config(format!("non UTF-8 path {}", template.display())))
}

pub fn partition_path(dir: &Path, w_id: i64) -> PathBuf {
    dir.join(format!("tpcc-{w_id}.db"))
}

fn load_items(tx: &Connection, scale: &ScaleParameters) -> Result<(), SqliteError> {
    let mut stmt = tx.prepare("INSERT INTO ITEM VALUES (?1, ?2, ?3, ?4, ?5)")?;
    for i_id in 1..=scale.items {
        let data = if i_id % 10 == 0 {
            "item ORIGINAL data"
        } else {
            "item data"
        };
        stmt.execute(params![
            i_id,
            i_id,
            format!("item-{i_id}"),
            item_price(i_id),
            data
        ])?;
    }
    Ok(())
}

fn load_warehouse(tx: &Connection, w_id: i64, scale: &ScaleParameters) -> Result<(), SqliteError> {
    let ytd = 30_000.0 * scale.districts_per_warehouse as f64;
    tx.execute(
        "INSERT INTO WAREHOUSE VALUES (?1, ?2, 'street 1', 'street 2', 'city', 'ST', '123456789', 0.1, ?3)",
        params![w_id, format!("W{w_id}"), ytd],
    )?;
    Ok(())
}

fn load_stock(tx: &Connection, w_id: i64, scale: &ScaleParameters) -> Result<(), SqliteError> {
    let mut stmt = tx.prepare(
        "INSERT INTO STOCK VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, 0, 0, ?14)",
    )?;
    for i_id in 1..=scale.items {
        let dist: Vec<String> = (1..=10).map(|d| format!("dist-{d:02}-{i_id}")).collect();
        let data = if i_id % 7 == 0 {
            "stock ORIGINAL data"
        } else {
            "stock data"
        };
        stmt.execute(params![
            i_id,
            w_id,
            stock_quantity(i_id),
            dist[0],
            dist[1],
            dist[2],
            dist[3],
            dist[4],
            dist[5],
            dist[6],
            dist[7],
            dist[8],
            dist[9],
            data
        ])?;
    }
    Ok(())
}

fn load_district(
    tx: &Connection,
    w_id: i64,
    d_id: i64,
    scale: &ScaleParameters,
) -> Result<(), SqliteError> {
    let customers = scale.customers_per_district;
    tx.execute(
        "INSERT INTO DISTRICT VALUES (?1, ?2, ?3, 'street 1', 'street 2', 'city', 'ST', '123456789', 0.05, 30000.0, ?4)",
        params![d_id, w_id, format!("D{d_id}"), customers + 1],
    )?;

    let mut customer = tx.prepare(
        "INSERT INTO CUSTOMER VALUES (?1, ?2, ?3, ?4, 'OE', ?5, 'street 1', 'street 2', 'city', 'ST', '123456789', '5551234', ?6, ?7, 50000.0, 0.1, -10.0, 10.0, 1, 0, 'customer data')",
    )?;
    let mut history = tx.prepare("INSERT INTO HISTORY VALUES (?1, ?2, ?3, ?2, ?3, ?4, 10.0, 'initial')")?;
    let mut order = tx.prepare("INSERT INTO ORDERS VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)")?;
    let mut new_order = tx.prepare("INSERT INTO NEW_ORDER VALUES (?1, ?2, ?3)")?;
    let mut order_line =
        tx.prepare("INSERT INTO ORDER_LINE VALUES (?1, ?2, ?3, ?4, ?5, ?3, ?6, 5, ?7, ?8)")?;

    for c_id in 1..=customers {
        let credit = if c_id % 10 == 0 { BAD_CREDIT } else { GOOD_CREDIT };
        customer.execute(params![
            c_id,
            d_id,
            w_id,
            format!("first-{c_id:05}"),
            make_last_name((c_id - 1) % 1000),
            LOAD_TIMESTAMP,
            credit
        ])?;
        history.execute(params![c_id, d_id, w_id, LOAD_TIMESTAMP])?;
    }

    // One order per customer, o_id == c_id
    for o_id in 1..=customers {
        let undelivered = is_undelivered(o_id, scale);
        let carrier = if undelivered {
            NULL_CARRIER_ID
        } else {
            (o_id % 10) + 1
        };
        order.execute(params![
            o_id,
            o_id,
            d_id,
            w_id,
            LOAD_TIMESTAMP,
            carrier,
            LINES_PER_ORDER
        ])?;
        if undelivered {
            new_order.execute(params![o_id, d_id, w_id])?;
        }

        let delivery_d = (!undelivered).then_some(LOAD_TIMESTAMP);
        for ol_number in 1..=LINES_PER_ORDER {
            let i_id = order_line_item(o_id, ol_number, scale);
            order_line.execute(params![
                o_id,
                d_id,
                w_id,
                ol_number,
                i_id,
                delivery_d,
                item_price(i_id) * 5.0,
                format!("dist-{d_id:02}-{i_id}")
            ])?;
        }
    }
    Ok(())
}
