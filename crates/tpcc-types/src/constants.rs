//! Constants fixed by the TPC-C specification.
//!
//! These are not knobs. Scaled cardinalities live in [`crate::ScaleParameters`].

/// Number of items at scale factor 1.
pub const NUM_ITEMS: i64 = 100_000;
/// Districts per warehouse.
pub const DISTRICTS_PER_WAREHOUSE: i64 = 10;
/// Customers per district at scale factor 1.
pub const CUSTOMERS_PER_DISTRICT: i64 = 3_000;
/// Undelivered orders per district after the initial load.
pub const INITIAL_NEW_ORDERS_PER_DISTRICT: i64 = 900;

pub const MIN_OL_CNT: i64 = 5;
pub const MAX_OL_CNT: i64 = 15;
pub const MAX_OL_QUANTITY: i64 = 10;

pub const MIN_CARRIER_ID: i64 = 1;
pub const MAX_CARRIER_ID: i64 = 10;
/// Carrier id stored on orders that have not been delivered yet.
pub const NULL_CARRIER_ID: i64 = 0;

pub const MIN_PAYMENT: f64 = 1.0;
pub const MAX_PAYMENT: f64 = 5_000.0;

pub const MIN_STOCK_LEVEL_THRESHOLD: i64 = 10;
pub const MAX_STOCK_LEVEL_THRESHOLD: i64 = 20;

/// Number of most recent orders inspected by Stock-Level.
pub const STOCK_LEVEL_ORDERS: i64 = 20;

/// Credit flag marking a customer with bad credit.
pub const BAD_CREDIT: &str = "BC";
/// Credit flag marking a customer with good credit.
pub const GOOD_CREDIT: &str = "GC";

/// Maximum length of `C_DATA`.
pub const MAX_C_DATA: usize = 500;

/// Marker looked for in `I_DATA` and `S_DATA` to decide brand vs generic.
pub const ORIGINAL_STRING: &str = "ORIGINAL";

/// Separator between warehouse and district names in `H_DATA`.
pub const HISTORY_DATA_SEPARATOR: &str = "    ";
