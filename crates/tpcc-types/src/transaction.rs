//! Transaction types, their parameter bundles and their results.

use crate::values::Row;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The five TPC-C transaction types.
///
/// Ordering follows the display names so that results tables come out
/// sorted by transaction name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Delivery,
    NewOrder,
    OrderStatus,
    Payment,
    StockLevel,
}

impl TransactionType {
    /// All transaction types, sorted by name.
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Delivery,
        TransactionType::NewOrder,
        TransactionType::OrderStatus,
        TransactionType::Payment,
        TransactionType::StockLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Delivery => "DELIVERY",
            TransactionType::NewOrder => "NEW_ORDER",
            TransactionType::OrderStatus => "ORDER_STATUS",
            TransactionType::Payment => "PAYMENT",
            TransactionType::StockLevel => "STOCK_LEVEL",
        }
    }

    /// Order-Status and Stock-Level only read.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            TransactionType::OrderStatus | TransactionType::StockLevel
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown transaction type: {s}"))
    }
}

/// How Payment and Order-Status identify the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerSelector {
    ById(i64),
    ByLastName(String),
}

/// One requested order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub i_id: i64,
    pub supply_w_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderParams {
    pub w_id: i64,
    pub d_id: i64,
    pub c_id: i64,
    pub o_entry_d: NaiveDateTime,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrderParams {
    /// Whether every line is supplied by the home warehouse.
    pub fn all_local(&self) -> bool {
        self.lines.iter().all(|line| line.supply_w_id == self.w_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentParams {
    pub w_id: i64,
    pub d_id: i64,
    pub h_amount: f64,
    pub c_w_id: i64,
    pub c_d_id: i64,
    pub customer: CustomerSelector,
    pub h_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusParams {
    pub w_id: i64,
    pub d_id: i64,
    pub customer: CustomerSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryParams {
    pub w_id: i64,
    pub o_carrier_id: i64,
    pub ol_delivery_d: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevelParams {
    pub w_id: i64,
    pub d_id: i64,
    pub threshold: i64,
}

/// Parameters for one transaction invocation. Created per invocation and
/// consumed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionParams {
    Delivery(DeliveryParams),
    NewOrder(NewOrderParams),
    OrderStatus(OrderStatusParams),
    Payment(PaymentParams),
    StockLevel(StockLevelParams),
}

impl TransactionParams {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionParams::Delivery(_) => TransactionType::Delivery,
            TransactionParams::NewOrder(_) => TransactionType::NewOrder,
            TransactionParams::OrderStatus(_) => TransactionType::OrderStatus,
            TransactionParams::Payment(_) => TransactionType::Payment,
            TransactionParams::StockLevel(_) => TransactionType::StockLevel,
        }
    }

    /// Home warehouse of the transaction.
    pub fn w_id(&self) -> i64 {
        match self {
            TransactionParams::Delivery(p) => p.w_id,
            TransactionParams::NewOrder(p) => p.w_id,
            TransactionParams::OrderStatus(p) => p.w_id,
            TransactionParams::Payment(p) => p.w_id,
            TransactionParams::StockLevel(p) => p.w_id,
        }
    }

    /// Every warehouse id this transaction touches.
    pub fn partitions(&self) -> BTreeSet<i64> {
        let mut partitions = BTreeSet::from([self.w_id()]);
        match self {
            TransactionParams::NewOrder(p) => {
                partitions.extend(p.lines.iter().map(|line| line.supply_w_id));
            }
            TransactionParams::Payment(p) => {
                partitions.insert(p.c_w_id);
            }
            _ => {}
        }
        partitions
    }
}

/// Display data for one line of a committed New-Order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderLineResult {
    pub supply_w_id: i64,
    pub i_id: i64,
    pub i_name: String,
    pub quantity: i64,
    pub s_quantity: i64,
    pub brand_generic: char,
    pub i_price: f64,
    pub ol_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderResult {
    /// `C_DISCOUNT, C_LAST, C_CREDIT`
    pub customer: Row,
    pub w_tax: f64,
    pub d_tax: f64,
    pub o_id: i64,
    pub total: f64,
    pub lines: Vec<NewOrderLineResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub warehouse: Row,
    pub district: Row,
    pub customer: Row,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusResult {
    pub customer: Row,
    pub order: Option<Row>,
    pub lines: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredOrder {
    pub d_id: i64,
    pub o_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub delivered: Vec<DeliveredOrder>,
    /// Districts that had no undelivered order.
    pub skipped: Vec<i64>,
}

/// What a backend hands back for each transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionResult {
    Delivery(DeliveryResult),
    /// `None` when the order referenced an unused item and was rolled back.
    NewOrder(Option<NewOrderResult>),
    OrderStatus(OrderStatusResult),
    Payment(PaymentResult),
    StockLevel(i64),
}

impl TransactionResult {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionResult::Delivery(_) => TransactionType::Delivery,
            TransactionResult::NewOrder(_) => TransactionType::NewOrder,
            TransactionResult::OrderStatus(_) => TransactionType::OrderStatus,
            TransactionResult::Payment(_) => TransactionType::Payment,
            TransactionResult::StockLevel(_) => TransactionType::StockLevel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_transaction_type_names() {
        assert_eq!(TransactionType::NewOrder.to_string(), "NEW_ORDER");
        assert_eq!(
            serde_json::to_string(&TransactionType::StockLevel).unwrap(),
            "\"STOCK_LEVEL\""
        );
        assert_eq!(
            "order_status".parse::<TransactionType>().unwrap(),
            TransactionType::OrderStatus
        );
        assert!("REFUND".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_all_is_sorted_by_name() {
        let mut names: Vec<_> = TransactionType::ALL.iter().map(|t| t.as_str()).collect();
        let original = names.clone();
        names.sort();
        assert_eq!(names, original);

        let mut types = TransactionType::ALL.to_vec();
        types.sort();
        assert_eq!(types, TransactionType::ALL.to_vec());
    }

    #[test]
    fn test_new_order_partitions_include_remote_suppliers() {
        let params = TransactionParams::NewOrder(NewOrderParams {
            w_id: 2,
            d_id: 1,
            c_id: 1,
            o_entry_d: timestamp(),
            lines: vec![
                NewOrderLine {
                    i_id: 1,
                    supply_w_id: 2,
                    quantity: 1,
                },
                NewOrderLine {
                    i_id: 2,
                    supply_w_id: 4,
                    quantity: 1,
                },
            ],
        });
        assert_eq!(params.partitions(), BTreeSet::from([2, 4]));
        assert_eq!(params.transaction_type(), TransactionType::NewOrder);
    }

    #[test]
    fn test_payment_partitions_include_customer_warehouse() {
        let params = TransactionParams::Payment(PaymentParams {
            w_id: 1,
            d_id: 3,
            h_amount: 10.5,
            c_w_id: 3,
            c_d_id: 7,
            customer: CustomerSelector::ById(42),
            h_date: timestamp(),
        });
        assert_eq!(params.partitions(), BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_single_partition_transactions() {
        let params = TransactionParams::StockLevel(StockLevelParams {
            w_id: 5,
            d_id: 1,
            threshold: 15,
        });
        assert_eq!(params.partitions(), BTreeSet::from([5]));
    }

    #[test]
    fn test_all_local() {
        let mut params = NewOrderParams {
            w_id: 1,
            d_id: 1,
            c_id: 1,
            o_entry_d: timestamp(),
            lines: vec![NewOrderLine {
                i_id: 1,
                supply_w_id: 1,
                quantity: 3,
            }],
        };
        assert!(params.all_local());
        params.lines.push(NewOrderLine {
            i_id: 2,
            supply_w_id: 2,
            quantity: 3,
        });
        assert!(!params.all_local());
    }
}
