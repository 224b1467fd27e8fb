//! Per-transaction parameter synthesis.

use crate::random::RandomSource;
use chrono::{Local, NaiveDateTime};
use tpcc_types::constants::{
    MAX_CARRIER_ID, MAX_OL_CNT, MAX_OL_QUANTITY, MAX_PAYMENT, MAX_STOCK_LEVEL_THRESHOLD,
    MIN_CARRIER_ID, MIN_OL_CNT, MIN_PAYMENT, MIN_STOCK_LEVEL_THRESHOLD,
};
use tpcc_types::{
    CustomerSelector, DeliveryParams, NewOrderLine, NewOrderParams, OrderStatusParams,
    PaymentParams, ScaleParameters, StockLevelParams, TransactionParams, TransactionType,
};

/// Generates parameters for each transaction type from the scale parameters
/// and a worker-local random source.
pub struct ParameterGenerator {
    scale: ScaleParameters,
    random: RandomSource,
}

impl ParameterGenerator {
    pub fn new(scale: ScaleParameters, random: RandomSource) -> Self {
        Self { scale, random }
    }

    pub fn scale(&self) -> &ScaleParameters {
        &self.scale
    }

    pub fn random(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    pub fn generate(&mut self, transaction: TransactionType) -> TransactionParams {
        match transaction {
            TransactionType::Delivery => TransactionParams::Delivery(self.delivery()),
            TransactionType::NewOrder => TransactionParams::NewOrder(self.new_order()),
            TransactionType::OrderStatus => TransactionParams::OrderStatus(self.order_status()),
            TransactionType::Payment => TransactionParams::Payment(self.payment()),
            TransactionType::StockLevel => TransactionParams::StockLevel(self.stock_level()),
        }
    }

    pub fn new_order(&mut self) -> NewOrderParams {
        let w_id = self.warehouse_id();
        let d_id = self.district_id();
        let c_id = self.customer_id();
        let ol_cnt = self.random.uniform(MIN_OL_CNT, MAX_OL_CNT);

        // 1% of orders reference an unused item on their last line
        let rollback = self.random.uniform(1, 100) == 1;

        let mut lines = Vec::with_capacity(ol_cnt as usize);
        for _ in 0..ol_cnt {
            let i_id = self.item_id();
            let remote = self.scale.warehouses > 1 && self.random.uniform(1, 100) == 1;
            let supply_w_id = if remote {
                self.random.uniform_excluding(
                    self.scale.starting_warehouse,
                    self.scale.ending_warehouse,
                    w_id,
                )
            } else {
                w_id
            };
            let quantity = self.random.uniform(1, MAX_OL_QUANTITY);
            lines.push(NewOrderLine {
                i_id,
                supply_w_id,
                quantity,
            });
        }

        if rollback {
            if let Some(last) = lines.last_mut() {
                last.i_id = self.scale.items + 1;
            }
        }

        NewOrderParams {
            w_id,
            d_id,
            c_id,
            o_entry_d: now(),
            lines,
        }
    }

    pub fn payment(&mut self) -> PaymentParams {
        let x = self.random.uniform(1, 100);
        let y = self.random.uniform(1, 100);

        let w_id = self.warehouse_id();
        let d_id = self.district_id();

        // 85%: paying through the home warehouse
        let (c_w_id, c_d_id) = if self.scale.warehouses == 1 || x <= 85 {
            (w_id, d_id)
        } else {
            let c_w_id = self.random.uniform_excluding(
                self.scale.starting_warehouse,
                self.scale.ending_warehouse,
                w_id,
            );
            assert_ne!(c_w_id, w_id);
            (c_w_id, self.district_id())
        };

        let customer = self.customer_selector(y);
        let h_amount = self.random.fixed_point(2, MIN_PAYMENT, MAX_PAYMENT);

        PaymentParams {
            w_id,
            d_id,
            h_amount,
            c_w_id,
            c_d_id,
            customer,
            h_date: now(),
        }
    }

    pub fn order_status(&mut self) -> OrderStatusParams {
        let w_id = self.warehouse_id();
        let d_id = self.district_id();
        let y = self.random.uniform(1, 100);
        let customer = self.customer_selector(y);

        OrderStatusParams {
            w_id,
            d_id,
            customer,
        }
    }

    pub fn delivery(&mut self) -> DeliveryParams {
        DeliveryParams {
            w_id: self.warehouse_id(),
            o_carrier_id: self.random.uniform(MIN_CARRIER_ID, MAX_CARRIER_ID),
            ol_delivery_d: now(),
        }
    }

    pub fn stock_level(&mut self) -> StockLevelParams {
        StockLevelParams {
            w_id: self.warehouse_id(),
            d_id: self.district_id(),
            threshold: self
                .random
                .uniform(MIN_STOCK_LEVEL_THRESHOLD, MAX_STOCK_LEVEL_THRESHOLD),
        }
    }

    // 60%: look the customer up by last name
    fn customer_selector(&mut self, y: i64) -> CustomerSelector {
        if y <= 60 {
            CustomerSelector::ByLastName(
                self.random
                    .skewed_last_name(self.scale.customers_per_district),
            )
        } else {
            CustomerSelector::ById(self.customer_id())
        }
    }

    fn warehouse_id(&mut self) -> i64 {
        let w_id = self
            .random
            .uniform(self.scale.starting_warehouse, self.scale.ending_warehouse);
        assert!(
            self.scale.contains_warehouse(w_id),
            "warehouse {w_id} outside the configured range"
        );
        w_id
    }

    fn district_id(&mut self) -> i64 {
        self.random.uniform(1, self.scale.districts_per_warehouse)
    }

    fn customer_id(&mut self) -> i64 {
        self.random.nurand(1023, 1, self.scale.customers_per_district)
    }

    fn item_id(&mut self) -> i64 {
        self.random.nurand(8191, 1, self.scale.items)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
