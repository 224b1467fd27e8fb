//! Scale parameters: table cardinalities derived from a scale factor.

use crate::constants::{
    CUSTOMERS_PER_DISTRICT, DISTRICTS_PER_WAREHOUSE, INITIAL_NEW_ORDERS_PER_DISTRICT, NUM_ITEMS,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for invalid scale inputs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScaleError {
    #[error("Number of warehouses must be at least 1, got {0}")]
    InvalidWarehouses(i64),

    #[error("Scale factor must be at least 1.0, got {0}")]
    InvalidScaleFactor(f64),

    #[error("Invalid cardinality for {name}: {value}")]
    InvalidCardinality { name: &'static str, value: i64 },
}

/// Table cardinalities for one benchmark run.
///
/// Immutable once derived and shared read-only by every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleParameters {
    pub items: i64,
    pub warehouses: i64,
    pub starting_warehouse: i64,
    pub ending_warehouse: i64,
    pub districts_per_warehouse: i64,
    pub customers_per_district: i64,
    pub new_orders_per_district: i64,
}

impl ScaleParameters {
    /// Build scale parameters from explicit cardinalities.
    ///
    /// Warehouses are numbered `starting_warehouse..=starting_warehouse + warehouses - 1`.
    pub fn new(
        items: i64,
        warehouses: i64,
        starting_warehouse: i64,
        districts_per_warehouse: i64,
        customers_per_district: i64,
        new_orders_per_district: i64,
    ) -> Result<Self, ScaleError> {
        if warehouses < 1 {
            return Err(ScaleError::InvalidWarehouses(warehouses));
        }
        for (name, value) in [
            ("items", items),
            ("starting_warehouse", starting_warehouse),
            ("districts_per_warehouse", districts_per_warehouse),
            ("customers_per_district", customers_per_district),
            ("new_orders_per_district", new_orders_per_district),
        ] {
            if value < 1 {
                return Err(ScaleError::InvalidCardinality { name, value });
            }
        }
        if new_orders_per_district > customers_per_district {
            return Err(ScaleError::InvalidCardinality {
                name: "new_orders_per_district",
                value: new_orders_per_district,
            });
        }

        Ok(Self {
            items,
            warehouses,
            starting_warehouse,
            ending_warehouse: starting_warehouse + warehouses - 1,
            districts_per_warehouse,
            customers_per_district,
            new_orders_per_district,
        })
    }

    /// Derive scale parameters the way the benchmark does: divide the
    /// per-warehouse cardinalities by the scale factor, never going below one.
    pub fn with_scale_factor(warehouses: i64, scale_factor: f64) -> Result<Self, ScaleError> {
        if warehouses < 1 {
            return Err(ScaleError::InvalidWarehouses(warehouses));
        }
        if !(scale_factor >= 1.0) {
            return Err(ScaleError::InvalidScaleFactor(scale_factor));
        }

        let scaled = |base: i64| ((base as f64 / scale_factor) as i64).max(1);

        Self::new(
            scaled(NUM_ITEMS),
            warehouses,
            1,
            DISTRICTS_PER_WAREHOUSE,
            scaled(CUSTOMERS_PER_DISTRICT),
            scaled(INITIAL_NEW_ORDERS_PER_DISTRICT),
        )
    }

    /// Whether `w_id` is one of the warehouses this run drives.
    pub fn contains_warehouse(&self, w_id: i64) -> bool {
        (self.starting_warehouse..=self.ending_warehouse).contains(&w_id)
    }

    /// Iterate over all warehouse ids in this run.
    pub fn warehouse_ids(&self) -> impl Iterator<Item = i64> {
        self.starting_warehouse..=self.ending_warehouse
    }
}

impl fmt::Display for ScaleParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} items", self.items)?;
        writeln!(
            f,
            "{} warehouses [{}..={}]",
            self.warehouses, self.starting_warehouse, self.ending_warehouse
        )?;
        writeln!(f, "{} districts / warehouse", self.districts_per_warehouse)?;
        writeln!(f, "{} customers / district", self.customers_per_district)?;
        write!(f, "{} initial new orders / district", self.new_orders_per_district)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_one() {
        let scale = ScaleParameters::with_scale_factor(4, 1.0).unwrap();
        assert_eq!(scale.items, 100_000);
        assert_eq!(scale.warehouses, 4);
        assert_eq!(scale.starting_warehouse, 1);
        assert_eq!(scale.ending_warehouse, 4);
        assert_eq!(scale.districts_per_warehouse, 10);
        assert_eq!(scale.customers_per_district, 3_000);
        assert_eq!(scale.new_orders_per_district, 900);
    }

    #[test]
    fn test_scale_factor_divides_cardinalities() {
        let scale = ScaleParameters::with_scale_factor(1, 100.0).unwrap();
        assert_eq!(scale.items, 1_000);
        assert_eq!(scale.customers_per_district, 30);
        assert_eq!(scale.new_orders_per_district, 9);
        // Districts are not scaled
        assert_eq!(scale.districts_per_warehouse, 10);
    }

    #[test]
    fn test_huge_scale_factor_clamps_to_one() {
        let scale = ScaleParameters::with_scale_factor(1, 1_000_000.0).unwrap();
        assert_eq!(scale.items, 1);
        assert_eq!(scale.customers_per_district, 1);
        assert_eq!(scale.new_orders_per_district, 1);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            ScaleParameters::with_scale_factor(0, 1.0),
            Err(ScaleError::InvalidWarehouses(0))
        );
        assert!(matches!(
            ScaleParameters::with_scale_factor(1, 0.5),
            Err(ScaleError::InvalidScaleFactor(_))
        ));
        assert!(matches!(
            ScaleParameters::with_scale_factor(1, f64::NAN),
            Err(ScaleError::InvalidScaleFactor(_))
        ));
        assert!(matches!(
            ScaleParameters::new(10, 1, 1, 10, 5, 6),
            Err(ScaleError::InvalidCardinality { .. })
        ));
    }

    #[test]
    fn test_contains_warehouse() {
        let scale = ScaleParameters::new(100, 3, 5, 10, 30, 9).unwrap();
        assert_eq!(scale.ending_warehouse, 7);
        assert!(!scale.contains_warehouse(4));
        assert!(scale.contains_warehouse(5));
        assert!(scale.contains_warehouse(7));
        assert!(!scale.contains_warehouse(8));
        assert_eq!(scale.warehouse_ids().collect::<Vec<_>>(), vec![5, 6, 7]);
    }
}
