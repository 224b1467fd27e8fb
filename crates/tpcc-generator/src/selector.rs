//! Weighted transaction selection.

use rand::Rng;
use std::collections::BTreeMap;
use tpcc_types::TransactionType;

/// Error type for invalid transaction mixes.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MixError {
    #[error("Transaction mix is empty")]
    Empty,

    #[error("Transaction mix has a total weight of zero")]
    ZeroTotal,

    #[error("Read fraction must be within [0, 1], got {0}")]
    InvalidReadFraction(f64),
}

/// Weights scaled by the read or write share in [`TransactionMix::read_fraction`].
const READ_FRACTION_BASE: [(TransactionType, f64); 5] = [
    (TransactionType::StockLevel, 500.0),
    (TransactionType::Delivery, 44.0),
    (TransactionType::OrderStatus, 500.0),
    (TransactionType::Payment, 467.0),
    (TransactionType::NewOrder, 489.0),
];

/// Ordered list of transaction types with cumulative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMix {
    entries: Vec<(TransactionType, u32)>,
    cumulative: Vec<u64>,
    total: u64,
}

impl TransactionMix {
    /// Build a mix from `(type, weight)` pairs. Order is preserved; zero
    /// weights are allowed and never selected.
    pub fn new(weights: &[(TransactionType, u32)]) -> Result<Self, MixError> {
        if weights.is_empty() {
            return Err(MixError::Empty);
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0u64;
        for (_, weight) in weights {
            total += u64::from(*weight);
            cumulative.push(total);
        }
        if total == 0 {
            return Err(MixError::ZeroTotal);
        }

        Ok(Self {
            entries: weights.to_vec(),
            cumulative,
            total,
        })
    }

    /// Read-biased mix: `f` is the share given to the read-only types.
    pub fn read_fraction(f: f64) -> Result<Self, MixError> {
        if !(0.0..=1.0).contains(&f) {
            return Err(MixError::InvalidReadFraction(f));
        }
        let weights = READ_FRACTION_BASE
            .iter()
            .map(|&(txn, base)| {
                let share = if txn.is_read_only() { f } else { 1.0 - f };
                (txn, (base * share).floor() as u32)
            })
            .collect::<Vec<_>>();
        Self::new(&weights)
    }

    /// Replace the weight of selected types, keeping the order of `self`.
    pub fn with_overrides(
        &self,
        overrides: &BTreeMap<TransactionType, u32>,
    ) -> Result<Self, MixError> {
        let weights: Vec<_> = self
            .entries
            .iter()
            .map(|(t, w)| (*t, overrides.get(t).copied().unwrap_or(*w)))
            .collect();
        Self::new(&weights)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn weights(&self) -> &[(TransactionType, u32)] {
        &self.entries
    }

    /// Map a draw in `[0, total)` to the first type whose cumulative bound
    /// exceeds it.
    pub fn select(&self, draw: u64) -> TransactionType {
        assert!(draw < self.total, "draw {draw} outside [0, {})", self.total);
        let idx = self.cumulative.partition_point(|&bound| bound <= draw);
        self.entries[idx].0
    }

    /// Draw uniformly and select.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionType {
        self.select(rng.gen_range(0..self.total))
    }
}

impl Default for TransactionMix {
    fn default() -> Self {
        Self {
            entries: vec![
                (TransactionType::StockLevel, 4),
                (TransactionType::Delivery, 4),
                (TransactionType::OrderStatus, 4),
                (TransactionType::Payment, 43),
                (TransactionType::NewOrder, 45),
            ],
            cumulative: vec![4, 8, 12, 55, 100],
            total: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_default_matches_explicit_weights() {
        let explicit = TransactionMix::new(&[
            (TransactionType::StockLevel, 4),
            (TransactionType::Delivery, 4),
            (TransactionType::OrderStatus, 4),
            (TransactionType::Payment, 43),
            (TransactionType::NewOrder, 45),
        ])
        .unwrap();
        assert_eq!(explicit, TransactionMix::default());
    }

    #[test]
    fn test_select_boundaries() {
        let mix = TransactionMix::default();
        assert_eq!(mix.select(0), TransactionType::StockLevel);
        assert_eq!(mix.select(3), TransactionType::StockLevel);
        assert_eq!(mix.select(4), TransactionType::Delivery);
        assert_eq!(mix.select(7), TransactionType::Delivery);
        assert_eq!(mix.select(8), TransactionType::OrderStatus);
        assert_eq!(mix.select(11), TransactionType::OrderStatus);
        assert_eq!(mix.select(12), TransactionType::Payment);
        assert_eq!(mix.select(54), TransactionType::Payment);
        assert_eq!(mix.select(55), TransactionType::NewOrder);
        assert_eq!(mix.select(99), TransactionType::NewOrder);
    }

    #[test]
    #[should_panic]
    fn test_select_out_of_range() {
        TransactionMix::default().select(100);
    }

    #[test]
    fn test_zero_weights_never_selected() {
        let mix = TransactionMix::new(&[
            (TransactionType::Delivery, 0),
            (TransactionType::Payment, 3),
            (TransactionType::StockLevel, 0),
        ])
        .unwrap();
        for draw in 0..mix.total() {
            assert_eq!(mix.select(draw), TransactionType::Payment);
        }
    }

    #[test]
    fn test_invalid_mixes() {
        assert_eq!(TransactionMix::new(&[]), Err(MixError::Empty));
        assert_eq!(
            TransactionMix::new(&[(TransactionType::Payment, 0)]),
            Err(MixError::ZeroTotal)
        );
        assert!(matches!(
            TransactionMix::read_fraction(1.5),
            Err(MixError::InvalidReadFraction(_))
        ));
    }

    #[test]
    fn test_equal_weights_converge() {
        let weights: Vec<_> = TransactionType::ALL.iter().map(|t| (*t, 1)).collect();
        let mix = TransactionMix::new(&weights).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let draws = 100_000;
        let mut counts: HashMap<TransactionType, u32> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(mix.pick(&mut rng)).or_default() += 1;
        }

        for t in TransactionType::ALL {
            let share = counts[&t] as f64 / draws as f64;
            assert!((0.19..=0.21).contains(&share), "{t}: {share}");
        }
    }

    #[test]
    fn test_read_fraction() {
        let mix = TransactionMix::read_fraction(0.5).unwrap();
        assert_eq!(
            mix.weights(),
            &[
                (TransactionType::StockLevel, 250),
                (TransactionType::Delivery, 22),
                (TransactionType::OrderStatus, 250),
                (TransactionType::Payment, 233),
                (TransactionType::NewOrder, 244),
            ]
        );

        let read_only = TransactionMix::read_fraction(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert!(read_only.pick(&mut rng).is_read_only());
        }
    }

    #[test]
    fn test_overrides_keep_order() {
        let overrides = BTreeMap::from([(TransactionType::NewOrder, 0)]);
        let mix = TransactionMix::default().with_overrides(&overrides).unwrap();
        assert_eq!(mix.total(), 55);
        assert_eq!(mix.weights()[4], (TransactionType::NewOrder, 0));
        assert_eq!(mix.select(54), TransactionType::Payment);
    }
}
