//! Seedable random source with the TPC-C distributions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Syllables used to build customer last names.
const SYLLABLES: [&str; 10] = [
    "BAR", "OUGHT", "ABLE", "PRI", "PRES", "ESE", "ANTI", "CALLY", "ATION", "EING",
];

/// The constant `C` of the NURand function, one per `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NuRandConstants {
    /// `C` for `A = 255`
    pub c_last: i64,
    /// `C` for `A = 1023`
    pub c_id: i64,
    /// `C` for `A = 8191`
    pub order_line_item_id: i64,
}

impl NuRandConstants {
    /// Draw the constants used while loading the database.
    pub fn for_load<R: Rng>(rng: &mut R) -> Self {
        Self {
            c_last: rng.gen_range(0..=255),
            c_id: rng.gen_range(0..=1023),
            order_line_item_id: rng.gen_range(0..=8191),
        }
    }

    /// Draw the constants for the measurement run.
    ///
    /// `c_last` must differ from the load value by a delta in `[65, 119]`,
    /// excluding 96 and 112.
    pub fn for_run<R: Rng>(load: &NuRandConstants, rng: &mut R) -> Self {
        let c_last = loop {
            let candidate: i64 = rng.gen_range(0..=255);
            if Self::is_valid_run_delta(candidate, load.c_last) {
                break candidate;
            }
        };
        Self {
            c_last,
            c_id: rng.gen_range(0..=1023),
            order_line_item_id: rng.gen_range(0..=8191),
        }
    }

    fn is_valid_run_delta(c_run: i64, c_load: i64) -> bool {
        let delta = (c_run - c_load).abs();
        (65..=119).contains(&delta) && delta != 96 && delta != 112
    }
}

/// Build a customer last name from a number in `0..=999`.
pub fn make_last_name(number: i64) -> String {
    assert!(
        (0..=999).contains(&number),
        "last name number out of range: {number}"
    );
    let digits = [number / 100, (number / 10) % 10, number % 10];
    digits
        .iter()
        .map(|&d| SYLLABLES[d as usize])
        .collect::<String>()
}

/// Worker-local random source.
///
/// Not shared between workers. Out-of-contract calls (empty ranges, an
/// excluded value outside its range, unknown NURand `A`) panic.
pub struct RandomSource {
    rng: StdRng,
    nurand: NuRandConstants,
}

impl RandomSource {
    pub fn new(rng: StdRng, nurand: NuRandConstants) -> Self {
        Self { rng, nurand }
    }

    /// Deterministic source for a given seed.
    pub fn from_seed(seed: u64, nurand: NuRandConstants) -> Self {
        Self::new(StdRng::seed_from_u64(seed), nurand)
    }

    /// Source seeded from the operating system.
    pub fn from_entropy(nurand: NuRandConstants) -> Self {
        Self::new(StdRng::from_entropy(), nurand)
    }

    /// Access to the underlying generator for callers that need raw draws.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Uniform integer in `[low, high]`.
    pub fn uniform(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "empty range [{low}, {high}]");
        self.rng.gen_range(low..=high)
    }

    /// Uniform integer in `[low, high]` that is never `excluded`.
    pub fn uniform_excluding(&mut self, low: i64, high: i64, excluded: i64) -> i64 {
        assert!(low < high, "range [{low}, {high}] has no value besides {excluded}");
        assert!(
            (low..=high).contains(&excluded),
            "excluded value {excluded} outside [{low}, {high}]"
        );
        let value = self.uniform(low, high - 1);
        if value >= excluded {
            value + 1
        } else {
            value
        }
    }

    /// Uniform fixed-point number in `[low, high]` with `decimal_places` digits.
    pub fn fixed_point(&mut self, decimal_places: u32, low: f64, high: f64) -> f64 {
        let multiplier = 10_f64.powi(decimal_places as i32);
        let int_low = (low * multiplier).round() as i64;
        let int_high = (high * multiplier).round() as i64;
        self.uniform(int_low, int_high) as f64 / multiplier
    }

    /// Non-uniform random number: `(((uniform(0, a) | uniform(x, y)) + C) % (y - x + 1)) + x`.
    pub fn nurand(&mut self, a: i64, x: i64, y: i64) -> i64 {
        let c = match a {
            255 => self.nurand.c_last,
            1023 => self.nurand.c_id,
            8191 => self.nurand.order_line_item_id,
            _ => panic!("NURand is only defined for A in {{255, 1023, 8191}}, got {a}"),
        };
        (((self.uniform(0, a) | self.uniform(x, y)) + c) % (y - x + 1)) + x
    }

    /// Skewed customer last name for lookups during the run.
    pub fn skewed_last_name(&mut self, customers_per_district: i64) -> String {
        let upper = (customers_per_district - 1).clamp(0, 999);
        let number = self.nurand(255, 0, upper);
        make_last_name(number)
    }
}
