//! Run duration flags such as `90`, `90s`, `15m` or `2h`.

use anyhow::{bail, Context};
use std::time::Duration;

/// Unit suffixes and their length in seconds. A bare number means seconds.
const UNITS: [(&str, u64); 4] = [("", 1), ("s", 1), ("m", 60), ("h", 3600)];

/// Whole seconds named by `value`.
pub fn duration_secs(value: &str) -> anyhow::Result<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    if amount.is_empty() {
        bail!("Duration {value:?} does not start with a number");
    }

    let Some(&(_, scale)) = UNITS.iter().find(|(suffix, _)| *suffix == unit) else {
        bail!("Unknown duration unit {unit:?} in {value:?}, expected s, m or h");
    };
    let amount: u64 = amount
        .parse()
        .with_context(|| format!("Duration {value:?} is out of range"))?;
    amount
        .checked_mul(scale)
        .with_context(|| format!("Duration {value:?} is out of range"))
}

/// clap value parser for `--duration`.
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    duration_secs(value).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(duration_secs("300").unwrap(), 300);
        assert_eq!(duration_secs("300s").unwrap(), 300);
        assert_eq!(duration_secs("5m").unwrap(), 300);
        assert_eq!(duration_secs("1h").unwrap(), 3600);
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        for value in ["", "s", "-5s", "tens", "1d", "5 m", "1.5h"] {
            assert!(duration_secs(value).is_err(), "{value:?} was accepted");
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let max = u64::MAX.to_string();
        assert_eq!(duration_secs(&max).unwrap(), u64::MAX);
        assert!(duration_secs(&format!("{max}h")).is_err());
        assert!(duration_secs(&format!("{}m", u64::MAX / 60 + 1)).is_err());
        assert!(duration_secs("99999999999999999999999s").is_err());
        assert_eq!(
            duration_secs(&format!("{}h", u64::MAX / 3600)).unwrap(),
            u64::MAX / 3600 * 3600
        );
    }
}
