use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use crate::error::{Result, ScoreError};

pub const AGGREGATE_FLOOR: f64 = 1.0;
pub const AGGREGATE_CEILING: f64 = 90.0;
pub const RANDOMIZE_RANGE: RangeInclusive<u32> = 1..=80;

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    pub category: String,
    pub name: String,
    // percentage; the table total is not required to be 100
    pub weight: f64,
    pub current_value: f64,
    pub unit: String,
}

impl FactorRecord {
    pub fn weighted_value(&self) -> f64 {
        if self.weight == 0.0 || self.current_value == 0.0 {
            return 0.0;
        }
        self.weight / 100.0 * self.current_value
    }
}

/// Reads the leading number of `raw`, so "12abc" is 12 and "1e400" is
/// infinite. Input with no leading number scores as zero.
pub fn parse_factor_value(raw: &str) -> f64 {
    NUMERIC_PREFIX
        .find(raw.trim_start())
        .and_then(|m| match m.as_str().trim_start_matches('+') {
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            number => number.parse::<f64>().ok(),
        })
        .unwrap_or(0.0)
}

#[derive(Debug, Clone)]
pub struct FactorAggregator {
    factors: Vec<FactorRecord>,
    last_emitted: i32,
}

impl FactorAggregator {
    pub fn new(factors: Vec<FactorRecord>) -> Self {
        Self {
            factors,
            last_emitted: 0,
        }
    }

    pub fn factors(&self) -> &[FactorRecord] {
        &self.factors
    }

    pub fn last_emitted(&self) -> i32 {
        self.last_emitted
    }

    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|f| f.weight).sum()
    }

    pub fn weighted_sum(&self) -> f64 {
        self.factors.iter().map(FactorRecord::weighted_value).sum()
    }

    pub fn aggregate_score(&self) -> i32 {
        let sum = self.weighted_sum();
        // opposing infinities cancel to NaN
        if sum.is_nan() {
            return AGGREGATE_FLOOR as i32;
        }
        sum.clamp(AGGREGATE_FLOOR, AGGREGATE_CEILING).round() as i32
    }

    pub fn set_value(&mut self, index: usize, raw: &str) -> Result<Option<i32>> {
        let factor = self
            .factors
            .get_mut(index)
            .ok_or(ScoreError::UnknownFactor(index))?;
        factor.current_value = parse_factor_value(raw);
        Ok(self.recompute())
    }

    pub fn randomize_all<R: Rng>(&mut self, rng: &mut R) -> Option<i32> {
        for factor in &mut self.factors {
            factor.current_value = f64::from(rng.random_range(RANDOMIZE_RANGE));
        }
        self.recompute()
    }

    pub fn restore_baseline(&mut self, last_emitted: i32) {
        self.last_emitted = last_emitted;
    }

    pub fn recompute(&mut self) -> Option<i32> {
        let score = self.aggregate_score();
        if score == self.last_emitted {
            return None;
        }
        let delta = score - self.last_emitted;
        self.last_emitted = score;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reference() -> FactorAggregator {
        FactorAggregator::new(Settings::default().table.factors)
    }

    #[test]
    fn test_reference_weighted_sum() {
        let aggregator = reference();
        assert!((aggregator.weighted_sum() - 52.7).abs() < 1e-9);
        assert_eq!(aggregator.aggregate_score(), 53);
    }

    #[test]
    fn test_first_emission_from_zero_baseline() {
        let mut aggregator = reference();
        assert_eq!(aggregator.recompute(), Some(53));
        assert_eq!(aggregator.last_emitted(), 53);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut aggregator = reference();
        aggregator.recompute();
        assert_eq!(aggregator.recompute(), None);
    }

    #[test]
    fn test_repeated_identical_edit_emits_once() {
        let mut aggregator = reference();
        aggregator.recompute();

        let first = aggregator.set_value(8, "10").unwrap();
        assert_eq!(first, Some(-8));
        let second = aggregator.set_value(8, "10").unwrap();
        assert_eq!(second, None);
    }

    #[test]
    fn test_non_numeric_input_counts_as_zero() {
        let mut aggregator = reference();
        aggregator.recompute();

        let delta = aggregator.set_value(0, "lots").unwrap();
        assert_eq!(aggregator.factors()[0].current_value, 0.0);
        // 52.7 - 8.25 = 44.45
        assert_eq!(delta, Some(44 - 53));

        assert_eq!(parse_factor_value(" 12.5 "), 12.5);
        assert_eq!(parse_factor_value(""), 0.0);
        assert_eq!(parse_factor_value("NaN"), 0.0);
        assert_eq!(parse_factor_value("inf"), 0.0);
    }

    #[test]
    fn test_leading_number_is_read() {
        assert_eq!(parse_factor_value("12abc"), 12.0);
        assert_eq!(parse_factor_value("  -3.5 hours"), -3.5);
        assert_eq!(parse_factor_value(".5"), 0.5);
        assert_eq!(parse_factor_value("7."), 7.0);
        assert_eq!(parse_factor_value("2e3x"), 2000.0);
        assert_eq!(parse_factor_value("+4"), 4.0);
        assert_eq!(parse_factor_value("abc12"), 0.0);
        assert_eq!(parse_factor_value("1e400"), f64::INFINITY);
        assert_eq!(parse_factor_value("Infinity"), f64::INFINITY);
        assert_eq!(parse_factor_value("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_infinite_values_clamp() {
        let mut aggregator = reference();
        aggregator.recompute();

        assert_eq!(aggregator.set_value(0, "1e400").unwrap(), Some(90 - 53));
        assert_eq!(aggregator.aggregate_score(), 90);

        aggregator.set_value(1, "-Infinity").unwrap();
        assert_eq!(aggregator.aggregate_score(), 1);

        aggregator.set_value(1, "3").unwrap();
        assert_eq!(aggregator.aggregate_score(), 90);
    }

    #[test]
    fn test_zero_weight_ignores_infinite_value() {
        let factor = FactorRecord {
            category: "Budget".into(),
            name: "Contingency".into(),
            weight: 0.0,
            current_value: f64::INFINITY,
            unit: "%".into(),
        };
        assert_eq!(factor.weighted_value(), 0.0);
    }

    #[test]
    fn test_restored_baseline_reemits_delta() {
        let mut aggregator = reference();
        aggregator.recompute();
        assert_eq!(aggregator.set_value(8, "10").unwrap(), Some(-8));

        aggregator.restore_baseline(53);
        assert_eq!(aggregator.recompute(), Some(-8));
    }

    #[test]
    fn test_unknown_row_is_rejected_without_mutation() {
        let mut aggregator = reference();
        let before = aggregator.factors().to_vec();
        let result = aggregator.set_value(21, "5");
        assert!(matches!(result, Err(ScoreError::UnknownFactor(21))));
        assert_eq!(aggregator.factors(), before.as_slice());
    }

    #[test]
    fn test_aggregate_is_clamped() {
        let mut aggregator = reference();
        for i in 0..aggregator.factors().len() {
            aggregator.set_value(i, "0").unwrap();
        }
        assert_eq!(aggregator.aggregate_score(), 1);

        for i in 0..aggregator.factors().len() {
            aggregator.set_value(i, "1000").unwrap();
        }
        assert_eq!(aggregator.aggregate_score(), 90);
        assert_eq!(aggregator.last_emitted(), 90);
    }

    #[test]
    fn test_randomize_stays_in_range() {
        let mut aggregator = reference();
        let mut rng = StdRng::seed_from_u64(3);
        aggregator.randomize_all(&mut rng);

        for factor in aggregator.factors() {
            let value = factor.current_value;
            assert_eq!(value.fract(), 0.0);
            assert!((1.0..=80.0).contains(&value));
        }
        assert_eq!(aggregator.last_emitted(), aggregator.aggregate_score());
    }
}
