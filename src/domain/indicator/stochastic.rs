//! Stochastic Oscillator indicator.
//!
//! Computed over a single price stream, so the window high/low are the
//! highest and lowest prices of the trailing `k_period` points:
//! - %K = 100 * (P - lowest) / (highest - lowest), 50 when highest == lowest
//! - %D = SMA(d_period) of %K
//!
//! Default parameters: k_period=14, d_period=3
//! Warmup: (k_period - 1) + (d_period - 1) points.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

const FLAT_RANGE_K: f64 = 50.0;

pub fn calculate_stochastic(
    points: &[PricePoint],
    k_period: usize,
    d_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stochastic { k_period, d_period };
    if k_period == 0 || d_period == 0 {
        return IndicatorSeries::undefined(indicator_type, points);
    }

    let k_line: Vec<Option<f64>> = (0..points.len())
        .map(|i| percent_k(points, i, k_period))
        .collect();
    let d_line = rolling_mean(&k_line, d_period);

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| match (k_line[i], d_line[i]) {
            (Some(k), Some(d)) => {
                IndicatorPoint::defined(point.timestamp, IndicatorValue::Stochastic { k, d })
            }
            _ => IndicatorPoint::undefined(point.timestamp),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn percent_k(points: &[PricePoint], index: usize, period: usize) -> Option<f64> {
    if index + 1 < period {
        return None;
    }

    let window = &points[index + 1 - period..=index];
    let (lowest, highest) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });

    let range = highest - lowest;
    if range == 0.0 {
        return Some(FLAT_RANGE_K);
    }

    let k = 100.0 * (points[index].price - lowest) / range;
    Some(k.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_points;
    use proptest::prelude::*;

    fn kd(series: &IndicatorSeries, index: usize) -> (f64, f64) {
        match series.value_at(index) {
            Some(IndicatorValue::Stochastic { k, d }) => (k, d),
            other => panic!("Expected Stochastic value, got {:?}", other),
        }
    }

    #[test]
    fn stochastic_warmup() {
        let points = make_points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let series = calculate_stochastic(&points, 3, 2);

        // %K defined from index 2, %D from index 3
        for i in 0..3 {
            assert!(!series.values[i].is_valid(), "Index {} should be undefined", i);
        }
        assert!(series.values[3].is_valid());
        assert_eq!(series.indicator_type.warmup(), 3);
    }

    #[test]
    fn stochastic_flat_window_is_neutral() {
        let points = make_points(&[10.0; 6]);
        let series = calculate_stochastic(&points, 3, 2);

        for i in 3..6 {
            let (k, d) = kd(&series, i);
            assert!((k - 50.0).abs() < f64::EPSILON);
            assert!((d - 50.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn stochastic_known_values() {
        let points = make_points(&[10.0, 20.0, 15.0, 30.0]);
        let series = calculate_stochastic(&points, 3, 2);

        // index 2: window [10,20,15] => k = 50; index 3: window [20,15,30] => k = 100
        let (k, d) = kd(&series, 3);
        assert!((k - 100.0).abs() < 1e-10);
        assert!((d - 75.0).abs() < 1e-10);
    }

    #[test]
    fn stochastic_at_window_low_is_zero() {
        let points = make_points(&[30.0, 20.0, 10.0, 5.0]);
        let series = calculate_stochastic(&points, 3, 1);
        let (k, _) = kd(&series, 3);
        assert!(k.abs() < f64::EPSILON);
    }

    #[test]
    fn stochastic_short_input() {
        let points = make_points(&[1.0, 2.0]);
        let series = calculate_stochastic(&points, 14, 3);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn stochastic_zero_period() {
        let points = make_points(&[1.0, 2.0, 3.0]);
        assert!(calculate_stochastic(&points, 0, 3)
            .values
            .iter()
            .all(|p| !p.is_valid()));
        assert!(calculate_stochastic(&points, 3, 0)
            .values
            .iter()
            .all(|p| !p.is_valid()));
    }

    proptest! {
        #[test]
        fn stochastic_k_in_range(
            prices in proptest::collection::vec(1.0f64..500.0, 1..60),
            k_period in 1usize..15,
            d_period in 1usize..5,
        ) {
            let series = calculate_stochastic(&make_points(&prices), k_period, d_period);
            prop_assert_eq!(series.len(), prices.len());
            for point in &series.values {
                if let Some(IndicatorValue::Stochastic { k, d }) = point.value {
                    prop_assert!((0.0..=100.0).contains(&k));
                    prop_assert!((0.0..=100.0 + 1e-9).contains(&d));
                }
            }
        }
    }
}
