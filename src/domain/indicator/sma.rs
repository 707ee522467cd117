//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(P[i-n+1..=i]) / n. Each window is summed afresh so a
//! large earlier price cannot cancel out of later windows.
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Sma(period);
    if period == 0 {
        return IndicatorSeries::undefined(indicator_type, points);
    }

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if i + 1 < period {
                IndicatorPoint::undefined(point.timestamp)
            } else {
                let sum: f64 = points[i + 1 - period..=i].iter().map(|p| p.price).sum();
                IndicatorPoint::defined(point.timestamp, IndicatorValue::Simple(sum / period as f64))
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Trailing mean over an optional-valued sequence. A window containing any
/// undefined value is itself undefined.
pub(crate) fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_points;

    #[test]
    fn sma_warmup() {
        let points = make_points(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&points, 3);

        assert_eq!(series.len(), 5);
        assert!(!series.values[0].is_valid());
        assert!(!series.values[1].is_valid());
        assert!(series.values[2].is_valid());
        assert!(series.values[4].is_valid());
    }

    #[test]
    fn sma_values() {
        let points = make_points(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&points, 3);

        assert!((series.values[2].simple().unwrap() - 20.0).abs() < 1e-10);
        assert!((series.values[3].simple().unwrap() - 30.0).abs() < 1e-10);
        assert!((series.values[4].simple().unwrap() - 40.0).abs() < 1e-10);
    }

    #[test]
    fn sma_constant_series_equals_constant() {
        let points = make_points(&[42.5; 12]);
        let series = calculate_sma(&points, 5);

        for point in series.values.iter().skip(4) {
            assert!((point.simple().unwrap() - 42.5).abs() < 1e-10);
        }
    }

    #[test]
    fn sma_large_price_does_not_leak_into_later_windows() {
        let points = make_points(&[1e16, 0.5, 0.5, 0.5]);
        let series = calculate_sma(&points, 2);

        assert_eq!(series.values[2].simple(), Some(0.5));
        assert_eq!(series.values[3].simple(), Some(0.5));
    }

    #[test]
    fn sma_short_input_all_undefined() {
        let points = make_points(&[10.0, 20.0]);
        let series = calculate_sma(&points, 5);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn sma_period_0() {
        let points = make_points(&[10.0, 20.0]);
        let series = calculate_sma(&points, 0);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.is_valid()));
    }

    #[test]
    fn sma_empty() {
        let series = calculate_sma(&[], 3);
        assert!(series.is_empty());
        assert_eq!(series.indicator_type, IndicatorType::Sma(3));
    }

    #[test]
    fn rolling_mean_skips_undefined_windows() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let out = rolling_mean(&values, 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(1.5));
        assert_eq!(out[3], Some(2.5));
    }
}
