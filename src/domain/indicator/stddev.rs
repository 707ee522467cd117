//! Standard Deviation indicator.
//!
//! Population standard deviation over n prices.
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub fn calculate_stddev(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| match window_stats(points, i, period) {
            Some((_, stddev)) => {
                IndicatorPoint::defined(point.timestamp, IndicatorValue::Simple(stddev))
            }
            None => IndicatorPoint::undefined(point.timestamp),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

/// Mean and population standard deviation of the `period` prices ending at
/// `index`, or `None` during warmup.
pub(crate) fn window_stats(points: &[PricePoint], index: usize, period: usize) -> Option<(f64, f64)> {
    if period == 0 || index + 1 < period || index >= points.len() {
        return None;
    }

    let window = &points[index + 1 - period..=index];
    let mean: f64 = window.iter().map(|p| p.price).sum::<f64>() / period as f64;
    let variance: f64 = window
        .iter()
        .map(|p| {
            let diff = p.price - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;

    Some((mean, variance.sqrt()))
}
