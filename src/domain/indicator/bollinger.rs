//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! The multiplier is carried as hundredths so the indicator type stays hashable.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) points are undefined.

use crate::domain::indicator::stddev::window_stats;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT: f64 = 2.0;

pub fn calculate_bollinger(
    points: &[PricePoint],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mult = stddev_mult_x100 as f64 / 100.0;

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| match window_stats(points, i, period) {
            Some((middle, stddev)) => IndicatorPoint::defined(
                point.timestamp,
                IndicatorValue::Bollinger {
                    upper: middle + mult * stddev,
                    middle,
                    lower: middle - mult * stddev,
                },
            ),
            None => IndicatorPoint::undefined(point.timestamp),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

/// Convert a multiplier such as 2.0 into the hundredths used by [`IndicatorType::Bollinger`].
pub fn mult_to_x100(mult: f64) -> u32 {
    (mult * 100.0).round() as u32
}
