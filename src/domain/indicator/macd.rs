//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded with the mean of its first `signal` values
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 points.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    points: &[PricePoint],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries::undefined(indicator_type, points);
    }

    let prices: Vec<Option<f64>> = points.iter().map(|p| Some(p.price)).collect();
    let ema_fast = ema_values(&prices, fast);
    let ema_slow = ema_values(&prices, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal_line = ema_values(&macd_line, signal_period);

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| match (macd_line[i], signal_line[i]) {
            (Some(line), Some(signal)) => IndicatorPoint::defined(
                point.timestamp,
                IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            ),
            _ => IndicatorPoint::undefined(point.timestamp),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(points: &[PricePoint]) -> IndicatorSeries {
    calculate_macd(points, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
