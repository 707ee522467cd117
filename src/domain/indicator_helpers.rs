//! Shared helper functions for indicator calculations.

use crate::domain::indicator::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    calculate_stddev, calculate_stochastic, IndicatorSeries, IndicatorType,
};
use crate::domain::price::PricePoint;
use std::collections::HashMap;

/// Calculate a single indicator over the full price history.
pub fn calculate_indicator(points: &[PricePoint], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(points, period),
        IndicatorType::Ema(period) => calculate_ema(points, period),
        IndicatorType::Rsi(period) => calculate_rsi(points, period),
        IndicatorType::Stddev(period) => calculate_stddev(points, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(points, fast, slow, signal),
        IndicatorType::Stochastic { k_period, d_period } => {
            calculate_stochastic(points, k_period, d_period)
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(points, period, stddev_mult_x100),
    }
}

/// Calculate each requested indicator once, keyed by its type.
pub fn compute_indicators(
    points: &[PricePoint],
    indicator_types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut indicators = HashMap::with_capacity(indicator_types.len());
    for &indicator_type in indicator_types {
        indicators
            .entry(indicator_type)
            .or_insert_with(|| calculate_indicator(points, indicator_type));
    }
    indicators
}
