//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss are simple means over the trailing window of `n` price
//! changes (a rolling window, not Wilder's smoothing):
//! - change[i] = P[i] - P[i-1]
//! - avg_gain = mean(max(change, 0)), avg_loss = mean(max(-change, 0))
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n points are undefined (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub fn calculate_rsi(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi(period);
    if period == 0 || points.len() < 2 {
        return IndicatorSeries::undefined(indicator_type, points);
    }

    let mut gains: Vec<f64> = Vec::with_capacity(points.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(points.len() - 1);

    for pair in points.windows(2) {
        let change = pair[1].price - pair[0].price;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        if i < period {
            values.push(IndicatorPoint::undefined(point.timestamp));
            continue;
        }

        // changes ending at point i are gains[i - period..i]
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };

        values.push(IndicatorPoint::defined(
            point.timestamp,
            IndicatorValue::Simple(rsi),
        ));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
