//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;

pub fn calculate_ema(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let prices: Vec<Option<f64>> = points.iter().map(|p| Some(p.price)).collect();
    let ema = ema_values(&prices, period);

    let values = points
        .iter()
        .zip(ema)
        .map(|(point, value)| IndicatorPoint {
            timestamp: point.timestamp,
            value: value.map(IndicatorValue::Simple),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// EMA over a sequence whose leading values may be undefined.
///
/// The seed is the mean of the first `period` defined values; an undefined
/// value after the seed breaks nothing because defined inputs are contiguous
/// once they start.
pub(crate) fn ema_values(input: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; input.len()];
    if period == 0 {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut ema: Option<f64> = None;

    for (i, value) in input.iter().enumerate() {
        let Some(v) = *value else {
            continue;
        };
        match ema {
            None => {
                seen += 1;
                sum += v;
                if seen == period {
                    let seed = sum / period as f64;
                    ema = Some(seed);
                    out[i] = Some(seed);
                }
            }
            Some(prev) => {
                let next = v * k + prev * (1.0 - k);
                ema = Some(next);
                out[i] = Some(next);
            }
        }
    }

    out
}
