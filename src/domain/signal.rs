//! Per-step trading signals derived from a strategy's entry and exit rules.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;
use crate::domain::rule_eval::evaluate;
use crate::domain::strategy::StrategyKind;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Signal at `index`, using only data at or before it.
///
/// Returns `Hold` while any indicator the strategy needs is still warming up.
/// The entry rule takes precedence over the exit rule.
pub fn generate_signal(
    strategy: &StrategyKind,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
) -> Signal {
    if index >= points.len() {
        return Signal::Hold;
    }

    let warmed_up = strategy.required_indicators().iter().all(|t| {
        indicators
            .get(t)
            .is_some_and(|series| series.is_valid_at(index))
    });
    if !warmed_up {
        return Signal::Hold;
    }

    if evaluate(&strategy.entry_rule(), points, indicators, index) {
        Signal::Buy
    } else if evaluate(&strategy.exit_rule(), points, indicators, index) {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// One signal per price point.
pub fn generate_signals(
    strategy: &StrategyKind,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
) -> Vec<Signal> {
    (0..points.len())
        .map(|i| generate_signal(strategy, points, indicators, i))
        .collect()
}
