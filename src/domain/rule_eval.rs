//! Rule evaluation engine.
//!
//! Evaluates rules against the price history and pre-computed indicator values.
//!
//! # Evaluation Semantics
//!
//! - Comparison rules: Evaluate at the given index; an undefined operand makes them `false`
//! - `CROSS_ABOVE`/`CROSS_BELOW`: Require `index >= 1` and both operands defined at
//!   `index` and `index - 1`, return `false` otherwise
//! - `AND`: Short-circuits on first `false`
//! - `ENTERED(rule)`: Child is true at `index` and false at `index - 1`
//!   (at index 0 the child only needs to be true)

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::price::PricePoint;
use crate::domain::rule::{IndicatorField, IndicatorRef, Operand, Rule};
use std::collections::HashMap;

pub fn evaluate(
    rule: &Rule,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
) -> bool {
    match rule {
        Rule::CrossAbove { left, right } => {
            crossed(left, right, points, indicators, index, |curr, prev| {
                curr.0 > curr.1 && prev.0 <= prev.1
            })
        }
        Rule::CrossBelow { left, right } => {
            crossed(left, right, points, indicators, index, |curr, prev| {
                curr.0 < curr.1 && prev.0 >= prev.1
            })
        }
        Rule::Above { left, right } => {
            compare(left, right, points, indicators, index, |l, r| l > r)
        }
        Rule::Below { left, right } => {
            compare(left, right, points, indicators, index, |l, r| l < r)
        }
        Rule::AtOrAbove { left, right } => {
            compare(left, right, points, indicators, index, |l, r| l >= r)
        }
        Rule::AtOrBelow { left, right } => {
            compare(left, right, points, indicators, index, |l, r| l <= r)
        }
        Rule::And(rules) => {
            for r in rules {
                if !evaluate(r, points, indicators, index) {
                    return false;
                }
            }
            true
        }
        Rule::Entered(inner) => {
            if !evaluate(inner, points, indicators, index) {
                return false;
            }
            index == 0 || !evaluate(inner, points, indicators, index - 1)
        }
    }
}

fn compare(
    left: &Operand,
    right: &Operand,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
    op: impl Fn(f64, f64) -> bool,
) -> bool {
    match (
        resolve_operand(left, points, indicators, index),
        resolve_operand(right, points, indicators, index),
    ) {
        (Some(l), Some(r)) => op(l, r),
        _ => false,
    }
}

fn crossed(
    left: &Operand,
    right: &Operand,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
    op: impl Fn((f64, f64), (f64, f64)) -> bool,
) -> bool {
    if index == 0 {
        return false;
    }
    let pair = |i: usize| {
        Some((
            resolve_operand(left, points, indicators, i)?,
            resolve_operand(right, points, indicators, i)?,
        ))
    };
    match (pair(index), pair(index - 1)) {
        (Some(curr), Some(prev)) => op(curr, prev),
        _ => false,
    }
}

fn resolve_operand(
    operand: &Operand,
    points: &[PricePoint],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
) -> Option<f64> {
    match operand {
        Operand::Price => points.get(index).map(|p| p.price),
        Operand::Constant(v) => Some(*v),
        Operand::Indicator(ind_ref) => resolve_indicator(ind_ref, indicators, index),
    }
}

fn resolve_indicator(
    ind_ref: &IndicatorRef,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    index: usize,
) -> Option<f64> {
    let value = indicators.get(&ind_ref.indicator_type)?.value_at(index)?;
    extract_field(&value, ind_ref.field)
}

fn extract_field(value: &IndicatorValue, field: IndicatorField) -> Option<f64> {
    let v = match (value, field) {
        (IndicatorValue::Simple(v), IndicatorField::Value) => *v,
        (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => *line,
        (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => *signal,
        (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => *histogram,
        (IndicatorValue::Stochastic { k, .. }, IndicatorField::StochasticK) => *k,
        (IndicatorValue::Stochastic { d, .. }, IndicatorField::StochasticD) => *d,
        (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => *upper,
        (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => *middle,
        (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => *lower,
        _ => return None,
    };
    Some(v)
}
