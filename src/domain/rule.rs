//! Rule AST data structures.
//!
//! Strategies describe their entry and exit conditions with this small AST:
//! - `Operand`: What can be compared (the price, constants, indicators)
//! - `IndicatorRef`: Reference to an indicator with a specific field
//! - `IndicatorField`: Which field of a multi-value indicator to use
//! - `Rule`: Comparisons, crossovers, conjunction and edge detection

use crate::domain::indicator::IndicatorType;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Price,
    Constant(f64),
    Indicator(IndicatorRef),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRef {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
}

/// Selects one component of an indicator value.
///
/// The built-in strategies only read some of these. `MacdHistogram` and
/// `BollingerMiddle` are there for hand-built rules, which are evaluated
/// exactly like strategy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    /// The scalar of a single-valued indicator (SMA, EMA, RSI, stddev).
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    StochasticK,
    StochasticD,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    CrossAbove { left: Operand, right: Operand },
    CrossBelow { left: Operand, right: Operand },
    Above { left: Operand, right: Operand },
    Below { left: Operand, right: Operand },
    AtOrAbove { left: Operand, right: Operand },
    AtOrBelow { left: Operand, right: Operand },
    And(Vec<Rule>),
    /// True on the step the inner rule becomes true.
    Entered(Box<Rule>),
}

impl Operand {
    pub fn indicator(indicator_type: IndicatorType, field: IndicatorField) -> Self {
        Operand::Indicator(IndicatorRef {
            indicator_type,
            field,
        })
    }

    /// Shorthand for a single-valued indicator.
    pub fn value_of(indicator_type: IndicatorType) -> Self {
        Operand::indicator(indicator_type, IndicatorField::Value)
    }
}

/// Every indicator referenced anywhere in the rule, without duplicates.
pub fn extract_indicators(rule: &Rule) -> Vec<IndicatorType> {
    let mut out = Vec::new();
    collect_indicators(rule, &mut out);
    out
}

fn collect_indicators(rule: &Rule, out: &mut Vec<IndicatorType>) {
    match rule {
        Rule::CrossAbove { left, right }
        | Rule::CrossBelow { left, right }
        | Rule::Above { left, right }
        | Rule::Below { left, right }
        | Rule::AtOrAbove { left, right }
        | Rule::AtOrBelow { left, right } => {
            for operand in [left, right] {
                if let Operand::Indicator(iref) = operand {
                    if !out.contains(&iref.indicator_type) {
                        out.push(iref.indicator_type);
                    }
                }
            }
        }
        Rule::And(rules) => {
            for r in rules {
                collect_indicators(r, out);
            }
        }
        Rule::Entered(inner) => collect_indicators(inner, out),
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorField::Value => "value",
            IndicatorField::MacdLine => "line",
            IndicatorField::MacdSignal => "signal",
            IndicatorField::MacdHistogram => "histogram",
            IndicatorField::StochasticK => "k",
            IndicatorField::StochasticD => "d",
            IndicatorField::BollingerUpper => "upper",
            IndicatorField::BollingerMiddle => "middle",
            IndicatorField::BollingerLower => "lower",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Price => write!(f, "price"),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Indicator(iref) if iref.field == IndicatorField::Value => {
                write!(f, "{}", iref.indicator_type)
            }
            Operand::Indicator(iref) => write!(f, "{}.{}", iref.indicator_type, iref.field),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::CrossAbove { left, right } => write!(f, "CROSS_ABOVE({}, {})", left, right),
            Rule::CrossBelow { left, right } => write!(f, "CROSS_BELOW({}, {})", left, right),
            Rule::Above { left, right } => write!(f, "ABOVE({}, {})", left, right),
            Rule::Below { left, right } => write!(f, "BELOW({}, {})", left, right),
            Rule::AtOrAbove { left, right } => write!(f, "AT_OR_ABOVE({}, {})", left, right),
            Rule::AtOrBelow { left, right } => write!(f, "AT_OR_BELOW({}, {})", left, right),
            Rule::And(rules) => {
                write!(f, "AND(")?;
                for (i, r) in rules.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", r)?;
                }
                write!(f, ")")
            }
            Rule::Entered(inner) => write!(f, "ENTERED({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sma(n: usize) -> Operand {
        Operand::value_of(IndicatorType::Sma(n))
    }

    #[test]
    fn operand_constant() {
        let c = Operand::Constant(100.5);
        assert_eq!(c, Operand::Constant(100.5));
        assert_ne!(c, Operand::Constant(99.0));
    }

    #[test]
    fn indicator_ref() {
        let op = Operand::indicator(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorField::MacdHistogram,
        );
        match op {
            Operand::Indicator(iref) => {
                assert_eq!(iref.field, IndicatorField::MacdHistogram);
                assert!(matches!(iref.indicator_type, IndicatorType::Macd { .. }));
            }
            _ => panic!("Expected indicator operand"),
        }
    }

    #[test]
    fn extract_indicators_deduplicates() {
        let rule = Rule::And(vec![
            Rule::CrossAbove {
                left: Operand::Price,
                right: sma(10),
            },
            Rule::Entered(Box::new(Rule::Below {
                left: sma(10),
                right: Operand::value_of(IndicatorType::Rsi(14)),
            })),
        ]);
        let indicators = extract_indicators(&rule);
        assert_eq!(
            indicators,
            vec![IndicatorType::Sma(10), IndicatorType::Rsi(14)]
        );
    }

    #[test]
    fn extract_indicators_none_for_constants() {
        let rule = Rule::Above {
            left: Operand::Price,
            right: Operand::Constant(100.0),
        };
        assert!(extract_indicators(&rule).is_empty());
    }

    #[test]
    fn display_rules() {
        let rule = Rule::CrossAbove {
            left: Operand::Price,
            right: sma(10),
        };
        assert_eq!(rule.to_string(), "CROSS_ABOVE(price, SMA(10))");

        let entered = Rule::Entered(Box::new(Rule::Below {
            left: Operand::value_of(IndicatorType::Rsi(14)),
            right: Operand::Constant(30.0),
        }));
        assert_eq!(entered.to_string(), "ENTERED(BELOW(RSI(14), 30))");

        let and = Rule::And(vec![
            Rule::CrossAbove {
                left: Operand::indicator(
                    IndicatorType::Stochastic {
                        k_period: 14,
                        d_period: 3,
                    },
                    IndicatorField::StochasticK,
                ),
                right: Operand::indicator(
                    IndicatorType::Stochastic {
                        k_period: 14,
                        d_period: 3,
                    },
                    IndicatorField::StochasticD,
                ),
            },
            Rule::Below {
                left: Operand::Constant(1.0),
                right: Operand::Constant(2.0),
            },
        ]);
        assert_eq!(
            and.to_string(),
            "AND(CROSS_ABOVE(STOCHASTIC(14,3).k, STOCHASTIC(14,3).d), BELOW(1, 2))"
        );
    }
}
