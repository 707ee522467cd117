//! Strategy configuration and composition.
//!
//! Each strategy kind is a closed enum variant carrying its parameters. A kind
//! expands into an entry rule (BUY) and an exit rule (SELL) over the rule AST,
//! and names the indicators those rules need.

use crate::domain::error::TradesimError;
use crate::domain::indicator::bollinger::mult_to_x100;
use crate::domain::indicator::IndicatorType;
use crate::domain::rule::{extract_indicators, IndicatorField, Operand, Rule};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaParams {
    pub window: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiParams {
    pub window: usize,
    pub oversold: f64,
    pub overbought: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerParams {
    pub window: usize,
    pub num_std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticParams {
    pub k_window: usize,
    pub d_window: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for MaParams {
    fn default() -> Self {
        MaParams { window: 10 }
    }
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            window: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Default for BollingerParams {
    fn default() -> Self {
        BollingerParams {
            window: 20,
            num_std: 2.0,
        }
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        MacdParams {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Default for StochasticParams {
    fn default() -> Self {
        StochasticParams {
            k_window: 14,
            d_window: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyKind {
    MovingAverage(MaParams),
    Rsi(RsiParams),
    Bollinger(BollingerParams),
    Macd(MacdParams),
    Stochastic(StochasticParams),
}

/// Names accepted by [`StrategyKind::from_name`], in display order.
pub const STRATEGY_NAMES: [&str; 5] = ["ma", "rsi", "bollinger", "macd", "stochastic"];

impl StrategyKind {
    /// Kind with default parameters for a config name such as `"rsi"`.
    pub fn from_name(name: &str) -> Result<Self, TradesimError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ma" | "moving_average" | "sma" => Ok(StrategyKind::MovingAverage(MaParams::default())),
            "rsi" => Ok(StrategyKind::Rsi(RsiParams::default())),
            "bollinger" | "bb" => Ok(StrategyKind::Bollinger(BollingerParams::default())),
            "macd" => Ok(StrategyKind::Macd(MacdParams::default())),
            "stochastic" | "stoch" => Ok(StrategyKind::Stochastic(StochasticParams::default())),
            other => Err(TradesimError::invalid_config(
                "kind",
                format!(
                    "unknown strategy '{}', expected one of {}",
                    other,
                    STRATEGY_NAMES.join(", ")
                ),
            )),
        }
    }

    /// Every kind with its default parameters.
    pub fn all_defaults() -> [StrategyKind; 5] {
        [
            StrategyKind::MovingAverage(MaParams::default()),
            StrategyKind::Rsi(RsiParams::default()),
            StrategyKind::Bollinger(BollingerParams::default()),
            StrategyKind::Macd(MacdParams::default()),
            StrategyKind::Stochastic(StochasticParams::default()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::MovingAverage(_) => "ma",
            StrategyKind::Rsi(_) => "rsi",
            StrategyKind::Bollinger(_) => "bollinger",
            StrategyKind::Macd(_) => "macd",
            StrategyKind::Stochastic(_) => "stochastic",
        }
    }

    /// Minimum number of price points before the strategy can produce a
    /// defined signal.
    pub fn min_history(&self) -> usize {
        match *self {
            StrategyKind::MovingAverage(p) => p.window,
            StrategyKind::Rsi(p) => p.window + 1,
            StrategyKind::Bollinger(p) => p.window,
            StrategyKind::Macd(p) => p.fast.max(p.slow) + p.signal - 1,
            StrategyKind::Stochastic(p) => p.k_window + p.d_window - 1,
        }
    }

    pub fn entry_rule(&self) -> Rule {
        match *self {
            StrategyKind::MovingAverage(p) => Rule::CrossAbove {
                left: Operand::Price,
                right: Operand::value_of(IndicatorType::Sma(p.window)),
            },
            StrategyKind::Rsi(p) => Rule::Entered(Box::new(Rule::Below {
                left: Operand::value_of(IndicatorType::Rsi(p.window)),
                right: Operand::Constant(p.oversold),
            })),
            StrategyKind::Bollinger(p) => Rule::Entered(Box::new(Rule::AtOrBelow {
                left: Operand::Price,
                right: Operand::indicator(bollinger_type(p), IndicatorField::BollingerLower),
            })),
            StrategyKind::Macd(p) => Rule::CrossAbove {
                left: Operand::indicator(macd_type(p), IndicatorField::MacdLine),
                right: Operand::indicator(macd_type(p), IndicatorField::MacdSignal),
            },
            StrategyKind::Stochastic(p) => Rule::And(vec![
                Rule::CrossAbove {
                    left: stoch_k(p),
                    right: stoch_d(p),
                },
                Rule::Below {
                    left: stoch_k(p),
                    right: Operand::Constant(p.oversold),
                },
            ]),
        }
    }

    pub fn exit_rule(&self) -> Rule {
        match *self {
            StrategyKind::MovingAverage(p) => Rule::CrossBelow {
                left: Operand::Price,
                right: Operand::value_of(IndicatorType::Sma(p.window)),
            },
            StrategyKind::Rsi(p) => Rule::Entered(Box::new(Rule::Above {
                left: Operand::value_of(IndicatorType::Rsi(p.window)),
                right: Operand::Constant(p.overbought),
            })),
            StrategyKind::Bollinger(p) => Rule::Entered(Box::new(Rule::AtOrAbove {
                left: Operand::Price,
                right: Operand::indicator(bollinger_type(p), IndicatorField::BollingerUpper),
            })),
            StrategyKind::Macd(p) => Rule::CrossBelow {
                left: Operand::indicator(macd_type(p), IndicatorField::MacdLine),
                right: Operand::indicator(macd_type(p), IndicatorField::MacdSignal),
            },
            StrategyKind::Stochastic(p) => Rule::And(vec![
                Rule::CrossBelow {
                    left: stoch_k(p),
                    right: stoch_d(p),
                },
                Rule::Above {
                    left: stoch_k(p),
                    right: Operand::Constant(p.overbought),
                },
            ]),
        }
    }

    /// Indicators referenced by the entry and exit rules.
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        let mut indicators = extract_indicators(&self.entry_rule());
        for t in extract_indicators(&self.exit_rule()) {
            if !indicators.contains(&t) {
                indicators.push(t);
            }
        }
        indicators
    }

    pub fn validate(&self) -> Result<(), TradesimError> {
        match *self {
            StrategyKind::MovingAverage(p) => validate_window("window", p.window),
            StrategyKind::Rsi(p) => {
                validate_window("window", p.window)?;
                validate_thresholds(p.oversold, p.overbought)
            }
            StrategyKind::Bollinger(p) => {
                validate_window("window", p.window)?;
                validate_num_std(p.num_std)
            }
            StrategyKind::Macd(p) => {
                validate_window("fast", p.fast)?;
                validate_window("slow", p.slow)?;
                validate_window("signal", p.signal)?;
                if p.fast >= p.slow {
                    return Err(TradesimError::invalid_config(
                        "fast",
                        format!("fast ({}) must be less than slow ({})", p.fast, p.slow),
                    ));
                }
                Ok(())
            }
            StrategyKind::Stochastic(p) => {
                validate_window("k_window", p.k_window)?;
                validate_window("d_window", p.d_window)?;
                validate_thresholds(p.oversold, p.overbought)
            }
        }
    }
}

fn bollinger_type(p: BollingerParams) -> IndicatorType {
    IndicatorType::Bollinger {
        period: p.window,
        stddev_mult_x100: mult_to_x100(p.num_std),
    }
}

fn macd_type(p: MacdParams) -> IndicatorType {
    IndicatorType::Macd {
        fast: p.fast,
        slow: p.slow,
        signal: p.signal,
    }
}

fn stoch_type(p: StochasticParams) -> IndicatorType {
    IndicatorType::Stochastic {
        k_period: p.k_window,
        d_period: p.d_window,
    }
}

fn stoch_k(p: StochasticParams) -> Operand {
    Operand::indicator(stoch_type(p), IndicatorField::StochasticK)
}

fn stoch_d(p: StochasticParams) -> Operand {
    Operand::indicator(stoch_type(p), IndicatorField::StochasticD)
}

fn validate_window(parameter: &str, value: usize) -> Result<(), TradesimError> {
    if value == 0 {
        return Err(TradesimError::invalid_config(parameter, "must be at least 1"));
    }
    Ok(())
}

const MAX_NUM_STD: f64 = u32::MAX as f64 / 100.0;

/// Band multipliers are keyed in hundredths, so anything finer or outside
/// `[0.01, u32::MAX / 100]` would silently alias another multiplier.
fn validate_num_std(num_std: f64) -> Result<(), TradesimError> {
    if !num_std.is_finite() || num_std < 0.01 || num_std > MAX_NUM_STD {
        return Err(TradesimError::invalid_config(
            "num_std",
            format!("must be within [0.01, {}], got {}", MAX_NUM_STD, num_std),
        ));
    }
    let hundredths = num_std * 100.0;
    if (hundredths.round() - hundredths).abs() > 1e-6 {
        return Err(TradesimError::invalid_config(
            "num_std",
            format!("must be a multiple of 0.01, got {}", num_std),
        ));
    }
    Ok(())
}

fn validate_thresholds(oversold: f64, overbought: f64) -> Result<(), TradesimError> {
    for (name, value) in [("oversold", oversold), ("overbought", overbought)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(TradesimError::invalid_config(
                name,
                format!("must be within [0, 100], got {}", value),
            ));
        }
    }
    if oversold >= overbought {
        return Err(TradesimError::invalid_config(
            "oversold",
            format!(
                "oversold ({}) must be less than overbought ({})",
                oversold, overbought
            ),
        ));
    }
    Ok(())
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MovingAverage(p) => write!(f, "MA({})", p.window),
            StrategyKind::Rsi(p) => {
                write!(f, "RSI({}, {}/{})", p.window, p.oversold, p.overbought)
            }
            StrategyKind::Bollinger(p) => write!(f, "BOLLINGER({}, {})", p.window, p.num_std),
            StrategyKind::Macd(p) => write!(f, "MACD({},{},{})", p.fast, p.slow, p.signal),
            StrategyKind::Stochastic(p) => write!(
                f,
                "STOCHASTIC({},{}, {}/{})",
                p.k_window, p.d_window, p.oversold, p.overbought
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    /// Fraction of available cash spent on each BUY, in `(0, 1]`.
    pub investment_fraction: f64,
}

pub const DEFAULT_INVESTMENT_FRACTION: f64 = 0.1;

impl StrategyConfig {
    pub fn new(kind: StrategyKind, investment_fraction: f64) -> Self {
        StrategyConfig {
            kind,
            investment_fraction,
        }
    }

    pub fn validate(&self) -> Result<(), TradesimError> {
        if !self.investment_fraction.is_finite()
            || self.investment_fraction <= 0.0
            || self.investment_fraction > 1.0
        {
            return Err(TradesimError::invalid_config(
                "investment_fraction",
                format!("must be within (0, 1], got {}", self.investment_fraction),
            ));
        }
        self.kind.validate()
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}%", self.kind, self.investment_fraction * 100.0)
    }
}
