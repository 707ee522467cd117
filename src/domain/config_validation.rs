//! Configuration validation and typed config construction.
//!
//! Reads the `[backtest]` and `[strategy]` sections through a [`ConfigPort`],
//! rejecting malformed values instead of silently falling back to defaults.
//! Absent keys take their defaults.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TradesimError;
use crate::domain::strategy::{StrategyConfig, StrategyKind, DEFAULT_INVESTMENT_FRACTION};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    build_backtest_config(config).map(|_| ())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    build_strategy_config(config).map(|_| ())
}

/// Build and validate a [`BacktestConfig`] from the `[backtest]` section.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TradesimError> {
    let defaults = BacktestConfig::default();
    let backtest = BacktestConfig {
        initial_capital: config
            .get_double("backtest", "initial_capital")?
            .unwrap_or(defaults.initial_capital),
        liquidate_at_end: config
            .get_bool("backtest", "liquidate_at_end")?
            .unwrap_or(defaults.liquidate_at_end),
        periods_per_year: config
            .get_double("backtest", "periods_per_year")?
            .unwrap_or(defaults.periods_per_year),
    };
    backtest.validate()?;
    Ok(backtest)
}

/// Build and validate a [`StrategyConfig`] from the `[strategy]` section.
///
/// `kind` is required; parameters the kind does not use are ignored.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, TradesimError> {
    let name = match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(TradesimError::ConfigMissing {
                section: "strategy".to_string(),
                key: "kind".to_string(),
            })
        }
    };

    let kind = match StrategyKind::from_name(&name)? {
        StrategyKind::MovingAverage(mut p) => {
            p.window = read_window(config, "window")?.unwrap_or(p.window);
            StrategyKind::MovingAverage(p)
        }
        StrategyKind::Rsi(mut p) => {
            p.window = read_window(config, "window")?.unwrap_or(p.window);
            p.oversold = config.get_double("strategy", "oversold")?.unwrap_or(p.oversold);
            p.overbought = config.get_double("strategy", "overbought")?.unwrap_or(p.overbought);
            StrategyKind::Rsi(p)
        }
        StrategyKind::Bollinger(mut p) => {
            p.window = read_window(config, "window")?.unwrap_or(p.window);
            p.num_std = config.get_double("strategy", "num_std")?.unwrap_or(p.num_std);
            StrategyKind::Bollinger(p)
        }
        StrategyKind::Macd(mut p) => {
            p.fast = read_window(config, "fast")?.unwrap_or(p.fast);
            p.slow = read_window(config, "slow")?.unwrap_or(p.slow);
            p.signal = read_window(config, "signal")?.unwrap_or(p.signal);
            StrategyKind::Macd(p)
        }
        StrategyKind::Stochastic(mut p) => {
            p.k_window = read_window(config, "k_window")?.unwrap_or(p.k_window);
            p.d_window = read_window(config, "d_window")?.unwrap_or(p.d_window);
            p.oversold = config.get_double("strategy", "oversold")?.unwrap_or(p.oversold);
            p.overbought = config.get_double("strategy", "overbought")?.unwrap_or(p.overbought);
            StrategyKind::Stochastic(p)
        }
    };

    let strategy = StrategyConfig::new(kind, read_investment_fraction(config)?);
    strategy.validate()?;
    Ok(strategy)
}

/// `[strategy] investment_fraction`, defaulting when absent.
pub fn read_investment_fraction(config: &dyn ConfigPort) -> Result<f64, TradesimError> {
    Ok(config
        .get_double("strategy", "investment_fraction")?
        .unwrap_or(DEFAULT_INVESTMENT_FRACTION))
}

fn read_window(config: &dyn ConfigPort, key: &str) -> Result<Option<usize>, TradesimError> {
    match config.get_int("strategy", key)? {
        None => Ok(None),
        Some(raw) => usize::try_from(raw).map(Some).map_err(|_| {
            TradesimError::invalid_config(
                key,
                format!("expected a non-negative integer, got {}", raw),
            )
        }),
    }
}
