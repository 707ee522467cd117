//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvPriceFeed;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult, Simulator};
use crate::domain::config_validation::{
    build_backtest_config, build_strategy_config, read_investment_fraction,
    validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::TradesimError;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::{StrategyConfig, StrategyKind};
use crate::ports::price_feed::PriceFeed;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-asset trading strategy simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one strategy over a price history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: PathBuf,
        /// Output stem for `<stem>_trades.csv` and `<stem>_equity.csv`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every strategy kind with default parameters and compare them
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: PathBuf,
    },
    /// Feed prices one at a time through the incremental simulator
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        prices: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            prices,
            output,
        } => run_backtest(&config, &prices, output.as_deref()),
        Command::Compare { config, prices } => run_compare(&config, &prices),
        Command::Replay { config, prices } => run_replay(&config, &prices),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn fail(err: TradesimError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

fn load_prices(path: &Path) -> Result<PriceSeries, TradesimError> {
    eprintln!("Loading prices from {}", path.display());
    let series = CsvPriceFeed::new(path.to_path_buf()).fetch_history()?;
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        eprintln!(
            "  {} points, {} to {}",
            series.len(),
            first.timestamp,
            last.timestamp
        );
    }
    Ok(series)
}

fn run_backtest(config_path: &Path, prices_path: &Path, output: Option<&Path>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Build backtest and strategy config
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    eprintln!("Strategy: {}", strategy);

    // Stage 3: Load prices
    let series = match load_prices(prices_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    // Stage 4: Simulate
    let result = match backtest_engine::run_backtest(&series, &strategy, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    // Stage 5: Console summary
    print_summary(&result);

    // Stage 6: Optional CSV report
    if let Some(stem) = output {
        let stem = stem.display().to_string();
        if let Err(e) = CsvReportAdapter::new().write(&result, &stem) {
            return fail(e);
        }
        let (trades_path, equity_path) = CsvReportAdapter::report_paths(&stem);
        eprintln!(
            "\nReport written to: {}, {}",
            trades_path.display(),
            equity_path.display()
        );
    }

    ExitCode::SUCCESS
}

fn run_compare(config_path: &Path, prices_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let fraction = match read_investment_fraction(&adapter) {
        Ok(f) => f,
        Err(e) => return fail(e),
    };

    let series = match load_prices(prices_path) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut results = Vec::new();
    let mut last_error = None;
    for kind in StrategyKind::all_defaults() {
        let strategy = StrategyConfig::new(kind, fraction);
        match backtest_engine::run_backtest(&series, &strategy, &bt_config) {
            Ok(r) => results.push(r),
            Err(e @ TradesimError::InsufficientData { .. }) => {
                eprintln!("warning: skipping {} ({})", kind, e);
                last_error = Some(e);
            }
            Err(e) => return fail(e),
        }
    }

    if results.is_empty() {
        return match last_error {
            Some(e) => fail(e),
            None => fail(TradesimError::NoData),
        };
    }

    println!("{}", comparison_table(&results));
    ExitCode::SUCCESS
}

fn run_replay(config_path: &Path, prices_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let mut simulator = match Simulator::new(strategy, bt_config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    eprintln!("Replaying {} with {}", prices_path.display(), strategy);
    let mut feed = CsvPriceFeed::new(prices_path.to_path_buf());
    loop {
        let point = match feed.fetch_latest() {
            Ok(Some(p)) => p,
            Ok(None) => break,
            Err(e) => return fail(e),
        };
        let outcome = match simulator.step(point) {
            Ok(o) => o,
            Err(e) => return fail(e),
        };
        if let Some(trade) = outcome.trade {
            info!(index = outcome.index, side = %trade.side, price = trade.price, "replay trade");
            println!(
                "{}  {:<4} {:>12.4} @ {:>10.2}  cash {:>12.2}  equity {:>12.2}",
                trade.timestamp,
                trade.side.to_string(),
                trade.quantity,
                trade.price,
                trade.cash_after,
                outcome.equity
            );
        }
    }

    if simulator.last_index().is_none() {
        return fail(TradesimError::NoData);
    }
    if simulator.prices().len() < strategy.kind.min_history() {
        warn!(
            points = simulator.prices().len(),
            minimum = strategy.kind.min_history(),
            "replay ended before indicators warmed up"
        );
    }

    print_summary(&simulator.finish());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(e);
    }

    let (Ok(bt_config), Ok(strategy)) = (
        build_backtest_config(&adapter),
        build_strategy_config(&adapter),
    ) else {
        return ExitCode::from(2);
    };

    eprintln!("\nBacktest:");
    eprintln!("  initial_capital:  {:.2}", bt_config.initial_capital);
    eprintln!("  liquidate_at_end: {}", bt_config.liquidate_at_end);
    eprintln!("  periods_per_year: {}", bt_config.periods_per_year);

    eprintln!("\nStrategy: {}", strategy);
    eprintln!("  entry: {}", strategy.kind.entry_rule());
    eprintln!("  exit:  {}", strategy.kind.exit_rule());
    eprintln!("  needs {} points of history", strategy.kind.min_history());

    eprintln!("\nIndicators to compute:");
    for ind in strategy.kind.required_indicators() {
        eprintln!("  {}", ind);
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!("\n=== Results: {} ===", result.strategy);
    println!("Final Equity:       {:.2}", m.final_equity);
    println!("Total Return:       {:.2}%", m.total_return_pct);
    println!("Round Trips:        {}", m.round_trips);
    println!("Win Rate:           {}", format_win_rate(m.win_rate_pct));
    println!("Max Drawdown:       {:.2}%", m.max_drawdown_pct);
    println!("Profit Factor:      {:.2}", m.profit_factor);
    println!("Avg Trade Return:   {:.2}%", m.avg_trade_return_pct);
    println!("Max Losing Streak:  {}", m.max_consecutive_losses);
    println!("Sharpe Ratio:       {:.2}", m.sharpe_ratio);

    let state = &result.final_state;
    println!("Cash:               {:.2}", state.cash);
    if let Some(position) = &state.position {
        println!(
            "Open Position:      {:.4} @ {:.2} (unrealized {:.2})",
            position.quantity, position.avg_cost, state.unrealized_pnl
        );
    }
}

fn format_win_rate(win_rate_pct: Option<f64>) -> String {
    match win_rate_pct {
        Some(w) => format!("{:.1}%", w),
        None => "n/a".to_string(),
    }
}

/// Side-by-side summary of several runs over the same series.
pub fn comparison_table(results: &[BacktestResult]) -> String {
    let mut out = format!(
        "{:<28} {:>10} {:>8} {:>8} {:>10}\n",
        "Strategy", "Return%", "Win%", "Trades", "MaxDD%"
    );
    for result in results {
        let m = &result.metrics;
        let win = m
            .win_rate_pct
            .map(|w| format!("{:.1}", w))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "{:<28} {:>10.2} {:>8} {:>8} {:>10.2}\n",
            result.strategy.kind.to_string(),
            m.total_return_pct,
            win,
            m.round_trips,
            m.max_drawdown_pct
        ));
    }
    out
}
