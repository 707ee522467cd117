//! CSV report adapter implementing ReportPort.
//!
//! For an output stem `run1` it writes `run1_trades.csv` (the trade log) and
//! `run1_equity.csv` (the equity curve).

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradesimError;
use crate::ports::report_port::ReportPort;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    /// Paths of the trade log and equity curve files for a stem.
    pub fn report_paths(output_path: &str) -> (PathBuf, PathBuf) {
        (
            PathBuf::from(format!("{}_trades.csv", output_path)),
            PathBuf::from(format!("{}_equity.csv", output_path)),
        )
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_err(path: &Path, e: impl std::fmt::Display) -> TradesimError {
    TradesimError::Report {
        reason: format!("{}: {}", path.display(), e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), TradesimError> {
        let (trades_path, equity_path) = Self::report_paths(output_path);

        let mut wtr = csv::Writer::from_path(&trades_path).map_err(|e| report_err(&trades_path, e))?;
        wtr.write_record([
            "timestamp",
            "side",
            "price",
            "quantity",
            "cash_after",
            "position_after",
            "realized_pnl",
        ])
        .map_err(|e| report_err(&trades_path, e))?;
        for trade in &result.trades {
            wtr.write_record([
                trade.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                trade.side.to_string(),
                trade.price.to_string(),
                trade.quantity.to_string(),
                trade.cash_after.to_string(),
                trade.position_after.to_string(),
                trade.realized_pnl.map(|p| p.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| report_err(&trades_path, e))?;
        }
        wtr.flush().map_err(|e| report_err(&trades_path, e))?;

        let mut wtr = csv::Writer::from_path(&equity_path).map_err(|e| report_err(&equity_path, e))?;
        wtr.write_record(["timestamp", "equity"])
            .map_err(|e| report_err(&equity_path, e))?;
        for point in &result.equity_curve {
            wtr.write_record([
                point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                point.equity.to_string(),
            ])
            .map_err(|e| report_err(&equity_path, e))?;
        }
        wtr.flush().map_err(|e| report_err(&equity_path, e))?;

        info!(
            trades = %trades_path.display(),
            equity = %equity_path.display(),
            "wrote CSV report"
        );
        Ok(())
    }
}
