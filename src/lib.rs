#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use analysis::{
    BacktestConfig, CointegrationResult, EvaluationWindows, PairOutcome, engle_granger,
    evaluate_pair, evaluate_pairs,
};
pub use data::{BatchReport, CacheFile, PriceTable};
pub use domain::{CandidatePair, PriceSeries};
pub use error::{PairError, PairResult};
pub use simulation::{PerformanceReport, SimulationResult, TradeSimulator};

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
// CLI argument parsing
use clap::Parser;
use itertools::Itertools;

use crate::config::{REPORT_PATH, STRATEGY};
use crate::simulation::CostModel;
use crate::utils::time_utils::date_to_epoch_ms;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Engle-Granger pair testing and z-score backtests",
    long_about = None
)]
pub struct Cli {
    /// Price table (.json, or a bincode .bin cache). Defaults to the interval's cache file.
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Candidate pair as A:B (spread is ln B - beta * ln A). Repeat for a batch.
    #[arg(long = "pair", value_name = "A:B", required = true)]
    pub pairs: Vec<CandidatePair>,

    /// Training window used to estimate the hedge ratio, YYYY-MM-DD (end exclusive)
    #[arg(long, num_args = 2, value_names = ["START", "END"], required = true)]
    pub train_dates: Vec<String>,

    /// Test window the strategy is simulated on, YYYY-MM-DD (end exclusive)
    #[arg(long, num_args = 2, value_names = ["START", "END"], required = true)]
    pub test_dates: Vec<String>,

    /// Sampling interval of the price table (1d, 1h, 1m, ...)
    #[arg(long, default_value = "1d")]
    pub interval: String,

    /// Rolling z-score window; defaults to the interval's standard window
    #[arg(long)]
    pub window: Option<usize>,

    #[arg(long, default_value_t = STRATEGY.signal.entry_threshold)]
    pub entry_threshold: f64,

    #[arg(long, default_value_t = STRATEGY.signal.exit_threshold)]
    pub exit_threshold: f64,

    /// Fee per leg per fill, as a fraction of notional
    #[arg(long, default_value_t = STRATEGY.costs.fee_rate)]
    pub fee_rate: f64,

    /// Adverse slippage per fill, as a fraction of price
    #[arg(long, default_value_t = STRATEGY.costs.slippage)]
    pub slippage: f64,

    /// Annual risk-free rate for the Sharpe ratio
    #[arg(long, default_value_t = STRATEGY.risk_free_rate)]
    pub risk_free_rate: f64,

    /// p-value below which a pair counts as cointegrated
    #[arg(long, default_value_t = STRATEGY.cointegration.significance)]
    pub significance: f64,

    /// Simulate pairs even when they fail the cointegration test
    #[arg(long, default_value_t = false)]
    pub simulate_all: bool,

    /// Where to write the JSON report
    #[arg(long, default_value = REPORT_PATH)]
    pub output: PathBuf,
}

impl Cli {
    pub fn prices_path(&self) -> PathBuf {
        self.prices
            .clone()
            .unwrap_or_else(|| CacheFile::default_cache_path(&self.interval))
    }

    pub fn windows(&self) -> Result<EvaluationWindows> {
        let (train_start_ms, train_end_ms) = parse_date_pair(&self.train_dates, "--train-dates")?;
        let (test_start_ms, test_end_ms) = parse_date_pair(&self.test_dates, "--test-dates")?;
        Ok(EvaluationWindows {
            train_start_ms,
            train_end_ms,
            test_start_ms,
            test_end_ms,
        })
    }

    pub fn backtest_config(&self) -> Result<BacktestConfig> {
        let mut config = BacktestConfig::new(self.windows()?, self.interval.clone());
        config.zscore_window = self.window;
        config.entry_threshold = self.entry_threshold;
        config.exit_threshold = self.exit_threshold;
        config.costs = CostModel {
            fee_rate: self.fee_rate,
            slippage: self.slippage,
        };
        config.risk_free_rate = self.risk_free_rate;
        config.significance = self.significance;
        config.simulate_all = self.simulate_all;
        config.validate().context("Invalid backtest settings")?;
        Ok(config)
    }
}

fn parse_date_pair(dates: &[String], flag: &str) -> Result<(i64, i64)> {
    let [start, end] = dates else {
        bail!("{} expects exactly two dates, got {}", flag, dates.len());
    };
    let start_ms =
        date_to_epoch_ms(start).with_context(|| format!("Bad start date for {}", flag))?;
    let end_ms = date_to_epoch_ms(end).with_context(|| format!("Bad end date for {}", flag))?;
    Ok((start_ms, end_ms))
}

/// Loads the price table named by `args` and evaluates every requested pair.
/// This is the public API for the binary to call.
pub fn run_batch(args: &Cli) -> Result<BatchReport> {
    let config = args.backtest_config()?;
    if !config.intervals.is_known(&config.interval) {
        log::warn!(
            "Interval {:?} is not in the interval table; using daily annualization",
            config.interval
        );
    }

    let path = args.prices_path();
    let table = PriceTable::load_from_path(&path)
        .with_context(|| format!("Failed to load prices from {:?}", path))?;
    if table.interval != config.interval {
        log::warn!(
            "Price table {:?} is sampled at {:?} but --interval is {:?}",
            table.name,
            table.interval,
            config.interval
        );
    }
    log::info!(
        "Evaluating {} pair(s) from {:?} ({} symbols)",
        args.pairs.len(),
        table.name,
        table.series.len()
    );
    log::debug!("Symbols: {}", table.symbols().join(", "));

    let outcomes = evaluate_pairs(&table, &args.pairs, &config);
    Ok(BatchReport::new(table.name.clone(), config, outcomes))
}
