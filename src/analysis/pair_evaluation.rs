//! Train/test evaluation of candidate pairs.
//!
//! The hedge ratio is estimated once on the training window and then applied,
//! unchanged, to the test window: the spread, its z-score and the simulated
//! trades all live on the test window only.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::cointegration::{CointegrationResult, engle_granger};
use crate::analysis::signals::{SignalParams, SignalSeries, generate};
use crate::analysis::spread::SpreadSeries;
use crate::config::{IntervalParams, IntervalTable, STRATEGY, debug};
use crate::data::PriceTable;
use crate::domain::CandidatePair;
use crate::error::{PairError, PairResult};
use crate::simulation::metrics::direction_breakdown;
use crate::simulation::{CostModel, SimulationParams, SimulationResult, TradeSimulator};
use crate::utils::time_utils::epoch_ms_to_utc;

/// Half-open `[start, end)` windows in epoch milliseconds (UTC).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationWindows {
    pub train_start_ms: i64,
    pub train_end_ms: i64,
    pub test_start_ms: i64,
    pub test_end_ms: i64,
}

impl EvaluationWindows {
    pub fn validate(&self) -> PairResult<()> {
        for (name, start, end) in [
            ("training", self.train_start_ms, self.train_end_ms),
            ("test", self.test_start_ms, self.test_end_ms),
        ] {
            if start >= end {
                return Err(PairError::invalid_parameter(format!(
                    "{} window starts at {} but ends at {}",
                    name,
                    epoch_ms_to_utc(start),
                    epoch_ms_to_utc(end)
                )));
            }
        }
        if self.test_start_ms < self.train_end_ms {
            log::warn!(
                "Test window starts ({}) before training ends ({}); results are in-sample",
                epoch_ms_to_utc(self.test_start_ms),
                epoch_ms_to_utc(self.train_end_ms)
            );
        }
        Ok(())
    }
}

/// Everything one evaluation run needs beyond the prices themselves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub windows: EvaluationWindows,
    /// Interval label resolved through `intervals`.
    pub interval: String,
    /// Overrides the interval's default z-score window.
    pub zscore_window: Option<usize>,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub costs: CostModel,
    pub risk_free_rate: f64,
    pub significance: f64,
    /// Simulate pairs that fail the cointegration test instead of skipping them.
    pub simulate_all: bool,
    pub intervals: IntervalTable,
}

impl BacktestConfig {
    pub fn new(windows: EvaluationWindows, interval: impl Into<String>) -> Self {
        Self {
            windows,
            interval: interval.into(),
            zscore_window: None,
            entry_threshold: STRATEGY.signal.entry_threshold,
            exit_threshold: STRATEGY.signal.exit_threshold,
            costs: CostModel::default(),
            risk_free_rate: STRATEGY.risk_free_rate,
            significance: STRATEGY.cointegration.significance,
            simulate_all: false,
            intervals: IntervalTable::default(),
        }
    }

    pub fn interval_params(&self) -> IntervalParams {
        self.intervals.lookup(&self.interval)
    }

    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            window: self
                .zscore_window
                .unwrap_or(self.interval_params().zscore_window),
            entry_threshold: self.entry_threshold,
            exit_threshold: self.exit_threshold,
        }
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            costs: self.costs,
            risk_free_rate: self.risk_free_rate,
            periods_per_year: self.interval_params().periods_per_year,
        }
    }

    pub fn validate(&self) -> PairResult<()> {
        self.windows.validate()?;
        self.signal_params().validate()?;
        self.simulation_params().validate()?;
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(PairError::invalid_parameter(format!(
                "significance must be in (0, 1), got {}",
                self.significance
            )));
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct PairEvaluation {
    pub pair: CandidatePair,
    pub cointegration: CointegrationResult,
    pub train_observations: usize,
    pub test_observations: usize,
    pub signals: SignalSeries,
    pub simulation: SimulationResult,
}

/// Result of one pair in a batch. A failure never stops the other pairs.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    Evaluated(Box<PairEvaluation>),
    NotCointegrated {
        pair: CandidatePair,
        cointegration: CointegrationResult,
    },
    Failed {
        pair: CandidatePair,
        error: String,
    },
}

impl PairOutcome {
    pub fn pair(&self) -> &CandidatePair {
        match self {
            PairOutcome::Evaluated(evaluation) => &evaluation.pair,
            PairOutcome::NotCointegrated { pair, .. } | PairOutcome::Failed { pair, .. } => pair,
        }
    }

    pub fn evaluation(&self) -> Option<&PairEvaluation> {
        match self {
            PairOutcome::Evaluated(evaluation) => Some(&**evaluation),
            _ => None,
        }
    }
}

/// Tests the pair on the training window and, if it passes (or `simulate_all`
/// is set), simulates it on the test window.
pub fn evaluate_pair(
    table: &PriceTable,
    pair: &CandidatePair,
    config: &BacktestConfig,
) -> PairResult<PairOutcome> {
    config.validate()?;
    let verbose = debug::PRINT_PIPELINE_FOR_PAIR == pair.name();
    let w = &config.windows;

    let (train_a, train_b) = table.aligned_window(pair, w.train_start_ms, w.train_end_ms)?;
    let cointegration = engle_granger(&train_a.log_prices(), &train_b.log_prices())?;
    if verbose {
        log::info!(
            "{}: {} training bars, beta={:.6}, adf={:.4}, p={:.4}, critical={:?}, half-life={:?}",
            pair,
            train_a.len(),
            cointegration.hedge_ratio,
            cointegration.test_statistic,
            cointegration.p_value,
            cointegration.critical_values,
            cointegration.half_life
        );
    }

    if !cointegration.is_cointegrated(config.significance) && !config.simulate_all {
        log::info!(
            "{}: not cointegrated (p = {:.4} >= {}), skipping simulation",
            pair,
            cointegration.p_value,
            config.significance
        );
        return Ok(PairOutcome::NotCointegrated {
            pair: pair.clone(),
            cointegration,
        });
    }

    let (test_a, test_b) = table.aligned_window(pair, w.test_start_ms, w.test_end_ms)?;
    let signal_params = config.signal_params();
    if test_a.len() < signal_params.window {
        log::warn!(
            "{}: test window has {} bars, fewer than the z-score window of {}; no signals possible",
            pair,
            test_a.len(),
            signal_params.window
        );
    }

    let spread = SpreadSeries::from_prices(&test_a, &test_b, cointegration.hedge_ratio)?;
    let signals = generate(&spread, &signal_params)?;
    if verbose {
        let defined = signals.points().iter().filter(|s| s.is_defined()).count();
        log::info!(
            "{}: {} of {} test bars have a z-score, {} entry signals",
            pair,
            defined,
            signals.len(),
            signals.entry_count()
        );
    }
    let simulation = TradeSimulator::new(config.simulation_params()).run(
        &signals,
        &test_a,
        &test_b,
        cointegration.hedge_ratio,
    )?;

    if debug::PRINT_PAIR_SUMMARY {
        log::info!("{}: {}", pair, simulation.report.summary_line());
    }
    if verbose {
        for (direction, count, net) in direction_breakdown(&simulation.trades) {
            log::info!("{}: {} x{} net {:+.5}", pair, direction, count, net);
        }
    }

    Ok(PairOutcome::Evaluated(Box::new(PairEvaluation {
        pair: pair.clone(),
        cointegration,
        train_observations: train_a.len(),
        test_observations: test_a.len(),
        signals,
        simulation,
    })))
}

/// Evaluates every pair in parallel; output order matches `pairs`.
pub fn evaluate_pairs(
    table: &PriceTable,
    pairs: &[CandidatePair],
    config: &BacktestConfig,
) -> Vec<PairOutcome> {
    pairs
        .par_iter()
        .map(|pair| match evaluate_pair(table, pair, config) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("{}: evaluation failed: {}", pair, e);
                PairOutcome::Failed {
                    pair: pair.clone(),
                    error: e.to_string(),
                }
            }
        })
        .collect()
}
