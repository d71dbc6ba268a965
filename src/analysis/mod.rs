// Statistics, signal generation and the per-pair pipeline
pub mod adf;
pub mod cointegration;
pub mod pair_evaluation;
pub mod regression;
pub mod signals;
pub mod spread;

// Re-export commonly used types
pub use cointegration::{CointegrationResult, engle_granger};
pub use pair_evaluation::{
    BacktestConfig, EvaluationWindows, PairEvaluation, PairOutcome, evaluate_pair, evaluate_pairs,
};
pub use signals::{Signal, SignalParams, SignalSeries};
pub use spread::SpreadSeries;
