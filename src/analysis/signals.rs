//! Rolling z-score of the spread and the entry/exit flags derived from it.

use serde::{Deserialize, Serialize};

use crate::analysis::spread::SpreadSeries;
use crate::config::STRATEGY;
use crate::error::{PairError, PairResult};
use crate::utils::maths_utils::{is_flat, mean, sample_std};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    /// Trailing observations in each rolling mean / std, current one included.
    pub window: usize,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

impl SignalParams {
    /// Default thresholds with an interval-specific window.
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            entry_threshold: STRATEGY.signal.entry_threshold,
            exit_threshold: STRATEGY.signal.exit_threshold,
        }
    }

    pub fn validate(&self) -> PairResult<()> {
        if self.window < 2 {
            return Err(PairError::invalid_parameter(format!(
                "z-score window must be at least 2, got {}",
                self.window
            )));
        }
        for (name, value) in [
            ("entry threshold", self.entry_threshold),
            ("exit threshold", self.exit_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PairError::invalid_parameter(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One point of the signal series. Every flag is `false` while `zscore` is NaN.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub zscore: f64,
    pub long_entry: bool,
    pub short_entry: bool,
    pub exit: bool,
}

impl Signal {
    pub fn from_zscore(zscore: f64, params: &SignalParams) -> Self {
        // NaN comparisons are all false, which is exactly the "no signal" case
        Self {
            zscore,
            long_entry: zscore < -params.entry_threshold,
            short_entry: zscore > params.entry_threshold,
            exit: zscore > -params.exit_threshold && zscore < params.exit_threshold,
        }
    }

    pub fn is_defined(&self) -> bool {
        !self.zscore.is_nan()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignalSeries {
    timestamps_ms: Vec<i64>,
    points: Vec<Signal>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps_ms(&self) -> &[i64] {
        &self.timestamps_ms
    }

    pub fn points(&self) -> &[Signal] {
        &self.points
    }

    pub fn entry_count(&self) -> usize {
        self.points
            .iter()
            .filter(|s| s.long_entry || s.short_entry)
            .count()
    }
}

/// `(x[i] - mean) / std` over the trailing `window` values ending at `i`.
///
/// NaN before the first full window and wherever the window is flat. Flatness is
/// tested on the raw values first, since a rounded variance can come out as a
/// tiny positive number for a window of identical values.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if window < 2 || i + 1 < window {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            if is_flat(slice) {
                return f64::NAN;
            }
            let std = sample_std(slice);
            if std == 0.0 || !std.is_finite() {
                return f64::NAN;
            }
            (values[i] - mean(slice)) / std
        })
        .collect()
}

pub fn generate(spread: &SpreadSeries, params: &SignalParams) -> PairResult<SignalSeries> {
    params.validate()?;
    let points = rolling_zscore(spread.values(), params.window)
        .into_iter()
        .map(|z| Signal::from_zscore(z, params))
        .collect();
    Ok(SignalSeries {
        timestamps_ms: spread.timestamps_ms().to_vec(),
        points,
    })
}
