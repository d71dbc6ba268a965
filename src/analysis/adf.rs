//! Augmented Dickey-Fuller unit-root test (constant-only specification).
//!
//! Regression for lag order `k`:
//!
//! ```text
//! Δy_t = α + γ·y_{t-1} + Σ_{i=1..k} δ_i·Δy_{t-i} + ε_t
//! ```
//!
//! H0: `γ = 0` (unit root). The statistic is the t-value of `γ`. The lag order is
//! chosen by minimum AIC, every candidate being fitted on the same sample (the
//! one left over after reserving the maximum lag), and the winner is refitted on
//! the largest sample its own lag allows.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::analysis::regression::{OlsFit, ols};
use crate::config::{STRATEGY, debug};
use crate::error::{PairError, PairResult};
use crate::utils::maths_utils::max_abs_deviation;

// MacKinnon (1994) p-value response surface, constant only, one variable.
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 3.8269e-2];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2];

// MacKinnon (2010) critical values, constant only, one variable.
// Each row is a polynomial in 1/nobs.
const TAU_C_2010: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.04]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: BTreeMap<String, f64>,
    /// AIC of the selected lag on the common selection sample.
    pub ic_best: Option<f64>,
}

/// Schwert's rule `ceil(12·(n/100)^¼)`, capped so the constant-only regression
/// keeps some degrees of freedom. `None` when the series can't support any lag.
pub fn max_lag_for(n: usize) -> Option<usize> {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (n / 2).checked_sub(2)?;
    Some(schwert.min(cap))
}

pub fn adf_test(series: &[f64]) -> PairResult<AdfResult> {
    let n = series.len();
    let max_lag = max_lag_for(n).ok_or(PairError::InsufficientData {
        required: 4,
        actual: n,
    })?;

    if let Some(pos) = series.iter().position(|v| !v.is_finite()) {
        return Err(PairError::invalid_series(format!(
            "non-finite value at index {} in unit-root test input",
            pos
        )));
    }

    // A residual that is constant up to rounding has nothing left to test.
    let scale = series.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    if max_abs_deviation(series) <= STRATEGY.cointegration.degenerate_spread_tolerance * scale {
        log::debug!("ADF input is numerically constant; treated as stationary");
        return Ok(AdfResult {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            used_lag: 0,
            nobs: n - 1,
            critical_values: mackinnon_critical_values(n - 1),
            ic_best: None,
        });
    }

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let fit = match lagged_regression(series, &diffs, lag, max_lag) {
            Ok(fit) => fit,
            // Extra lags can make the regressors exactly collinear; those orders just drop out.
            Err(PairError::SingularMatrix) => {
                log::debug!("ADF lag {} skipped: singular regression", lag);
                continue;
            }
            Err(e) => return Err(e),
        };
        let aic = fit.aic();
        if debug::PRINT_ADF_LAG_SELECTION {
            log::info!("ADF lag {:>2}: aic = {:.6}", lag, aic);
        }
        // Strict comparison keeps the fewest lags on ties.
        if best.is_none_or(|(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let (ic_best, used_lag) = best.ok_or(PairError::SingularMatrix)?;

    let fit = lagged_regression(series, &diffs, used_lag, used_lag)?;
    let statistic = fit.t_value(1);

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
        ic_best: Some(ic_best),
    })
}

/// Fits the ADF regression with `lags` lagged differences on rows
/// `sample_start..diffs.len()`. Columns: `[1, y_{t-1}, Δy_{t-1}, .., Δy_{t-lags}]`.
fn lagged_regression(
    levels: &[f64],
    diffs: &[f64],
    lags: usize,
    sample_start: usize,
) -> PairResult<OlsFit> {
    debug_assert!(lags <= sample_start);
    let rows = diffs.len().saturating_sub(sample_start);
    let cols = 2 + lags;

    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let t = sample_start + r;
        match c {
            0 => 1.0,
            1 => levels[t],
            lag => diffs[t - (lag - 1)],
        }
    });
    let y = DVector::from_row_slice(&diffs[sample_start..]);

    ols(&x, &y)
}

/// Approximate p-value of an ADF statistic (MacKinnon 1994, constant only).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX_C {
        return 1.0;
    }
    if statistic < TAU_MIN_C {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR_C {
        polyval(&TAU_C_SMALLP, statistic)
    } else {
        polyval(&TAU_C_LARGEP, statistic)
    };
    Normal::new(0.0, 1.0)
        .map(|normal| normal.cdf(z))
        .unwrap_or(f64::NAN)
}

/// Finite-sample critical values at 1%, 5% and 10% (MacKinnon 2010).
pub fn mackinnon_critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let inv_n = 1.0 / nobs.max(1) as f64;
    TAU_C_2010
        .iter()
        .map(|(level, coefs)| (level.to_string(), polyval(coefs, inv_n)))
        .collect()
}

/// `c0 + c1·x + c2·x² + ...`
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
