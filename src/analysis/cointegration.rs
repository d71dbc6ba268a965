//! Engle-Granger two-step cointegration test.
//!
//! 1. Estimate the cointegrating regression `b = α + β·a + ε` by OLS.
//! 2. Test the residual `ε` for a unit root (ADF, constant only).
//!
//! Only the slope `β` is carried forward as the hedge ratio. The intercept is
//! reported but not used: the rolling z-score downstream re-centres the spread.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::analysis::adf::adf_test;
use crate::analysis::regression::{ols, with_intercept};
use crate::config::STRATEGY;
use crate::error::{PairError, PairResult};
use crate::utils::maths_utils::mean;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CointegrationResult {
    /// ADF statistic of the regression residual.
    pub test_statistic: f64,
    pub p_value: f64,
    /// Keyed by "1%", "5%", "10%".
    pub critical_values: BTreeMap<String, f64>,
    pub hedge_ratio: f64,
    pub intercept: f64,
    pub used_lag: usize,
    pub nobs: usize,
    /// Periods for a spread deviation to halve; `None` unless the residual mean-reverts.
    pub half_life: Option<f64>,
}

impl CointegrationResult {
    /// Caller-side decision rule: reject the unit root at `significance`.
    pub fn is_cointegrated(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Runs the test on two aligned series (normally log prices), `b` regressed on `a`.
pub fn engle_granger(series_a: &[f64], series_b: &[f64]) -> PairResult<CointegrationResult> {
    if series_a.len() != series_b.len() {
        return Err(PairError::misaligned(format!(
            "cointegration inputs differ in length ({} vs {})",
            series_a.len(),
            series_b.len()
        )));
    }
    let n = series_a.len();
    let required = STRATEGY.cointegration.min_observations;
    if n < required {
        return Err(PairError::InsufficientData {
            required,
            actual: n,
        });
    }
    if series_a.iter().chain(series_b).any(|v| !v.is_finite()) {
        return Err(PairError::invalid_series("non-finite cointegration input"));
    }

    let regressand = DVector::from_row_slice(series_b);
    let fit = ols(&with_intercept(series_a), &regressand)?;
    let intercept = fit.coefficients[0];
    let hedge_ratio = fit.coefficients[1];
    let spread: Vec<f64> = fit.residuals.iter().copied().collect();

    let adf = adf_test(&spread)?;
    let half_life = half_life(&spread);

    log::debug!(
        "Engle-Granger: beta={:.6} alpha={:.6} adf={:.4} p={:.4} lag={} aic={:?}",
        hedge_ratio,
        intercept,
        adf.statistic,
        adf.p_value,
        adf.used_lag,
        adf.ic_best
    );

    Ok(CointegrationResult {
        test_statistic: adf.statistic,
        p_value: adf.p_value,
        critical_values: adf.critical_values,
        hedge_ratio,
        intercept,
        used_lag: adf.used_lag,
        nobs: adf.nobs,
        half_life,
    })
}

/// Half-life from the AR(1) fit `Δs_t = c + φ·(s_{t-1} - s̄)`: `-ln 2 / ln(1 + φ)`.
/// Requires `-1 < φ < 0`; anything else does not mean-revert geometrically.
pub fn half_life(spread: &[f64]) -> Option<f64> {
    let n = spread.len();
    if n < 3 {
        return None;
    }
    let spread_mean = mean(spread);
    let lagged: Vec<f64> = spread[..n - 1].iter().map(|s| s - spread_mean).collect();
    let deltas: Vec<f64> = spread.windows(2).map(|w| w[1] - w[0]).collect();

    let fit = ols(&with_intercept(&lagged), &DVector::from_vec(deltas)).ok()?;
    let phi = fit.coefficients[1];
    if phi <= -1.0 || phi >= 0.0 {
        return None;
    }
    Some(-(2.0_f64.ln()) / (1.0 + phi).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    fn gaussian_noise(n: usize, seed: u64, sd: f64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sd).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    fn random_walk(n: usize, seed: u64, start: f64, sd: f64) -> Vec<f64> {
        let mut level = start;
        gaussian_noise(n, seed, sd)
            .into_iter()
            .map(|step| {
                level += step;
                level
            })
            .collect()
    }

    #[test]
    fn cointegrated_pair_recovers_hedge_ratio() {
        let a = random_walk(500, 1, 100.0, 1.0);
        // AR(1) residual with ρ = 0.5
        let mut residual = gaussian_noise(500, 2, 0.5);
        for t in 1..residual.len() {
            residual[t] += 0.5 * residual[t - 1];
        }
        let b: Vec<f64> = a
            .iter()
            .zip(&residual)
            .map(|(x, e)| 5.0 + 2.0 * x + e)
            .collect();

        let result = engle_granger(&a, &b).unwrap();
        assert_relative_eq!(result.hedge_ratio, 2.0, epsilon = 0.05);
        assert!(result.is_cointegrated(0.05), "p = {}", result.p_value);
        assert!(result.test_statistic < result.critical_values["1%"]);
        let hl = result.half_life.expect("AR(1) residual mean-reverts");
        assert!(hl > 0.5 && hl < 2.0, "half-life {}", hl);
    }

    #[test]
    fn identical_series_are_degenerately_cointegrated() {
        let a: Vec<f64> = random_walk(120, 3, 100.0, 1.0)
            .iter()
            .map(|p| p.ln())
            .collect();
        let result = engle_granger(&a, &a).unwrap();
        assert_relative_eq!(result.hedge_ratio, 1.0, epsilon = 1e-8);
        assert!(result.p_value < 0.01);
        assert!(result.is_cointegrated(STRATEGY.cointegration.significance));
    }

    #[test]
    fn five_observations_is_insufficient() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let err = engle_granger(&a, &a).unwrap_err();
        assert_eq!(
            err,
            PairError::InsufficientData {
                required: 20,
                actual: 5
            }
        );
    }

    #[test]
    fn constant_regressor_is_singular() {
        let a = vec![4.6; 50];
        let b = random_walk(50, 4, 4.6, 0.01);
        let err = engle_granger(&a, &b).unwrap_err();
        assert_eq!(err, PairError::SingularMatrix);
    }

    #[test]
    fn length_mismatch_is_misalignment() {
        let a = vec![1.0; 30];
        let b = vec![1.0; 31];
        let result = engle_granger(&a, &b);
        assert!(matches!(result, Err(PairError::MisalignedSeries(_))));
    }

    #[test]
    fn half_life_of_known_ar1() {
        // s_t = 0.5·s_{t-1} exactly => φ = -0.5 => half-life = 1
        let spread: Vec<f64> = (0..40).map(|t| 0.5_f64.powi(t) * 8.0).collect();
        let hl = half_life(&spread).unwrap();
        assert_relative_eq!(hl, 1.0, epsilon = 1e-6);
        let explosive: Vec<f64> = (0..10).map(|t| 2.0_f64.powi(t)).collect();
        assert!(half_life(&explosive).is_none());
    }
}
