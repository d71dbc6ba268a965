//! Ordinary least squares on the normal equations.

use nalgebra::{DMatrix, DVector};

use crate::config::STRATEGY;
use crate::error::{PairError, PairResult};

/// Result of regressing `y` on the columns of `x`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: DVector<f64>,
    pub residuals: DVector<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    pub nobs: usize,
    xtx_inv: DMatrix<f64>,
}

impl OlsFit {
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    pub fn df_resid(&self) -> usize {
        self.nobs - self.n_params()
    }

    pub fn std_error(&self, idx: usize) -> f64 {
        let scale = self.ssr / self.df_resid() as f64;
        (scale * self.xtx_inv[(idx, idx)]).sqrt()
    }

    pub fn t_value(&self, idx: usize) -> f64 {
        self.coefficients[idx] / self.std_error(idx)
    }

    /// Gaussian log-likelihood evaluated at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every column (constant included).
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }
}

/// Solves `β̂ = (XᵗX)⁻¹Xᵗy`.
///
/// `XᵗX` is rejected as singular when its reciprocal condition number falls
/// below `STRATEGY.cointegration.min_reciprocal_condition`: a constant
/// regressor makes the determinant zero only up to rounding, so an exact
/// `try_inverse` alone would happily return garbage.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> PairResult<OlsFit> {
    let (nobs, n_params) = x.shape();
    if nobs != y.len() {
        return Err(PairError::misaligned(format!(
            "design matrix has {} rows but response has {}",
            nobs,
            y.len()
        )));
    }
    if nobs <= n_params {
        return Err(PairError::InsufficientData {
            required: n_params + 1,
            actual: nobs,
        });
    }

    let xtx = x.tr_mul(x);
    let singular_values = xtx.singular_values();
    let rcond = singular_values.min() / singular_values.max();
    if !(rcond > STRATEGY.cointegration.min_reciprocal_condition) {
        return Err(PairError::SingularMatrix);
    }
    let xtx_inv = xtx.try_inverse().ok_or(PairError::SingularMatrix)?;

    let coefficients = &xtx_inv * x.tr_mul(y);
    let residuals = y - x * &coefficients;
    let ssr = residuals.norm_squared();

    Ok(OlsFit {
        coefficients,
        residuals,
        ssr,
        nobs,
        xtx_inv,
    })
}

/// Design matrix `[1, x]` for a simple regression with intercept.
pub fn with_intercept(x: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] })
}
