//! Error kinds surfaced while evaluating a single pair.
//!
//! Every variant is local to one pair: the batch runner records it against that
//! pair and moves on to the next one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairError {
    /// Too few observations for the regression plus the unit-root test lags.
    #[error("insufficient data: need {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The normal-equation matrix `XᵗX` cannot be inverted (e.g. constant regressor).
    #[error("singular design matrix: regressors are collinear or constant")]
    SingularMatrix,

    /// A symbol of the pair has no prices inside the requested window.
    #[error("no price data for {symbol} in window [{start_ms}, {end_ms})")]
    MissingSymbolData {
        symbol: String,
        start_ms: i64,
        end_ms: i64,
    },

    /// Two series that must share a time index do not.
    #[error("misaligned series: {0}")]
    MisalignedSeries(String),

    /// A series broke its own invariants (ordering, positivity, lengths).
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PairError {
    pub fn misaligned(msg: impl Into<String>) -> Self {
        PairError::MisalignedSeries(msg.into())
    }

    pub fn invalid_series(msg: impl Into<String>) -> Self {
        PairError::InvalidSeries(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        PairError::InvalidParameter(msg.into())
    }
}

pub type PairResult<T> = std::result::Result<T, PairError>;
