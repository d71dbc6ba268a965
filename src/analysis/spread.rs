use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::{PairError, PairResult};

/// `spread[t] = ln(price_B[t]) - β·ln(price_A[t])` on the legs' shared time index.
/// Built fresh for every `(β, window)`; never edited in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpreadSeries {
    timestamps_ms: Vec<i64>,
    values: Vec<f64>,
}

impl SpreadSeries {
    pub fn new(timestamps_ms: Vec<i64>, values: Vec<f64>) -> PairResult<Self> {
        if timestamps_ms.len() != values.len() {
            return Err(PairError::invalid_series(format!(
                "spread has {} timestamps but {} values",
                timestamps_ms.len(),
                values.len()
            )));
        }
        Ok(Self {
            timestamps_ms,
            values,
        })
    }

    pub fn from_prices(
        prices_a: &PriceSeries,
        prices_b: &PriceSeries,
        hedge_ratio: f64,
    ) -> PairResult<Self> {
        prices_a.ensure_aligned(prices_b)?;
        if !hedge_ratio.is_finite() {
            return Err(PairError::invalid_parameter(format!(
                "hedge ratio {} is not finite",
                hedge_ratio
            )));
        }
        let values = izip!(prices_a.prices(), prices_b.prices())
            .map(|(a, b)| b.ln() - hedge_ratio * a.ln())
            .collect();
        Ok(Self {
            timestamps_ms: prices_a.timestamps_ms().to_vec(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps_ms(&self) -> &[i64] {
        &self.timestamps_ms
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
