use serde::{Deserialize, Serialize};

use crate::error::{PairError, PairResult};

/// Wire form of a price series, checked by `TryFrom` before it becomes a `PriceSeries`.
#[derive(Deserialize)]
struct RawPriceSeries {
    timestamps_ms: Vec<i64>,
    prices: Vec<f64>,
}

/// Ordered, gap-free `(timestamp, price)` observations for one symbol.
///
/// Invariants (checked on construction and on deserialization):
/// - timestamps strictly increase,
/// - every price is finite and strictly positive (log prices must exist),
/// - both columns have the same length.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    timestamps_ms: Vec<i64>,
    prices: Vec<f64>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = PairError;

    fn try_from(raw: RawPriceSeries) -> PairResult<Self> {
        PriceSeries::new(raw.timestamps_ms, raw.prices)
    }
}

impl PriceSeries {
    pub fn new(timestamps_ms: Vec<i64>, prices: Vec<f64>) -> PairResult<Self> {
        if timestamps_ms.len() != prices.len() {
            return Err(PairError::invalid_series(format!(
                "{} timestamps but {} prices",
                timestamps_ms.len(),
                prices.len()
            )));
        }
        if let Some(pos) = timestamps_ms.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PairError::invalid_series(format!(
                "timestamps not strictly increasing at index {}",
                pos + 1
            )));
        }
        if let Some(pos) = prices.iter().position(|p| !p.is_finite() || *p <= 0.0) {
            return Err(PairError::invalid_series(format!(
                "price {} at index {} is not a positive finite number",
                prices[pos], pos
            )));
        }
        Ok(Self {
            timestamps_ms,
            prices,
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn timestamps_ms(&self) -> &[i64] {
        &self.timestamps_ms
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn log_prices(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.ln()).collect()
    }

    /// Observations with `start_ms <= timestamp < end_ms`, as a fresh series.
    pub fn slice_by_time(&self, start_ms: i64, end_ms: i64) -> PriceSeries {
        // Timestamps are sorted, so both bounds are binary searches.
        let start_idx = self.timestamps_ms.partition_point(|&t| t < start_ms);
        let end_idx = self
            .timestamps_ms
            .partition_point(|&t| t < end_ms)
            .max(start_idx);

        PriceSeries {
            timestamps_ms: self.timestamps_ms[start_idx..end_idx].to_vec(),
            prices: self.prices[start_idx..end_idx].to_vec(),
        }
    }

    /// Fails fast when two series do not share the same time index.
    pub fn ensure_aligned(&self, other: &PriceSeries) -> PairResult<()> {
        ensure_same_index(&self.timestamps_ms, &other.timestamps_ms)
    }
}

/// Shared check used at every boundary where two series must line up.
pub fn ensure_same_index(left: &[i64], right: &[i64]) -> PairResult<()> {
    if left.len() != right.len() {
        return Err(PairError::misaligned(format!(
            "lengths differ ({} vs {})",
            left.len(),
            right.len()
        )));
    }
    if let Some(pos) = left.iter().zip(right).position(|(l, r)| l != r) {
        return Err(PairError::misaligned(format!(
            "timestamps diverge at index {} ({} vs {})",
            pos, left[pos], right[pos]
        )));
    }
    Ok(())
}
