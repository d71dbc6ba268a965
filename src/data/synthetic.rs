//! Simulated price data for demos and tests without a market data source.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::PriceSeries;
use crate::error::{PairError, PairResult};

/// Seeded generator of log-normal price paths on a regular time grid.
#[derive(Debug)]
pub struct SyntheticMarket {
    rng: StdRng,
    start_ms: i64,
    step_ms: i64,
    len: usize,
}

impl SyntheticMarket {
    pub fn new(seed: u64, start_ms: i64, step_ms: i64, len: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            start_ms,
            step_ms,
            len,
        }
    }

    fn timestamps(&self) -> Vec<i64> {
        (0..self.len as i64)
            .map(|i| self.start_ms + i * self.step_ms)
            .collect()
    }

    fn normal(volatility: f64) -> PairResult<Normal<f64>> {
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(PairError::invalid_parameter(format!(
                "volatility must be finite and non-negative, got {}",
                volatility
            )));
        }
        Normal::new(0.0, volatility).map_err(|e| PairError::invalid_parameter(e.to_string()))
    }

    fn log_random_walk(&mut self, initial_price: f64, volatility: f64) -> PairResult<Vec<f64>> {
        let normal = Self::normal(volatility)?;
        let mut level = initial_price.ln();
        Ok((0..self.len)
            .map(|_| {
                level += normal.sample(&mut self.rng);
                level
            })
            .collect())
    }

    /// Geometric random walk: a single non-stationary leg.
    pub fn random_walk(&mut self, initial_price: f64, volatility: f64) -> PairResult<PriceSeries> {
        let log_prices = self.log_random_walk(initial_price, volatility)?;
        PriceSeries::new(
            self.timestamps(),
            log_prices.into_iter().map(f64::exp).collect(),
        )
    }

    /// Two legs with `ln(B) = ln(scale_b) + β·ln(A) + s`, where `s` is AR(1) with
    /// coefficient `spread_persistence` (|ρ| < 1 keeps the pair cointegrated).
    pub fn cointegrated_pair(
        &mut self,
        initial_price_a: f64,
        volatility_a: f64,
        hedge_ratio: f64,
        scale_b: f64,
        spread_persistence: f64,
        spread_volatility: f64,
    ) -> PairResult<(PriceSeries, PriceSeries)> {
        if !(spread_persistence.abs() < 1.0) {
            return Err(PairError::invalid_parameter(format!(
                "spread persistence {} would not mean-revert",
                spread_persistence
            )));
        }
        let log_a = self.log_random_walk(initial_price_a, volatility_a)?;
        let shock = Self::normal(spread_volatility)?;

        let mut spread = 0.0;
        let log_b: Vec<f64> = log_a
            .iter()
            .map(|la| {
                spread = spread_persistence * spread + shock.sample(&mut self.rng);
                scale_b.ln() + hedge_ratio * la + spread
            })
            .collect();

        let ts = self.timestamps();
        Ok((
            PriceSeries::new(ts.clone(), log_a.into_iter().map(f64::exp).collect())?,
            PriceSeries::new(ts, log_b.into_iter().map(f64::exp).collect())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cointegration::engle_granger;

    #[test]
    fn same_seed_same_path() {
        let a = SyntheticMarket::new(5, 0, 1000, 50)
            .random_walk(100.0, 0.01)
            .unwrap();
        let b = SyntheticMarket::new(5, 0, 1000, 50)
            .random_walk(100.0, 0.01)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.timestamps_ms()[1], 1000);
    }

    #[test]
    fn generated_pair_is_cointegrated() {
        let mut market = SyntheticMarket::new(42, 0, 86_400_000, 400);
        let (a, b) = market
            .cointegrated_pair(50.0, 0.015, 1.3, 2.0, 0.6, 0.01)
            .unwrap();
        let result = engle_granger(&a.log_prices(), &b.log_prices()).unwrap();
        assert!(
            (result.hedge_ratio - 1.3).abs() < 0.1,
            "beta = {}",
            result.hedge_ratio
        );
        assert!(result.is_cointegrated(0.05), "p = {}", result.p_value);
    }

    #[test]
    fn rejects_unit_root_spread() {
        let mut market = SyntheticMarket::new(1, 0, 1, 10);
        assert!(
            market
                .cointegrated_pair(50.0, 0.01, 1.0, 1.0, 1.0, 0.01)
                .is_err()
        );
    }

    #[test]
    fn rejects_negative_or_non_finite_volatility() {
        let mut market = SyntheticMarket::new(1, 0, 1, 10);
        assert!(matches!(
            market.random_walk(50.0, -1.0),
            Err(PairError::InvalidParameter(_))
        ));
        assert!(market.random_walk(50.0, f64::NAN).is_err());
        assert!(
            market
                .cointegrated_pair(50.0, 0.01, 1.0, 1.0, 0.5, f64::INFINITY)
                .is_err()
        );
        // zero volatility is a flat path, not an error
        assert!(market.random_walk(50.0, 0.0).is_ok());
    }
}
