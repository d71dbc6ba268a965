use serde::{Deserialize, Serialize};

use crate::config::STRATEGY;
use crate::error::{PairError, PairResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Proportional fees and slippage, both as fractions of price.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub fee_rate: f64,
    pub slippage: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            fee_rate: STRATEGY.costs.fee_rate,
            slippage: STRATEGY.costs.slippage,
        }
    }
}

impl CostModel {
    pub fn frictionless() -> Self {
        Self {
            fee_rate: 0.0,
            slippage: 0.0,
        }
    }

    /// Slippage always works against the trader: buys fill higher, sells lower.
    pub fn fill_price(&self, price: f64, side: Side) -> f64 {
        match side {
            Side::Buy => price * (1.0 + self.slippage),
            Side::Sell => price * (1.0 - self.slippage),
        }
    }

    /// Two legs, each opened and closed: four fee charges per round trip.
    pub fn round_trip_fee(&self) -> f64 {
        4.0 * self.fee_rate
    }

    pub fn validate(&self) -> PairResult<()> {
        if !self.fee_rate.is_finite() || self.fee_rate < 0.0 {
            return Err(PairError::invalid_parameter(format!(
                "fee rate must be a non-negative number, got {}",
                self.fee_rate
            )));
        }
        // s >= 1 would make sell fills zero or negative
        if !self.slippage.is_finite() || !(0.0..1.0).contains(&self.slippage) {
            return Err(PairError::invalid_parameter(format!(
                "slippage must be in [0, 1), got {}",
                self.slippage
            )));
        }
        Ok(())
    }
}
