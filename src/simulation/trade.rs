use std::fmt;

use serde::{Deserialize, Serialize};

use crate::simulation::costs::Side;

/// Which way the spread `ln(B) - β·ln(A)` is held.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, strum_macros::EnumIter,
)]
pub enum TradeDirection {
    /// Bet on the spread rising: buy B, sell A.
    Long,
    /// Bet on the spread falling: sell B, buy A.
    Short,
}

impl TradeDirection {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            TradeDirection::Long => 1.0,
            TradeDirection::Short => -1.0,
        }
    }

    /// Opening sides for the `(A, B)` legs. Closing uses the opposites.
    pub fn entry_sides(self) -> (Side, Side) {
        match self {
            TradeDirection::Long => (Side::Sell, Side::Buy),
            TradeDirection::Short => (Side::Buy, Side::Sell),
        }
    }

    pub fn exit_sides(self) -> (Side, Side) {
        let (a, b) = self.entry_sides();
        (a.opposite(), b.opposite())
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "Long spread"),
            TradeDirection::Short => write!(f, "Short spread"),
        }
    }
}

/// A closed round trip. Created once on exit and never changed afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trade {
    pub direction: TradeDirection,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_timestamp_ms: i64,
    pub exit_timestamp_ms: i64,
    pub gross_return: f64,
    pub fee_cost: f64,
    pub net_return: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.net_return > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}
