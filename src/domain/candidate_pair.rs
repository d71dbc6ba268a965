use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PairError;

/// A `(symbol_a, symbol_b)` candidate handed in by the pair selector.
/// The spread is always `ln(B) - β·ln(A)`, so the order matters.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct CandidatePair {
    pub symbol_a: String,
    pub symbol_b: String,
}

impl CandidatePair {
    pub fn new(symbol_a: impl Into<String>, symbol_b: impl Into<String>) -> Self {
        Self {
            symbol_a: symbol_a.into(),
            symbol_b: symbol_b.into(),
        }
    }

    pub fn name(&self) -> String {
        format!("{}/{}", self.symbol_a, self.symbol_b)
    }
}

// Accepts "A:B" or "A,B", as typed on the command line.
impl FromStr for CandidatePair {
    type Err = PairError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (a, b) = text
            .split_once(':')
            .or_else(|| text.split_once(','))
            .ok_or_else(|| {
                PairError::invalid_parameter(format!("pair {:?} is not of the form A:B", text))
            })?;
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            return Err(PairError::invalid_parameter(format!(
                "pair {:?} has an empty symbol",
                text
            )));
        }
        if a == b {
            return Err(PairError::invalid_parameter(format!(
                "pair {:?} uses the same symbol twice",
                text
            )));
        }
        Ok(CandidatePair::new(a, b))
    }
}

impl std::fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
