//! Sampling interval → annualization factor and default z-score window.
//!
//! The table is plain configuration: it is handed to the pair pipeline, and
//! callers can register new labels without touching the simulator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const TRADING_HOURS_PER_DAY: f64 = 6.5;
pub const TRADING_MINUTES_PER_DAY: f64 = 390.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IntervalParams {
    pub periods_per_year: f64,
    pub zscore_window: usize,
}

pub const DAILY: IntervalParams = IntervalParams {
    periods_per_year: TRADING_DAYS_PER_YEAR,
    zscore_window: 60,
};

pub const HOURLY: IntervalParams = IntervalParams {
    periods_per_year: TRADING_DAYS_PER_YEAR * TRADING_HOURS_PER_DAY,
    zscore_window: 130,
};

pub const MINUTE: IntervalParams = IntervalParams {
    periods_per_year: TRADING_DAYS_PER_YEAR * TRADING_MINUTES_PER_DAY,
    zscore_window: 390,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IntervalTable {
    entries: BTreeMap<String, IntervalParams>,
    // Used for any label not in `entries`
    fallback: IntervalParams,
}

impl Default for IntervalTable {
    fn default() -> Self {
        let mut table = IntervalTable::new(DAILY);
        for (labels, params) in [
            (["1d", "daily"], DAILY),
            (["1h", "hourly"], HOURLY),
            (["1m", "minute"], MINUTE),
        ] {
            for label in labels {
                table.insert(label, params);
            }
        }
        table
    }
}

impl IntervalTable {
    /// An empty table that resolves everything to `fallback`.
    pub fn new(fallback: IntervalParams) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, params: IntervalParams) {
        self.entries.insert(label.into(), params);
    }

    pub fn is_known(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Unlisted labels silently resolve to the fallback (daily by default).
    pub fn lookup(&self, label: &str) -> IntervalParams {
        match self.entries.get(label) {
            Some(params) => *params,
            None => {
                log::debug!(
                    "Interval {:?} not in table, falling back to {:?}",
                    label,
                    self.fallback
                );
                self.fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_documented_constants() {
        let table = IntervalTable::default();
        assert_eq!(table.lookup("1d"), DAILY);
        assert_eq!(
            table.lookup("hourly"),
            IntervalParams {
                periods_per_year: 1638.0,
                zscore_window: 130,
            }
        );
        assert_eq!(
            table.lookup("1m"),
            IntervalParams {
                periods_per_year: 98_280.0,
                zscore_window: 390,
            }
        );
        assert_eq!((DAILY.periods_per_year, DAILY.zscore_window), (252.0, 60));
    }

    #[test]
    fn unknown_interval_falls_back_to_daily() {
        let table = IntervalTable::default();
        assert!(!table.is_known("5m"));
        assert_eq!(table.lookup("5m"), DAILY);
    }

    #[test]
    fn callers_can_extend_the_table() {
        let mut table = IntervalTable::default();
        let five_min = IntervalParams {
            periods_per_year: TRADING_DAYS_PER_YEAR * 78.0,
            zscore_window: 156,
        };
        table.insert("5m", five_min);
        assert_eq!(table.lookup("5m"), five_min);
    }
}
