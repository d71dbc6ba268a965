//! Position state machine.
//!
//! ```text
//!            long_entry (wins ties)
//!   Flat ─────────────────────────▶ Open(Long)
//!    │ ▲                                │
//!    │ └──────────── exit ──────────────┘
//!    │
//!    └──── short_entry ──▶ Open(Short) ── exit ──▶ Flat
//! ```
//!
//! `step` is pure: the simulator owns the state and the trade log, and feeds
//! each bar through here.

use serde::{Deserialize, Serialize};

use crate::analysis::signals::Signal;
use crate::simulation::costs::CostModel;
use crate::simulation::trade::{Trade, TradeDirection};

/// Both legs' raw prices at one index of the shared time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub index: usize,
    pub timestamp_ms: i64,
    pub price_a: f64,
    pub price_b: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub direction: TradeDirection,
    pub entry_index: usize,
    pub entry_timestamp_ms: i64,
    /// Slipped fill prices of each leg at entry.
    pub entry_fill_a: f64,
    pub entry_fill_b: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: PositionState,
    /// Set only when this bar closed a position.
    pub closed: Option<Trade>,
}

impl Transition {
    fn stay(state: PositionState) -> Self {
        Self {
            next: state,
            closed: None,
        }
    }
}

pub fn step(
    state: PositionState,
    bar: &Bar,
    signal: &Signal,
    hedge_ratio: f64,
    costs: &CostModel,
) -> Transition {
    match state {
        PositionState::Flat => {
            let direction = if signal.long_entry {
                TradeDirection::Long
            } else if signal.short_entry {
                TradeDirection::Short
            } else {
                return Transition::stay(state);
            };
            Transition::stay(PositionState::Open(open(direction, bar, costs)))
        }
        PositionState::Open(position) if signal.exit => Transition {
            next: PositionState::Flat,
            closed: Some(close(&position, bar, hedge_ratio, costs)),
        },
        // No stop-loss and no holding limit: hold until the exit signal.
        PositionState::Open(_) => Transition::stay(state),
    }
}

fn open(direction: TradeDirection, bar: &Bar, costs: &CostModel) -> OpenPosition {
    let (side_a, side_b) = direction.entry_sides();
    OpenPosition {
        direction,
        entry_index: bar.index,
        entry_timestamp_ms: bar.timestamp_ms,
        entry_fill_a: costs.fill_price(bar.price_a, side_a),
        entry_fill_b: costs.fill_price(bar.price_b, side_b),
    }
}

fn close(position: &OpenPosition, bar: &Bar, hedge_ratio: f64, costs: &CostModel) -> Trade {
    let (side_a, side_b) = position.direction.exit_sides();
    let exit_fill_a = costs.fill_price(bar.price_a, side_a);
    let exit_fill_b = costs.fill_price(bar.price_b, side_b);

    let ret_a = exit_fill_a / position.entry_fill_a - 1.0;
    let ret_b = exit_fill_b / position.entry_fill_b - 1.0;
    let gross_return = position.direction.sign() * (ret_b - hedge_ratio * ret_a);
    let fee_cost = costs.round_trip_fee();

    Trade {
        direction: position.direction,
        entry_index: position.entry_index,
        exit_index: bar.index,
        entry_timestamp_ms: position.entry_timestamp_ms,
        exit_timestamp_ms: bar.timestamp_ms,
        gross_return,
        fee_cost,
        net_return: gross_return - fee_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bar(index: usize, price_a: f64, price_b: f64) -> Bar {
        Bar {
            index,
            timestamp_ms: index as i64 * 1000,
            price_a,
            price_b,
        }
    }

    fn signal(long_entry: bool, short_entry: bool, exit: bool) -> Signal {
        Signal {
            zscore: 0.0,
            long_entry,
            short_entry,
            exit,
        }
    }

    #[test]
    fn flat_without_entry_stays_flat() {
        let t = step(
            PositionState::Flat,
            &bar(1, 100.0, 50.0),
            &signal(false, false, true),
            1.0,
            &CostModel::frictionless(),
        );
        assert!(t.next.is_flat());
        assert!(t.closed.is_none());
    }

    #[test]
    fn long_wins_simultaneous_entries() {
        let t = step(
            PositionState::Flat,
            &bar(3, 100.0, 50.0),
            &signal(true, true, false),
            1.0,
            &CostModel::frictionless(),
        );
        match t.next {
            PositionState::Open(p) => {
                assert_eq!(p.direction, TradeDirection::Long);
                assert_eq!(p.entry_index, 3);
            }
            PositionState::Flat => panic!("expected an open position"),
        }
    }

    fn slipped(slippage: f64) -> CostModel {
        CostModel {
            fee_rate: 0.0,
            slippage,
        }
    }

    /// Opens on `entry`, closes on the next bar and returns the closed trade.
    fn round_trip(entry: Signal, from: Bar, to: Bar, hedge_ratio: f64, costs: &CostModel) -> Trade {
        let opened = step(PositionState::Flat, &from, &entry, hedge_ratio, costs);
        assert!(!opened.next.is_flat());
        let exit = signal(false, false, true);
        let closed = step(opened.next, &to, &exit, hedge_ratio, costs);
        assert!(closed.next.is_flat());
        closed.closed.unwrap()
    }

    #[test]
    fn entry_applies_adverse_slippage_per_leg() {
        let costs = slipped(0.01);
        let (flat, long) = (PositionState::Flat, signal(true, false, false));
        let t = step(flat, &bar(1, 100.0, 50.0), &long, 1.0, &costs);
        let PositionState::Open(p) = t.next else {
            panic!("expected an open position");
        };
        // long spread sells A, buys B
        assert_relative_eq!(p.entry_fill_a, 99.0);
        assert_relative_eq!(p.entry_fill_b, 50.5);
    }

    #[test]
    fn exit_fills_also_pay_slippage() {
        let costs = slipped(0.01);
        let (from, to) = (bar(1, 100.0, 50.0), bar(2, 110.0, 55.0));

        // long: sell A at 99, buy B at 50.5, then buy A at 111.1, sell B at 54.45
        let long = round_trip(signal(true, false, false), from, to, 0.5, &costs);
        let ret_b = 55.0 * 0.99 / (50.0 * 1.01) - 1.0;
        let ret_a = 110.0 * 1.01 / (100.0 * 0.99) - 1.0;
        assert_eq!(long.direction, TradeDirection::Long);
        assert_relative_eq!(long.gross_return, ret_b - 0.5 * ret_a, epsilon = 1e-12);

        // short: buy A at 101, sell B at 49.5, then sell A at 108.9, buy B at 55.55
        let short = round_trip(signal(false, true, false), from, to, 0.5, &costs);
        let ret_b = 55.0 * 1.01 / (50.0 * 0.99) - 1.0;
        let ret_a = 110.0 * 0.99 / (100.0 * 1.01) - 1.0;
        assert_eq!(short.direction, TradeDirection::Short);
        assert_relative_eq!(short.gross_return, -(ret_b - 0.5 * ret_a), epsilon = 1e-12);

        // both directions lose to friction compared with the frictionless round trip
        let free = CostModel::frictionless();
        let long_free = round_trip(signal(true, false, false), from, to, 0.5, &free);
        let short_free = round_trip(signal(false, true, false), from, to, 0.5, &free);
        assert!(long.gross_return < long_free.gross_return);
        assert!(short.gross_return < short_free.gross_return);
        assert_eq!(long.fee_cost, 0.0);
    }

    #[test]
    fn long_round_trip_pnl() {
        let costs = CostModel::frictionless();
        let (long, quiet, exit) = (
            signal(true, false, false),
            signal(false, false, false),
            signal(false, false, true),
        );
        let first = bar(1, 100.0, 50.0);
        let opened = step(PositionState::Flat, &first, &long, 0.5, &costs);
        let held = step(opened.next, &bar(2, 101.0, 51.0), &quiet, 0.5, &costs);
        assert_eq!(held.next, opened.next);
        let closed = step(held.next, &bar(3, 110.0, 55.0), &exit, 0.5, &costs);
        assert!(closed.next.is_flat());
        let trade = closed.closed.unwrap();
        // ret_b = 0.1, ret_a = 0.1, β = 0.5 => 0.05
        assert_relative_eq!(trade.gross_return, 0.05, epsilon = 1e-12);
        assert_eq!((trade.entry_index, trade.exit_index), (1, 3));
        assert_eq!(trade.bars_held(), 2);
    }

    #[test]
    fn short_round_trip_pnl_is_mirrored() {
        let costs = CostModel::frictionless();
        let (from, to) = (bar(1, 100.0, 50.0), bar(2, 110.0, 55.0));
        let trade = round_trip(signal(false, true, false), from, to, 0.5, &costs);
        assert_eq!(trade.direction, TradeDirection::Short);
        assert_relative_eq!(trade.gross_return, -0.05, epsilon = 1e-12);
    }

    #[test]
    fn fees_come_off_gross() {
        let costs = CostModel {
            fee_rate: 0.001,
            slippage: 0.0,
        };
        let (from, to) = (bar(1, 100.0, 50.0), bar(2, 100.0, 52.0));
        let trade = round_trip(signal(true, false, false), from, to, 1.0, &costs);
        assert_relative_eq!(trade.fee_cost, 0.004);
        let expected_net = trade.gross_return - 0.004;
        assert_relative_eq!(trade.net_return, expected_net, epsilon = 1e-15);
    }
}
