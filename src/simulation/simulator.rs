use serde::{Deserialize, Serialize};

use crate::analysis::signals::SignalSeries;
use crate::config::{IntervalParams, STRATEGY, debug};
use crate::domain::{PriceSeries, ensure_same_index};
use crate::error::{PairError, PairResult};
use crate::simulation::costs::CostModel;
use crate::simulation::metrics::{PerformanceReport, compute_report};
use crate::simulation::position::{Bar, OpenPosition, PositionState, step};
use crate::simulation::trade::Trade;
use crate::utils::time_utils::epoch_ms_to_utc;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub costs: CostModel,
    /// Annual rate, converted per period for the Sharpe ratio.
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl SimulationParams {
    pub fn for_interval(interval: &IntervalParams, costs: CostModel) -> Self {
        Self {
            costs,
            risk_free_rate: STRATEGY.risk_free_rate,
            periods_per_year: interval.periods_per_year,
        }
    }

    pub fn validate(&self) -> PairResult<()> {
        self.costs.validate()?;
        if !self.risk_free_rate.is_finite() {
            return Err(PairError::invalid_parameter(format!(
                "risk-free rate {} is not finite",
                self.risk_free_rate
            )));
        }
        if !self.periods_per_year.is_finite() || self.periods_per_year <= 0.0 {
            return Err(PairError::invalid_parameter(format!(
                "periods per year must be positive, got {}",
                self.periods_per_year
            )));
        }
        Ok(())
    }
}

/// Cumulative realized net return at every timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquityCurve {
    pub timestamps_ms: Vec<i64>,
    pub values: Vec<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    pub equity: EquityCurve,
    pub report: PerformanceReport,
    /// A position still open on the last bar. It is not closed and earns nothing.
    pub open_at_end: Option<OpenPosition>,
}

pub struct TradeSimulator {
    params: SimulationParams,
}

impl TradeSimulator {
    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    /// Replays the signal series bar by bar against both legs' raw prices.
    ///
    /// Bar 0 only anchors the rolling window and is never traded. Equity only
    /// moves on bars where a trade closes.
    pub fn run(
        &self,
        signals: &SignalSeries,
        prices_a: &PriceSeries,
        prices_b: &PriceSeries,
        hedge_ratio: f64,
    ) -> PairResult<SimulationResult> {
        self.params.validate()?;
        prices_a.ensure_aligned(prices_b)?;
        ensure_same_index(signals.timestamps_ms(), prices_a.timestamps_ms())?;
        if !hedge_ratio.is_finite() {
            return Err(PairError::invalid_parameter(format!(
                "hedge ratio {} is not finite",
                hedge_ratio
            )));
        }

        let n = signals.len();
        let timestamps = signals.timestamps_ms();
        let mut state = PositionState::Flat;
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity = vec![0.0; n];
        let mut realized = 0.0;

        for i in 1..n {
            let bar = Bar {
                index: i,
                timestamp_ms: timestamps[i],
                price_a: prices_a.prices()[i],
                price_b: prices_b.prices()[i],
            };
            let transition = step(
                state,
                &bar,
                &signals.points()[i],
                hedge_ratio,
                &self.params.costs,
            );

            if debug::PRINT_TRADE_EVENTS {
                if let (PositionState::Flat, PositionState::Open(p)) = (state, transition.next) {
                    log::info!(
                        "{} opened at bar {} ({})",
                        p.direction,
                        i,
                        epoch_ms_to_utc(bar.timestamp_ms)
                    );
                }
            }

            if let Some(trade) = transition.closed {
                realized += trade.net_return;
                if debug::PRINT_TRADE_EVENTS {
                    log::info!(
                        "{} closed at bar {} ({}) after {} bars: gross {:+.5} net {:+.5}",
                        trade.direction,
                        i,
                        epoch_ms_to_utc(bar.timestamp_ms),
                        trade.bars_held(),
                        trade.gross_return,
                        trade.net_return
                    );
                }
                trades.push(trade);
            }
            equity[i] = realized;
            state = transition.next;
        }

        let open_at_end = match state {
            PositionState::Open(position) => {
                log::warn!(
                    "{} position opened at bar {} still open at the last bar; left unrealized",
                    position.direction,
                    position.entry_index
                );
                Some(position)
            }
            PositionState::Flat => None,
        };

        let report = compute_report(
            &equity,
            &trades,
            self.params.risk_free_rate,
            self.params.periods_per_year,
        );

        Ok(SimulationResult {
            trades,
            equity: EquityCurve {
                timestamps_ms: timestamps.to_vec(),
                values: equity,
            },
            report,
            open_at_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::signals::{SignalParams, generate};
    use crate::analysis::spread::SpreadSeries;
    use crate::config::intervals::DAILY;
    use crate::simulation::trade::TradeDirection;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    fn params(fee_rate: f64, slippage: f64) -> SimulationParams {
        let costs = CostModel { fee_rate, slippage };
        SimulationParams::for_interval(&DAILY, costs)
    }

    fn prices(values: &[f64]) -> PriceSeries {
        PriceSeries::new((0..values.len() as i64).collect(), values.to_vec()).unwrap()
    }

    /// Leg A constant at 100; leg B chosen so that `ln(B) - ln(A)` equals `spread`.
    fn legs_for_spread(spread: &[f64]) -> (PriceSeries, PriceSeries) {
        let a = vec![100.0; spread.len()];
        let b: Vec<f64> = spread.iter().map(|s| 100.0 * s.exp()).collect();
        (prices(&a), prices(&b))
    }

    fn signals_for(spread: &[f64], window: usize) -> SignalSeries {
        let ts = (0..spread.len() as i64).collect();
        let spread = SpreadSeries::new(ts, spread.to_vec()).unwrap();
        generate(&spread, &SignalParams::with_window(window)).unwrap()
    }

    fn noisy_spread(n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(17);
        let normal = Normal::new(0.0, 0.01).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn single_spike_gives_one_short_trade() {
        let mut spread = vec![0.0; 150];
        spread[60] = 0.01;
        let (a, b) = legs_for_spread(&spread);
        let signals = signals_for(&spread, 60);

        let result = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals, &a, &b, 1.0)
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.direction, TradeDirection::Short);
        assert_eq!((trade.entry_index, trade.exit_index), (60, 61));
        // short from e^0.01 back to 1: gross = -(1/e^0.01 - 1)
        assert_relative_eq!(trade.gross_return, 1.0 - (-0.01_f64).exp(), epsilon = 1e-12);
        assert!(result.open_at_end.is_none());
    }

    #[test]
    fn half_sine_swing_gives_one_short_trade() {
        let mut spread = vec![0.0; 60];
        spread.extend((0..=21).map(|k| 0.05 * (k as f64 * PI / 20.0).sin()));
        let (a, b) = legs_for_spread(&spread);
        let signals = signals_for(&spread, 60);

        let result = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals, &a, &b, 1.0)
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.direction, TradeDirection::Short);
        assert_eq!(trade.entry_index, 61);

        let points = signals.points();
        let first_calm = (62..points.len()).find(|&i| points[i].zscore.abs() < 0.5);
        assert_eq!(Some(trade.exit_index), first_calm);
        assert_eq!(trade.exit_index, 78);

        // entered at the start of the swing and left above that level, so the short loses
        let ret_b = (spread[78] - spread[61]).exp() - 1.0;
        assert_relative_eq!(trade.gross_return, -ret_b, epsilon = 1e-12);
        assert!(!trade.is_win());
        assert!(result.open_at_end.is_none());
    }

    #[test]
    fn zero_costs_keep_gross_equal_to_net() {
        let spread = noisy_spread(300);
        let (a, b) = legs_for_spread(&spread);
        let result = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals_for(&spread, 20), &a, &b, 1.0)
            .unwrap();
        assert!(!result.trades.is_empty());
        for trade in &result.trades {
            assert_eq!(trade.gross_return, trade.net_return);
        }
    }

    #[test]
    fn fees_cost_four_fills_per_round_trip() {
        let spread = noisy_spread(300);
        let (a, b) = legs_for_spread(&spread);
        let result = TradeSimulator::new(params(0.001, 0.0))
            .run(&signals_for(&spread, 20), &a, &b, 1.0)
            .unwrap();
        assert!(!result.trades.is_empty());
        for trade in &result.trades {
            let expected_net = trade.gross_return - 0.004;
            assert_relative_eq!(trade.net_return, expected_net, epsilon = 1e-12);
        }
    }

    #[test]
    fn trades_never_overlap_and_equity_moves_only_on_exits() {
        let spread = noisy_spread(400);
        let (a, b) = legs_for_spread(&spread);
        let result = TradeSimulator::new(params(0.0005, 0.001))
            .run(&signals_for(&spread, 30), &a, &b, 1.0)
            .unwrap();

        for trade in &result.trades {
            assert!(trade.exit_index > trade.entry_index);
        }
        for pair in result.trades.windows(2) {
            assert!(pair[1].entry_index > pair[0].exit_index);
        }

        let exits: Vec<usize> = result.trades.iter().map(|t| t.exit_index).collect();
        let values = &result.equity.values;
        assert_eq!(values[0], 0.0);
        for i in 1..values.len() {
            if !exits.contains(&i) {
                assert_eq!(values[i], values[i - 1], "equity moved at bar {}", i);
            }
        }
        assert!(result.report.max_drawdown <= 0.0);
        assert_eq!(result.report.num_trades, result.trades.len());
        assert_relative_eq!(
            result.report.total_return,
            result.trades.iter().map(|t| t.net_return).sum::<f64>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn position_open_at_end_is_dropped() {
        // rising spread: enters short at the final spike and never exits
        let mut spread = vec![0.0; 80];
        spread[79] = 0.02;
        let (a, b) = legs_for_spread(&spread);
        let result = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals_for(&spread, 60), &a, &b, 1.0)
            .unwrap();
        assert!(result.trades.is_empty());
        let open = result.open_at_end.expect("position should still be open");
        assert_eq!(open.entry_index, 79);
        assert!(result.equity.values.iter().all(|v| *v == 0.0));
        assert_eq!(result.report.total_return, 0.0);
        assert_eq!(result.report.sharpe_ratio, 0.0);
    }

    #[test]
    fn misaligned_inputs_are_rejected() {
        let spread = noisy_spread(50);
        let (a, _) = legs_for_spread(&spread);
        let b_short = prices(&vec![100.0; 49]);
        let err = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals_for(&spread, 10), &a, &b_short, 1.0)
            .unwrap_err();
        assert!(matches!(err, PairError::MisalignedSeries(_)));

        let signals = signals_for(&spread[..40], 10);
        let err = TradeSimulator::new(params(0.0, 0.0))
            .run(&signals, &a, &a, 1.0)
            .unwrap_err();
        assert!(matches!(err, PairError::MisalignedSeries(_)));
    }
}
