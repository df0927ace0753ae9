//! End-to-end simulation tests.
//!
//! Tests cover:
//! - Known-trade scenarios for all four variants on a spike series
//! - Stop-loss priority and re-entry after a stop
//! - End-of-data liquidation
//! - Report numbers for a hand-computed trade list
//! - Invariants under random price paths (no overlap, capital chain, determinism)

mod common;

use approx::assert_relative_eq;
use common::*;
use gorktrader::domain::backtest::{BacktestConfig, simulate_strategy};
use gorktrader::domain::execution::ExitReason;
use gorktrader::domain::metrics::{PerformanceReport, best_by_msr};
use gorktrader::domain::strategy::StrategyVariant;
use proptest::prelude::*;

fn variant(id: i64) -> StrategyVariant {
    StrategyVariant::from_id(id).unwrap()
}

mod spike_scenarios {
    use super::*;

    #[test]
    fn golden_cross_then_death_cross() {
        let bars = spike_series();
        let p = params(5, 10, 10, 1.0, 1.0, 1.0);
        let result = simulate_strategy(variant(1), &bars, &p, &BacktestConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_index, 81);
        assert_eq!(trade.exit_index, 86);
        assert_eq!(trade.entry_time, minute(81));
        assert_eq!(trade.exit_time, minute(86));
        assert_relative_eq!(trade.entry_price, 100.0);
        assert_relative_eq!(trade.exit_price, 100.0);
        assert_eq!(trade.exit_reason, ExitReason::DeathCross);
        // Only the exit fee reaches profit.
        assert_relative_eq!(trade.profit, -0.4, epsilon = 1e-9);
        assert_relative_eq!(trade.capital, 999_999.2, epsilon = 1e-6);
        assert_relative_eq!(result.final_capital, 999_999.2, epsilon = 1e-6);
    }

    #[test]
    fn price_entry_matches_cross_entry_on_spike() {
        let bars = spike_series();
        let p = params(5, 10, 10, 1.0, 1.0, 1.0);
        let result = simulate_strategy(variant(3), &bars, &p, &BacktestConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_index, 81);
        assert_eq!(result.trades[0].exit_index, 86);
        assert_eq!(result.trades[0].exit_reason, ExitReason::DeathCross);
    }

    #[test]
    fn price_exit_fires_on_first_bar_below_long_ma() {
        let bars = spike_series();
        let p = params(5, 10, 10, 1.0, 1.0, 1.0);
        for id in [2, 4] {
            let result =
                simulate_strategy(variant(id), &bars, &p, &BacktestConfig::default()).unwrap();
            assert_eq!(result.trades.len(), 1, "variant {id}");
            let trade = &result.trades[0];
            assert_eq!(trade.entry_index, 81, "variant {id}");
            assert_eq!(trade.exit_index, 82, "variant {id}");
            assert_eq!(trade.exit_reason, ExitReason::PriceBelowLongMa, "variant {id}");
        }
    }

    #[test]
    fn strict_buy_threshold_blocks_entry() {
        // Williams %R at the spike is 0, which is not below 0.
        let bars = spike_series();
        let p = params(5, 10, 10, 0.0, 1.0, 1.0);
        let result = simulate_strategy(variant(1), &bars, &p, &BacktestConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_relative_eq!(result.final_capital, 1_000_000.0);
    }
}

mod stop_loss {
    use super::*;

    fn stop_series() -> Vec<gorktrader::domain::bar::Bar> {
        let mut bars = spike_series();
        // Opens at the entry price, closes 1% lower.
        bars[81] = make_bar(81, 100.0, 100.0, 99.0, 99.0);
        bars
    }

    #[test]
    fn stop_loss_exits_at_next_open() {
        let bars = stop_series();
        let p = params(5, 10, 10, 1.0, 1.0, 0.01);
        let result = simulate_strategy(variant(1), &bars, &p, &BacktestConfig::default()).unwrap();

        let first = &result.trades[0];
        assert_eq!(first.entry_index, 81);
        assert_relative_eq!(first.entry_price, 100.0);
        assert_eq!(first.exit_index, 82);
        assert_relative_eq!(first.exit_price, 100.0);
        assert_eq!(first.exit_reason, ExitReason::StopLoss);
    }

    #[test]
    fn re_entry_after_stop_is_liquidated_at_end() {
        let bars = stop_series();
        let p = params(5, 10, 10, 1.0, 1.0, 0.01);
        let result = simulate_strategy(variant(1), &bars, &p, &BacktestConfig::default()).unwrap();

        // The 99 close drags SMA(10) under SMA(5) once the spike leaves the window.
        assert_eq!(result.trades.len(), 2);
        let second = &result.trades[1];
        assert_eq!(second.entry_index, 91);
        assert_eq!(second.exit_index, 99);
        assert_eq!(second.exit_time, minute(99));
        assert_eq!(second.exit_reason, ExitReason::EndOfData);
        assert_relative_eq!(second.exit_price, 100.0);
    }

    #[test]
    fn looser_stop_keeps_position_until_trend_exit() {
        let bars = stop_series();
        let p = params(5, 10, 10, 1.0, 1.0, 0.02);
        let result = simulate_strategy(variant(1), &bars, &p, &BacktestConfig::default()).unwrap();
        assert_eq!(result.trades[0].exit_index, 86);
        assert_eq!(result.trades[0].exit_reason, ExitReason::DeathCross);
    }
}

mod reports {
    use super::*;

    #[test]
    fn report_from_spike_run() {
        let bars = spike_series();
        let p = params(5, 10, 10, 1.0, 1.0, 1.0);
        let config = BacktestConfig::default();
        let result = simulate_strategy(variant(1), &bars, &p, &config).unwrap();
        let report =
            PerformanceReport::from_result(&variant(1).to_string(), &result, config.risk_free_rate);

        assert_eq!(report.strategy_name, "Strategy 1: MA entry + MA exit");
        assert_eq!(report.trade_count, 1);
        assert_relative_eq!(report.win_rate, 0.0);
        assert_relative_eq!(report.avg_duration, 5.0);
        assert_relative_eq!(report.expectancy, -0.4, epsilon = 1e-9);
        assert_relative_eq!(report.total_return, -0.8 / 1_000_000.0, epsilon = 1e-12);
        // A single return has no dispersion.
        assert_relative_eq!(report.msr, 0.0);
        assert_relative_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.exit_reasons.get(&ExitReason::DeathCross), Some(&1));
    }

    #[test]
    fn best_variant_over_all_four() {
        let bars = spike_series();
        let p = params(5, 10, 10, 1.0, 1.0, 1.0);
        let config = BacktestConfig::default();
        let reports: Vec<PerformanceReport> = StrategyVariant::ALL
            .iter()
            .map(|&v| {
                let result = simulate_strategy(v, &bars, &p, &config).unwrap();
                PerformanceReport::from_result(&v.to_string(), &result, config.risk_free_rate)
            })
            .collect();

        // Every MSR is 0, so the first report wins.
        let best = best_by_msr(&reports).unwrap();
        assert_eq!(best.strategy_name, reports[0].strategy_name);
    }
}

fn random_bars(steps: Vec<(f64, f64, f64)>) -> Vec<gorktrader::domain::bar::Bar> {
    let mut close = 100.0_f64;
    steps
        .into_iter()
        .enumerate()
        .map(|(i, (delta, wick_up, wick_down))| {
            let open = close;
            close = (close + delta).max(1.0);
            let high = open.max(close) + wick_up;
            let low = (open.min(close) - wick_down).max(0.5);
            make_bar(i, open, high, low, close)
        })
        .collect()
}

proptest! {
    #[test]
    fn trades_are_ordered_and_never_overlap(
        steps in prop::collection::vec((-2.0f64..2.0, 0.0f64..1.0, 0.0f64..1.0), 0..160),
        id in 1i64..=4,
    ) {
        let bars = random_bars(steps);
        let p = params(3, 8, 6, -20.0, -80.0, 0.01);
        let result = simulate_strategy(variant(id), &bars, &p, &BacktestConfig::default()).unwrap();

        for trade in &result.trades {
            prop_assert!(trade.entry_index >= 1);
            prop_assert!(trade.exit_index < bars.len());
            if trade.exit_index == trade.entry_index {
                // Entry filled on the last bar and closed by the end-of-data flush.
                prop_assert_eq!(trade.exit_reason, ExitReason::EndOfData);
                prop_assert_eq!(trade.exit_index, bars.len() - 1);
                prop_assert_eq!(trade.entry_time, trade.exit_time);
            } else {
                prop_assert!(trade.exit_index > trade.entry_index);
                prop_assert!(trade.entry_time < trade.exit_time);
            }
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }
        prop_assert_eq!(result.returns.len(), result.trades.len());
    }

    #[test]
    fn capital_chains_through_every_trade(
        steps in prop::collection::vec((-2.0f64..2.0, 0.0f64..1.0, 0.0f64..1.0), 20..160),
        id in 1i64..=4,
    ) {
        let bars = random_bars(steps);
        let p = params(3, 8, 6, -20.0, -80.0, 0.01);
        let config = BacktestConfig::default();
        let result = simulate_strategy(variant(id), &bars, &p, &config).unwrap();

        let mut capital = config.initial_capital;
        for trade in &result.trades {
            capital = capital - trade.entry_fee + trade.profit;
            prop_assert!((trade.capital - capital).abs() < 1e-6);
        }
        prop_assert!((result.final_capital - capital).abs() < 1e-6);
    }

    #[test]
    fn simulation_is_deterministic(
        steps in prop::collection::vec((-2.0f64..2.0, 0.0f64..1.0, 0.0f64..1.0), 0..120),
        id in 1i64..=4,
    ) {
        let bars = random_bars(steps);
        let p = params(3, 8, 6, -20.0, -80.0, 0.01);
        let config = BacktestConfig::default();
        let first = simulate_strategy(variant(id), &bars, &p, &config).unwrap();
        let second = simulate_strategy(variant(id), &bars, &p, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}
