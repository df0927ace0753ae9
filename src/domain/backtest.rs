//! Backtest engine: the per-bar flat/long state machine.
//!
//! Bars are scanned from index 1 to `len - 2`. Each decision made at bar `i`
//! fills at `open[i + 1]`. Entries are only considered once
//! `i >= max(ma_long, will_period_1)`. While long, the exit conditions are
//! checked in priority order stop-loss, trend exit, Williams overbought; the
//! first one that holds names the exit reason. A position still open after the
//! scan is closed at the final bar's close with reason `end_of_data`. An entry
//! decided at `len - 2` therefore fills and closes on the same last bar.

use chrono::NaiveDateTime;

use super::bar::Bar;
use super::enriched::{add_indicators, EnrichedSeries};
use super::error::GorkError;
use super::execution::{ExecutionConfig, ExitFill, ExitReason, Ledger, Trade};
use super::metrics::DEFAULT_RISK_FREE_RATE;
use super::position::{OpenPosition, PositionState};
use super::strategy::{StrategyParams, StrategyVariant};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub execution: ExecutionConfig,
    /// Per-period rate the Sharpe ratios are measured against.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            execution: ExecutionConfig::default(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

/// One entry of the per-trade return series, keyed by exit time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnPoint {
    pub exit_time: NaiveDateTime,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub variant: StrategyVariant,
    pub trades: Vec<Trade>,
    pub returns: Vec<ReturnPoint>,
    pub initial_capital: f64,
    pub final_capital: f64,
}

impl BacktestResult {
    /// Profit values of the return series, in exit order.
    pub fn return_values(&self) -> Vec<f64> {
        self.returns.iter().map(|r| r.profit).collect()
    }
}

/// Validate parameters, compute indicators and run one variant over `bars`.
///
/// Only parameter validation can fail; the simulation itself always completes.
pub fn simulate_strategy(
    variant: StrategyVariant,
    bars: &[Bar],
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, GorkError> {
    params.validate()?;
    let series = add_indicators(bars, &params.indicators);
    Ok(run_backtest(variant, &series, params, config))
}

/// Run the state machine over a pre-computed series.
pub fn run_backtest(
    variant: StrategyVariant,
    series: &EnrichedSeries,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> BacktestResult {
    let bars = &series.bars;
    let lookback = params.indicators.entry_lookback();
    let mut ledger = Ledger::new(config.initial_capital, config.execution);
    let mut state = PositionState::Flat;

    for i in 1..bars.len().saturating_sub(1) {
        state = match state {
            PositionState::Flat => {
                if i >= lookback && entry_signal(variant, series, params, i) {
                    let position = OpenPosition {
                        entry_price: bars[i + 1].open,
                        entry_time: bars[i + 1].timestamp,
                        entry_index: i + 1,
                    };
                    tracing::debug!(
                        variant = variant.id(),
                        signal_index = i,
                        entry_index = position.entry_index,
                        entry_price = position.entry_price,
                        "enter long"
                    );
                    PositionState::Long(position)
                } else {
                    PositionState::Flat
                }
            }
            PositionState::Long(position) => {
                match exit_reason(variant, series, params, &position, i) {
                    Some(reason) => {
                        let fill = ExitFill {
                            price: bars[i + 1].open,
                            time: bars[i + 1].timestamp,
                            index: i + 1,
                            reason,
                        };
                        close_position(&mut ledger, &position, fill, variant);
                        PositionState::Flat
                    }
                    None => PositionState::Long(position),
                }
            }
        };
    }

    if let PositionState::Long(position) = state {
        if bars.len() > 1 {
            let last = bars.len() - 1;
            let fill = ExitFill {
                price: bars[last].close,
                time: bars[last].timestamp,
                index: last,
                reason: ExitReason::EndOfData,
            };
            close_position(&mut ledger, &position, fill, variant);
        }
    }

    let final_capital = ledger.capital;
    let trades = ledger.into_trades();
    let returns = trades
        .iter()
        .map(|t| ReturnPoint {
            exit_time: t.exit_time,
            profit: t.profit,
        })
        .collect();

    tracing::info!(
        variant = variant.id(),
        bars = bars.len(),
        trades = trades.len(),
        final_capital,
        "simulation complete"
    );

    BacktestResult {
        variant,
        trades,
        returns,
        initial_capital: config.initial_capital,
        final_capital,
    }
}

fn entry_signal(
    variant: StrategyVariant,
    series: &EnrichedSeries,
    params: &StrategyParams,
    i: usize,
) -> bool {
    let oversold = series
        .williams_entry
        .get(i)
        .is_some_and(|w| w < params.will_buy_threshold);
    variant.entry.holds(series, i) && oversold
}

fn exit_reason(
    variant: StrategyVariant,
    series: &EnrichedSeries,
    params: &StrategyParams,
    position: &OpenPosition,
    i: usize,
) -> Option<ExitReason> {
    let stop_loss = position.stop_loss_triggered(series.bars[i].close, params.stop_loss);
    let trend_exit = variant.exit.holds(series, i);
    let overbought = series
        .williams_exit
        .get(i)
        .is_some_and(|w| w > params.will_sell_threshold);

    if stop_loss {
        Some(ExitReason::StopLoss)
    } else if trend_exit {
        Some(variant.exit.reason())
    } else if overbought {
        Some(ExitReason::WilliamsOverbought)
    } else {
        None
    }
}

fn close_position(
    ledger: &mut Ledger,
    position: &OpenPosition,
    fill: ExitFill,
    variant: StrategyVariant,
) {
    let exit_index = fill.index;
    let exit_price = fill.price;
    let reason = fill.reason;
    let capital = ledger.execute_trade(position, fill);
    tracing::debug!(
        variant = variant.id(),
        entry_index = position.entry_index,
        exit_index,
        exit_price,
        volume = ledger.config().volume,
        reason = %reason,
        capital,
        "exit long"
    );
}
