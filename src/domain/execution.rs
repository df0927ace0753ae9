//! Trade execution and ledger accounting.
//!
//! Every closed position becomes one [`Trade`]. Fees are a flat rate on
//! traded notional: `fee = price * volume * fee_rate`. The account is debited
//! the entry fee and then credited the net profit, where net profit only nets
//! out the exit fee. The entry fee therefore reduces capital but is not part of
//! the recorded `profit`.

use chrono::NaiveDateTime;
use std::fmt;

use super::position::OpenPosition;

pub const DEFAULT_VOLUME: f64 = 200.0;
pub const DEFAULT_FEE_RATE: f64 = 0.00002;

/// Fill sizing and fee parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub volume: f64,
    pub fee_rate: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            volume: DEFAULT_VOLUME,
            fee_rate: DEFAULT_FEE_RATE,
        }
    }
}

/// Why a position was closed. Declaration order is the tie-break priority
/// when several exit conditions hold on the same bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum ExitReason {
    StopLoss,
    DeathCross,
    PriceBelowLongMa,
    WilliamsOverbought,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::DeathCross => "death_cross",
            ExitReason::PriceBelowLongMa => "price_below_long_ma",
            ExitReason::WilliamsOverbought => "williams_overbought",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution side of a position close.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitFill {
    pub price: f64,
    pub time: NaiveDateTime,
    pub index: usize,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_fee: f64,
    pub exit_fee: f64,
    /// Gross profit minus the exit fee.
    pub profit: f64,
    /// Account balance after this trade.
    pub capital: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Number of bars between entry and exit fills.
    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

/// Append-only trade ledger and the running account balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub capital: f64,
    pub trades: Vec<Trade>,
    config: ExecutionConfig,
}

impl Ledger {
    pub fn new(initial_capital: f64, config: ExecutionConfig) -> Self {
        Ledger {
            capital: initial_capital,
            trades: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Record a closed position and return the updated capital.
    pub fn execute_trade(&mut self, position: &OpenPosition, exit: ExitFill) -> f64 {
        let volume = self.config.volume;
        let entry_fee = position.entry_price * volume * self.config.fee_rate;
        let exit_fee = exit.price * volume * self.config.fee_rate;

        self.capital -= entry_fee;
        let gross_profit = (exit.price - position.entry_price) * volume;
        let net_profit = gross_profit - exit_fee;
        self.capital += net_profit;

        self.trades.push(Trade {
            entry_time: position.entry_time,
            exit_time: exit.time,
            entry_price: position.entry_price,
            exit_price: exit.price,
            entry_index: position.entry_index,
            exit_index: exit.index,
            entry_fee,
            exit_fee,
            profit: net_profit,
            capital: self.capital,
            exit_reason: exit.reason,
        });

        self.capital
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
