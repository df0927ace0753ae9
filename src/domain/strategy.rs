//! Strategy variants and their parameters.
//!
//! All variants share one entry/exit state machine and differ only in the trend
//! predicate used on each side:
//!
//! | id | entry                 | exit                    |
//! |----|-----------------------|-------------------------|
//! | 1  | golden cross          | death cross             |
//! | 2  | golden cross          | price below long MA     |
//! | 3  | price above short MA  | death cross             |
//! | 4  | price above short MA  | price below long MA     |

use std::fmt;

use super::enriched::{EnrichedSeries, IndicatorParams};
use super::error::GorkError;
use super::execution::ExitReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntrySignal {
    /// `ma_short[i] > ma_long[i]` and `ma_short[i-1] <= ma_long[i-1]`.
    GoldenCross,
    /// `close[i] > ma_short[i]`.
    PriceAboveShortMa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitSignal {
    /// `ma_short[i] < ma_long[i]`.
    DeathCross,
    /// `close[i] < ma_long[i]`.
    PriceBelowLongMa,
}

impl EntrySignal {
    /// Missing indicator values never signal.
    pub fn holds(&self, series: &EnrichedSeries, i: usize) -> bool {
        match self {
            EntrySignal::GoldenCross => {
                if i == 0 {
                    return false;
                }
                match (
                    series.ma_short.get(i),
                    series.ma_long.get(i),
                    series.ma_short.get(i - 1),
                    series.ma_long.get(i - 1),
                ) {
                    (Some(short), Some(long), Some(prev_short), Some(prev_long)) => {
                        short > long && prev_short <= prev_long
                    }
                    _ => false,
                }
            }
            EntrySignal::PriceAboveShortMa => series
                .ma_short
                .get(i)
                .is_some_and(|short| series.bars[i].close > short),
        }
    }
}

impl ExitSignal {
    /// Missing indicator values never signal.
    pub fn holds(&self, series: &EnrichedSeries, i: usize) -> bool {
        match self {
            ExitSignal::DeathCross => match (series.ma_short.get(i), series.ma_long.get(i)) {
                (Some(short), Some(long)) => short < long,
                _ => false,
            },
            ExitSignal::PriceBelowLongMa => series
                .ma_long
                .get(i)
                .is_some_and(|long| series.bars[i].close < long),
        }
    }

    pub fn reason(&self) -> ExitReason {
        match self {
            ExitSignal::DeathCross => ExitReason::DeathCross,
            ExitSignal::PriceBelowLongMa => ExitReason::PriceBelowLongMa,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrategyVariant {
    pub entry: EntrySignal,
    pub exit: ExitSignal,
}

impl StrategyVariant {
    pub const ALL: [StrategyVariant; 4] = [
        StrategyVariant {
            entry: EntrySignal::GoldenCross,
            exit: ExitSignal::DeathCross,
        },
        StrategyVariant {
            entry: EntrySignal::GoldenCross,
            exit: ExitSignal::PriceBelowLongMa,
        },
        StrategyVariant {
            entry: EntrySignal::PriceAboveShortMa,
            exit: ExitSignal::DeathCross,
        },
        StrategyVariant {
            entry: EntrySignal::PriceAboveShortMa,
            exit: ExitSignal::PriceBelowLongMa,
        },
    ];

    pub fn from_id(id: i64) -> Result<Self, GorkError> {
        match id {
            1..=4 => Ok(Self::ALL[(id - 1) as usize]),
            _ => Err(GorkError::UnknownVariant { id }),
        }
    }

    pub fn id(&self) -> u8 {
        match (self.entry, self.exit) {
            (EntrySignal::GoldenCross, ExitSignal::DeathCross) => 1,
            (EntrySignal::GoldenCross, ExitSignal::PriceBelowLongMa) => 2,
            (EntrySignal::PriceAboveShortMa, ExitSignal::DeathCross) => 3,
            (EntrySignal::PriceAboveShortMa, ExitSignal::PriceBelowLongMa) => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.id() {
            1 => "MA entry + MA exit",
            2 => "MA entry + price exit",
            3 => "Price entry + MA exit",
            _ => "Price entry + price exit",
        }
    }
}

impl fmt::Display for StrategyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Strategy {}: {}", self.id(), self.name())
    }
}

/// Indicator windows plus the thresholds the rules compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub indicators: IndicatorParams,
    /// Entry needs `williams_entry < will_buy_threshold`.
    pub will_buy_threshold: f64,
    /// Exit fires on `williams_exit > will_sell_threshold`.
    pub will_sell_threshold: f64,
    /// Fractional adverse move from entry that forces an exit.
    pub stop_loss: f64,
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), GorkError> {
        self.indicators.validate()?;
        if !self.stop_loss.is_finite() || self.stop_loss < 0.0 {
            return Err(GorkError::InvalidParameter {
                reason: format!("stop_loss must be non-negative, got {}", self.stop_loss),
            });
        }
        Ok(())
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            indicators: IndicatorParams {
                ma_short: 15,
                ma_long: 20,
                will_period_1: 40,
                will_period_2: 60,
            },
            will_buy_threshold: -50.0,
            will_sell_threshold: -50.0,
            stop_loss: 0.003,
        }
    }
}
