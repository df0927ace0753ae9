//! Batch indicator pre-pass: price bars plus the four aligned indicator series
//! the strategy rules read.

use crate::domain::bar::Bar;
use crate::domain::error::GorkError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::williams::calculate_williams_r;

/// Window lengths for the moving averages and both Williams %R oscillators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ma_short: usize,
    pub ma_long: usize,
    /// Williams %R window used for entries.
    pub will_period_1: usize,
    /// Williams %R window used for exits.
    pub will_period_2: usize,
}

impl IndicatorParams {
    /// Reject non-positive windows and `ma_short >= ma_long`.
    pub fn validate(&self) -> Result<(), GorkError> {
        let periods = [
            ("ma_short", self.ma_short),
            ("ma_long", self.ma_long),
            ("will_period_1", self.will_period_1),
            ("will_period_2", self.will_period_2),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(GorkError::InvalidParameter {
                    reason: format!("{name} must be positive"),
                });
            }
        }
        if self.ma_short >= self.ma_long {
            return Err(GorkError::InvalidParameter {
                reason: format!(
                    "ma_short ({}) must be less than ma_long ({})",
                    self.ma_short, self.ma_long
                ),
            });
        }
        Ok(())
    }

    /// First bar index at which entries may be evaluated.
    pub fn entry_lookback(&self) -> usize {
        self.ma_long.max(self.will_period_1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    pub bars: Vec<Bar>,
    pub ma_short: IndicatorSeries,
    pub ma_long: IndicatorSeries,
    pub williams_entry: IndicatorSeries,
    pub williams_exit: IndicatorSeries,
}

pub fn add_indicators(bars: &[Bar], params: &IndicatorParams) -> EnrichedSeries {
    EnrichedSeries {
        bars: bars.to_vec(),
        ma_short: calculate_sma(bars, params.ma_short),
        ma_long: calculate_sma(bars, params.ma_long),
        williams_entry: calculate_williams_r(bars, params.will_period_1),
        williams_exit: calculate_williams_r(bars, params.will_period_2),
    }
}
