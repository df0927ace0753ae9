//! Technical indicator implementations.
//!
//! - `IndicatorType`: indicator identity + window length
//! - `IndicatorSeries`: per-bar values aligned 1:1 with the input bars;
//!   `None` marks the warmup bars whose window has not filled yet

pub mod sma;
pub mod williams;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    WilliamsR(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` during warmup or past the end of the series.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLR({})", period),
        }
    }
}
