//! OHLC price bar and series summary.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Shape of a loaded price series: row count, time span and price extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSummary {
    pub rows: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub min_price: f64,
    pub max_price: f64,
}

impl DataSummary {
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let mut min_price = f64::INFINITY;
        let mut max_price = f64::NEG_INFINITY;
        for bar in bars {
            for price in [bar.open, bar.high, bar.low, bar.close] {
                min_price = min_price.min(price);
                max_price = max_price.max(price);
            }
        }

        Some(DataSummary {
            rows: bars.len(),
            start: first.timestamp,
            end: last.timestamp,
            min_price,
            max_price,
        })
    }
}
