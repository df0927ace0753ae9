//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n, kept as a running window sum.
//! Warmup: first (n-1) bars have no value.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        if period == 0 || i + 1 < period {
            values.push(None);
        } else {
            values.push(Some(window_sum / period as f64));
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + chrono::Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.len(), 5);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert!(series.get(2).is_some());
    }

    #[test]
    fn sma_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.get(2), Some(20.0));
        assert_eq!(series.get(3), Some(30.0));
        assert_eq!(series.get(4), Some(40.0));
    }

    #[test]
    fn sma_period_one_is_close() {
        let bars = make_bars(&[7.0, 8.5]);
        let series = calculate_sma(&bars, 1);
        assert_eq!(series.values, vec![Some(7.0), Some(8.5)]);
    }

    #[test]
    fn sma_longer_than_series() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 5);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn sma_zero_period_has_no_values() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 0);
        assert_eq!(series.values, vec![None, None]);
        assert_eq!(series.indicator_type, IndicatorType::Sma(0));
    }

    #[test]
    fn sma_rolls_window_forward() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);
        let series = calculate_sma(&bars, 2);
        assert_eq!(
            series.values,
            vec![None, Some(1.5), Some(2.5), Some(6.5), Some(15.0), Some(25.0)]
        );
    }
}
