//! Williams %R oscillator.
//!
//! HH = max(H[i-n+1..=i]), LL = min(L[i-n+1..=i])
//! %R[i] = -100 * (HH - C[i]) / (HH - LL), forced to 0 when HH == LL.
//! Warmup: first (n-1) bars have no value.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_williams_r(bars: &[Bar], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let highest_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

            if highest_high == lowest_low {
                return Some(0.0);
            }
            Some(-100.0 * (highest_high - bars[i].close) / (highest_high - lowest_low))
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::WilliamsR(period),
        values,
    }
}
