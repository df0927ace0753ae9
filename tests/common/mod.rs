#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use gorktrader::domain::bar::Bar;
use gorktrader::domain::error::GorkError;
use gorktrader::domain::strategy::StrategyParams;
use gorktrader::domain::enriched::IndicatorParams;
use gorktrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self) -> Result<Vec<Bar>, GorkError> {
        match &self.error {
            Some(reason) => Err(GorkError::DataLoad {
                reason: reason.clone(),
            }),
            None => Ok(self.bars.clone()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

pub fn minute(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(i as i64)
}

pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp: minute(i),
        open,
        high,
        low,
        close,
    }
}

/// Bars with open = high = low = close.
pub fn flat_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c, c, c))
        .collect()
}

/// 100 flat bars at 100 with a single spike to 150 at bar 80.
pub fn spike_series() -> Vec<Bar> {
    let mut closes = vec![100.0; 100];
    closes[80] = 150.0;
    flat_bars(&closes)
}

pub fn params(
    ma_short: usize,
    ma_long: usize,
    will_period: usize,
    will_buy_threshold: f64,
    will_sell_threshold: f64,
    stop_loss: f64,
) -> StrategyParams {
    StrategyParams {
        indicators: IndicatorParams {
            ma_short,
            ma_long,
            will_period_1: will_period,
            will_period_2: will_period,
        },
        will_buy_threshold,
        will_sell_threshold,
        stop_loss,
    }
}

pub fn ini(content: &str) -> gorktrader::adapters::file_config_adapter::FileConfigAdapter {
    gorktrader::adapters::file_config_adapter::FileConfigAdapter::from_string(content).unwrap()
}
