//! Configuration validation.
//!
//! Every key is checked before any price data is read. Keys that are absent
//! fall back to their defaults; keys that are present must parse.

use crate::domain::error::GorkError;
use crate::domain::split::Segment;
use crate::domain::strategy::StrategyVariant;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_VARIANTS: &str = "1,2,3,4";
pub const DEFAULT_SEGMENT: &str = "validation";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), GorkError> {
    let train = read_double(config, "data", "train_ratio")?.unwrap_or(0.6);
    let validation = read_double(config, "data", "validation_ratio")?.unwrap_or(0.2);

    for (key, value) in [("train_ratio", train), ("validation_ratio", validation)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid("data", key, format!("{key} must be between 0 and 1")));
        }
    }
    if train + validation > 1.0 {
        return Err(invalid(
            "data",
            "validation_ratio",
            "train_ratio + validation_ratio must not exceed 1".to_string(),
        ));
    }

    if let Some(segment) = config.get_string("data", "segment") {
        segment
            .parse::<Segment>()
            .map_err(|reason| invalid("data", "segment", reason))?;
    }
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), GorkError> {
    if let Some(capital) = read_double(config, "backtest", "initial_capital")? {
        if capital <= 0.0 {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive".to_string(),
            ));
        }
    }
    if let Some(volume) = read_double(config, "backtest", "volume")? {
        if volume <= 0.0 {
            return Err(invalid(
                "backtest",
                "volume",
                "volume must be positive".to_string(),
            ));
        }
    }
    if let Some(fee_rate) = read_double(config, "backtest", "fee_rate")? {
        if fee_rate < 0.0 {
            return Err(invalid(
                "backtest",
                "fee_rate",
                "fee_rate must be non-negative".to_string(),
            ));
        }
    }
    read_double(config, "backtest", "risk_free_rate")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), GorkError> {
    let variants = config
        .get_string("strategy", "variants")
        .unwrap_or_else(|| DEFAULT_VARIANTS.to_string());
    parse_variants(&variants).map_err(|e| invalid("strategy", "variants", e.to_string()))?;

    let mut periods = Vec::with_capacity(4);
    for key in ["ma_short", "ma_long", "will_period_1", "will_period_2"] {
        let value = read_int(config, "strategy", key)?;
        if let Some(period) = value {
            if period <= 0 {
                return Err(invalid("strategy", key, format!("{key} must be positive")));
            }
        }
        periods.push(value);
    }

    let ma_short = periods[0].unwrap_or(15);
    let ma_long = periods[1].unwrap_or(20);
    if ma_short >= ma_long {
        return Err(invalid(
            "strategy",
            "ma_short",
            "ma_short must be less than ma_long".to_string(),
        ));
    }

    read_double(config, "strategy", "will_buy_threshold_1")?;
    read_double(config, "strategy", "will_sell_threshold_2")?;

    if let Some(stop_loss) = read_double(config, "strategy", "stop_loss")? {
        if stop_loss < 0.0 {
            return Err(invalid(
                "strategy",
                "stop_loss",
                "stop_loss must be non-negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Parse a comma-separated list of variant ids, e.g. `"1, 3"`.
pub fn parse_variants(raw: &str) -> Result<Vec<StrategyVariant>, GorkError> {
    let mut variants = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id: i64 = part.parse().map_err(|_| GorkError::InvalidParameter {
            reason: format!("variant id '{part}' is not an integer"),
        })?;
        variants.push(StrategyVariant::from_id(id)?);
    }
    if variants.is_empty() {
        return Err(GorkError::InvalidParameter {
            reason: "no strategy variants selected".to_string(),
        });
    }
    Ok(variants)
}

fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, GorkError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(section, key, format!("'{raw}' is not a number"))),
        },
    }
}

fn read_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, GorkError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{raw}' is not an integer"))),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> GorkError {
    GorkError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(result: Result<(), GorkError>) -> String {
        match result {
            Err(GorkError::ConfigInvalid { key, .. }) => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        let c = config("");
        assert!(validate_data_config(&c).is_ok());
        assert!(validate_backtest_config(&c).is_ok());
        assert!(validate_strategy_config(&c).is_ok());
    }

    #[test]
    fn full_config_validates() {
        let c = config(
            r#"
[data]
path = prices.csv
train_ratio = 0.5
validation_ratio = 0.25
segment = test

[backtest]
initial_capital = 500000
volume = 100
fee_rate = 0.0001
risk_free_rate = 0.0002

[strategy]
variants = 1, 4
ma_short = 5
ma_long = 30
will_period_1 = 14
will_buy_threshold_1 = -80
will_period_2 = 14
will_sell_threshold_2 = -20
stop_loss = 0.01
"#,
        );
        assert!(validate_data_config(&c).is_ok());
        assert!(validate_backtest_config(&c).is_ok());
        assert!(validate_strategy_config(&c).is_ok());
    }

    #[test]
    fn ratio_out_of_range() {
        let c = config("[data]\ntrain_ratio = 1.2\n");
        assert_eq!(invalid_key(validate_data_config(&c)), "train_ratio");
    }

    #[test]
    fn ratios_sum_above_one() {
        let c = config("[data]\ntrain_ratio = 0.7\nvalidation_ratio = 0.4\n");
        assert_eq!(invalid_key(validate_data_config(&c)), "validation_ratio");
    }

    #[test]
    fn unknown_segment() {
        let c = config("[data]\nsegment = holdout\n");
        assert_eq!(invalid_key(validate_data_config(&c)), "segment");
    }

    #[test]
    fn non_positive_capital_and_volume() {
        let c = config("[backtest]\ninitial_capital = 0\n");
        assert_eq!(invalid_key(validate_backtest_config(&c)), "initial_capital");

        let c = config("[backtest]\nvolume = -5\n");
        assert_eq!(invalid_key(validate_backtest_config(&c)), "volume");
    }

    #[test]
    fn negative_fee_rate() {
        let c = config("[backtest]\nfee_rate = -0.01\n");
        assert_eq!(invalid_key(validate_backtest_config(&c)), "fee_rate");
    }

    #[test]
    fn unparsable_number_is_invalid() {
        let c = config("[backtest]\nrisk_free_rate = lots\n");
        assert_eq!(invalid_key(validate_backtest_config(&c)), "risk_free_rate");

        let c = config("[strategy]\nma_long = twenty\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "ma_long");
    }

    #[test]
    fn short_window_must_be_below_long() {
        let c = config("[strategy]\nma_short = 20\nma_long = 20\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "ma_short");

        // Default ma_long is 20.
        let c = config("[strategy]\nma_short = 25\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "ma_short");
    }

    #[test]
    fn zero_period() {
        let c = config("[strategy]\nwill_period_2 = 0\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "will_period_2");
    }

    #[test]
    fn negative_stop_loss() {
        let c = config("[strategy]\nstop_loss = -0.003\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "stop_loss");
    }

    #[test]
    fn unknown_variant_in_config() {
        let c = config("[strategy]\nvariants = 1,5\n");
        assert_eq!(invalid_key(validate_strategy_config(&c)), "variants");
    }

    #[test]
    fn parse_variants_list() {
        let variants = parse_variants(" 3 , 1,").unwrap();
        let ids: Vec<u8> = variants.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![3, 1]);

        assert!(matches!(
            parse_variants("2,x"),
            Err(GorkError::InvalidParameter { .. })
        ));
        assert!(matches!(
            parse_variants("9"),
            Err(GorkError::UnknownVariant { id: 9 })
        ));
        assert!(parse_variants(" , ").is_err());
    }
}
