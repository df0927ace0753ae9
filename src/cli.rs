//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvAdapter, write_trades_csv};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, DEFAULT_INITIAL_CAPITAL, simulate_strategy,
};
use crate::domain::bar::{Bar, DataSummary};
use crate::domain::config_validation::{
    DEFAULT_SEGMENT, DEFAULT_VARIANTS, parse_variants, validate_backtest_config,
    validate_data_config, validate_strategy_config,
};
use crate::domain::enriched::IndicatorParams;
use crate::domain::error::GorkError;
use crate::domain::execution::{DEFAULT_FEE_RATE, DEFAULT_VOLUME, ExecutionConfig};
use crate::domain::metrics::{DEFAULT_RISK_FREE_RATE, PerformanceReport};
use crate::domain::split::{
    DEFAULT_TRAIN_RATIO, DEFAULT_VALIDATION_RATIO, Segment, split_bars,
};
use crate::domain::strategy::{StrategyParams, StrategyVariant};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "gorktrader", about = "Moving-average / Williams %R strategy backtester")]
pub struct Cli {
    /// Log filter, e.g. `info` or `gorktrader=debug`
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one or more strategy variants over a price file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV, overrides `[data] path`
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Variant id (1-4); repeatable, overrides `[strategy] variants`
        #[arg(short, long)]
        variant: Vec<i64>,
        /// train, validation, test or all
        #[arg(short, long)]
        segment: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write every closed trade to this CSV
        #[arg(short, long)]
        trades: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show row count, time range, price range and split sizes of a price file
    Info {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the price data comes from and which slice of it to trade.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
    pub train_ratio: f64,
    pub validation_ratio: f64,
    pub segment: Segment,
}

impl DataSettings {
    pub fn require_path(&self) -> Result<&Path, GorkError> {
        self.path.as_deref().ok_or_else(|| GorkError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            path: None,
            train_ratio: DEFAULT_TRAIN_RATIO,
            validation_ratio: DEFAULT_VALIDATION_RATIO,
            segment: Segment::Validation,
        }
    }
}

/// Per-variant simulation results and their reports, in request order.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub results: Vec<BacktestResult>,
    pub reports: Vec<PerformanceReport>,
}

pub fn run(cli: Cli) -> ExitCode {
    if let Err(e) = logging::init_tracing(&cli.log_level) {
        eprintln!("warning: {e}");
    }

    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            variant,
            segment,
            format,
            trades,
        } => run_backtest(
            &config,
            data,
            &variant,
            segment.as_deref(),
            format,
            trades.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data, config } => run_info(data, config.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, GorkError> {
    FileConfigAdapter::from_file(path).map_err(|e| GorkError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), GorkError> {
    validate_data_config(config)?;
    validate_backtest_config(config)?;
    validate_strategy_config(config)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<PathBuf>,
    variant_overrides: &[i64],
    segment_override: Option<&str>,
    format: OutputFormat,
    trades_path: Option<&Path>,
) -> Result<(), GorkError> {
    tracing::info!(config = %config_path.display(), "loading config");
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let reporter = report_adapter(format)?;
    let settings = build_data_settings(&config, data_override, segment_override)?;
    let variants = resolve_variants(variant_overrides, &config)?;
    let params = build_strategy_params(&config);
    let bt_config = build_backtest_config(&config);

    let data_port = CsvAdapter::new(settings.require_path()?.to_path_buf());
    tracing::info!(
        data = %data_port.path().display(),
        segment = %settings.segment,
        "loading bars"
    );
    let output = run_backtest_pipeline(&data_port, &settings, &variants, &params, &bt_config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    reporter.write_all(&output.reports, &mut out)?;
    out.flush()?;

    if let Some(path) = trades_path {
        write_trades_csv(path, &output.results)?;
        tracing::info!(path = %path.display(), "trade log written");
    }
    Ok(())
}

pub fn report_adapter(format: OutputFormat) -> Result<Box<dyn ReportPort>, GorkError> {
    match format {
        OutputFormat::Text => Ok(Box::new(TextReportAdapter)),
        #[cfg(feature = "json")]
        OutputFormat::Json => Ok(Box::new(
            crate::adapters::json_report::JsonReportAdapter { pretty: true },
        )),
        #[cfg(not(feature = "json"))]
        OutputFormat::Json => Err(GorkError::ConfigInvalid {
            section: "output".into(),
            key: "format".into(),
            reason: "json output requires the `json` feature".into(),
        }),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        execution: ExecutionConfig {
            volume: config.get_double("backtest", "volume", DEFAULT_VOLUME),
            fee_rate: config.get_double("backtest", "fee_rate", DEFAULT_FEE_RATE),
        },
        risk_free_rate: config.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
    }
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let defaults = StrategyParams::default();
    let period = |key: &str, default: usize| {
        let value = config.get_int("strategy", key, default as i64);
        usize::try_from(value).unwrap_or(0)
    };

    StrategyParams {
        indicators: IndicatorParams {
            ma_short: period("ma_short", defaults.indicators.ma_short),
            ma_long: period("ma_long", defaults.indicators.ma_long),
            will_period_1: period("will_period_1", defaults.indicators.will_period_1),
            will_period_2: period("will_period_2", defaults.indicators.will_period_2),
        },
        will_buy_threshold: config.get_double(
            "strategy",
            "will_buy_threshold_1",
            defaults.will_buy_threshold,
        ),
        will_sell_threshold: config.get_double(
            "strategy",
            "will_sell_threshold_2",
            defaults.will_sell_threshold,
        ),
        stop_loss: config.get_double("strategy", "stop_loss", defaults.stop_loss),
    }
}

/// Command-line ids win over `[strategy] variants`. Order is preserved and
/// repeated ids run once.
pub fn resolve_variants(
    overrides: &[i64],
    config: &dyn ConfigPort,
) -> Result<Vec<StrategyVariant>, GorkError> {
    let requested = if overrides.is_empty() {
        let raw = config
            .get_string("strategy", "variants")
            .unwrap_or_else(|| DEFAULT_VARIANTS.to_string());
        parse_variants(&raw)?
    } else {
        overrides
            .iter()
            .map(|&id| StrategyVariant::from_id(id))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut variants: Vec<StrategyVariant> = Vec::with_capacity(requested.len());
    for variant in requested {
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    Ok(variants)
}

pub fn build_data_settings(
    config: &dyn ConfigPort,
    data_override: Option<PathBuf>,
    segment_override: Option<&str>,
) -> Result<DataSettings, GorkError> {
    let segment_name = match segment_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("data", "segment")
            .unwrap_or_else(|| DEFAULT_SEGMENT.to_string()),
    };
    let segment = segment_name
        .parse::<Segment>()
        .map_err(|reason| GorkError::ConfigInvalid {
            section: "data".into(),
            key: "segment".into(),
            reason,
        })?;

    Ok(DataSettings {
        path: data_override.or_else(|| config.get_string("data", "path").map(PathBuf::from)),
        train_ratio: config.get_double("data", "train_ratio", DEFAULT_TRAIN_RATIO),
        validation_ratio: config.get_double("data", "validation_ratio", DEFAULT_VALIDATION_RATIO),
        segment,
    })
}

/// Load, split, then simulate and evaluate every variant on the chosen segment.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    settings: &DataSettings,
    variants: &[StrategyVariant],
    params: &StrategyParams,
    bt_config: &BacktestConfig,
) -> Result<PipelineOutput, GorkError> {
    params.validate()?;

    let bars = data_port.load_bars()?;
    if bars.is_empty() {
        return Err(GorkError::NoData {
            path: data_port.describe(),
        });
    }

    let split = split_bars(&bars, settings.train_ratio, settings.validation_ratio)?;
    let segment = split.segment(settings.segment);
    let minimum = params.indicators.entry_lookback() + 2;
    if segment.len() < minimum {
        tracing::warn!(
            bars = segment.len(),
            minimum,
            "segment too short for any entry to fill"
        );
    }
    tracing::info!(
        segment = %settings.segment,
        bars = segment.len(),
        variants = variants.len(),
        "running backtests"
    );

    let mut results = Vec::with_capacity(variants.len());
    let mut reports = Vec::with_capacity(variants.len());
    for &variant in variants {
        let result = simulate_strategy(variant, segment, params, bt_config)?;
        if result.trades.is_empty() {
            tracing::warn!(variant = variant.id(), "no trades on selected segment");
        }
        let report =
            PerformanceReport::from_result(&variant.to_string(), &result, bt_config.risk_free_rate);
        results.push(result);
        reports.push(report);
    }

    Ok(PipelineOutput { results, reports })
}

fn run_validate(config_path: &Path) -> Result<(), GorkError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let settings = build_data_settings(&config, None, None)?;
    let variants = resolve_variants(&[], &config)?;
    let params = build_strategy_params(&config);
    let bt_config = build_backtest_config(&config);

    println!(
        "data:      {} (segment {}, train {}, validation {})",
        settings
            .path
            .as_deref()
            .map_or_else(|| "<not set>".to_string(), |p| p.display().to_string()),
        settings.segment,
        settings.train_ratio,
        settings.validation_ratio
    );
    println!(
        "backtest:  capital {}, volume {}, fee_rate {}, risk_free_rate {}",
        bt_config.initial_capital,
        bt_config.execution.volume,
        bt_config.execution.fee_rate,
        bt_config.risk_free_rate
    );
    println!(
        "strategy:  SMA({}) / SMA({}), WILLR({}) < {}, WILLR({}) > {}, stop_loss {}",
        params.indicators.ma_short,
        params.indicators.ma_long,
        params.indicators.will_period_1,
        params.will_buy_threshold,
        params.indicators.will_period_2,
        params.will_sell_threshold,
        params.stop_loss
    );
    for variant in &variants {
        println!("  {variant}");
    }

    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_info(data_path: Option<PathBuf>, config_path: Option<&Path>) -> Result<(), GorkError> {
    let settings = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            validate_data_config(&config)?;
            build_data_settings(&config, data_path, None)?
        }
        None => DataSettings {
            path: data_path,
            ..DataSettings::default()
        },
    };

    let adapter = CsvAdapter::new(settings.require_path()?.to_path_buf());
    let bars = adapter.load_bars()?;
    let summary = DataSummary::from_bars(&bars).ok_or_else(|| GorkError::NoData {
        path: adapter.describe(),
    })?;

    print_summary(&summary, &bars, &settings)
}

fn print_summary(
    summary: &DataSummary,
    bars: &[Bar],
    settings: &DataSettings,
) -> Result<(), GorkError> {
    let split = split_bars(bars, settings.train_ratio, settings.validation_ratio)?;
    println!("rows:        {}", summary.rows);
    println!("from:        {}", summary.start);
    println!("to:          {}", summary.end);
    println!(
        "price range: {:.4} - {:.4}",
        summary.min_price, summary.max_price
    );
    println!(
        "split:       train {}, validation {}, test {}",
        split.train.len(),
        split.validation.len(),
        split.test.len()
    );
    Ok(())
}
