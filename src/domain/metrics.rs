//! Performance metrics over a closed trade list and its per-trade return series.
//!
//! Every metric degrades to `0.0` on empty or too-short input instead of
//! failing. Profit factor and risk/reward report `+inf` when there are gains
//! but no losses to divide by.

use std::collections::BTreeMap;

use super::backtest::{BacktestResult, DEFAULT_INITIAL_CAPITAL};
use super::execution::{ExitReason, Trade};

/// Per-period risk-free rate: 4% a year over 240 trading days.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04 / 240.0;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ReturnsStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mad: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DurationStats {
    pub avg_duration: f64,
    pub shortest_5_avg: f64,
    pub longest_5_avg: f64,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PerformanceReport {
    pub strategy_name: String,
    pub trade_count: usize,
    pub win_rate: f64,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub msr: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_ratio"))]
    pub profit_factor: f64,
    pub expectancy: f64,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_ratio"))]
    pub risk_reward_ratio: f64,
    pub avg_duration: f64,
    pub shortest_5_avg: f64,
    pub longest_5_avg: f64,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
    pub returns_stats: ReturnsStats,
}

impl PerformanceReport {
    pub fn compute(
        strategy_name: &str,
        trades: &[Trade],
        returns: &[f64],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Self {
        let final_capital = trades.last().map(|t| t.capital).unwrap_or(initial_capital);
        let total_return = if initial_capital != 0.0 {
            (final_capital - initial_capital) / initial_capital
        } else {
            0.0
        };
        let durations = duration_stats(trades);

        PerformanceReport {
            strategy_name: strategy_name.to_string(),
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            initial_capital,
            final_capital,
            total_return,
            msr: msr(returns, risk_free_rate),
            sharpe_ratio: sharpe_ratio(returns, risk_free_rate),
            max_drawdown: max_drawdown(returns),
            profit_factor: profit_factor(trades),
            expectancy: expectancy(trades),
            risk_reward_ratio: risk_reward_ratio(trades),
            avg_duration: durations.avg_duration,
            shortest_5_avg: durations.shortest_5_avg,
            longest_5_avg: durations.longest_5_avg,
            exit_reasons: durations.exit_reasons,
            returns_stats: returns_stats(returns),
        }
    }

    pub fn from_result(strategy_name: &str, result: &BacktestResult, risk_free_rate: f64) -> Self {
        Self::compute(
            strategy_name,
            &result.trades,
            &result.return_values(),
            result.initial_capital,
            risk_free_rate,
        )
    }
}

/// Report with the default capital and risk-free rate.
pub fn generate_performance_report(
    trades: &[Trade],
    returns: &[f64],
    strategy_name: &str,
) -> PerformanceReport {
    PerformanceReport::compute(
        strategy_name,
        trades,
        returns,
        DEFAULT_INITIAL_CAPITAL,
        DEFAULT_RISK_FREE_RATE,
    )
}

pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.profit > 0.0).count();
    wins as f64 / trades.len() as f64
}

/// Robust Sharpe: `(median - rf) / MAD`.
pub fn msr(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let med = median(returns);
    let mad = median_abs_deviation(returns, med);
    if mad == 0.0 {
        return 0.0;
    }
    (med - risk_free_rate) / mad
}

/// `(mean - rf) / sample_std`.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = sample_std(returns);
    if std == 0.0 {
        return 0.0;
    }
    (mean(returns) - risk_free_rate) / std
}

/// Largest relative fall of `cumprod(1 + r)` below its running maximum.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0_f64;
    let mut running_max = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        running_max = running_max.max(cumulative);
        if running_max != 0.0 {
            let drawdown = (cumulative - running_max) / running_max;
            worst = worst.min(drawdown);
        }
    }

    worst.abs()
}

pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().map(|t| t.profit).filter(|&p| p > 0.0).sum();
    let gross_loss: f64 = trades
        .iter()
        .map(|t| t.profit)
        .filter(|&p| p < 0.0)
        .sum::<f64>()
        .abs();

    if gross_loss == 0.0 {
        return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gross_profit / gross_loss
}

pub fn expectancy(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.profit).sum::<f64>() / trades.len() as f64
}

/// Average win over the magnitude of the average loss.
pub fn risk_reward_ratio(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().map(|t| t.profit).filter(|&p| p > 0.0).collect();
    let losses: Vec<f64> = trades.iter().map(|t| t.profit).filter(|&p| p < 0.0).collect();

    if wins.is_empty() || losses.is_empty() {
        return 0.0;
    }

    let avg_win = mean(&wins);
    let avg_loss = mean(&losses).abs();
    if avg_loss == 0.0 {
        return if avg_win > 0.0 { f64::INFINITY } else { 0.0 };
    }
    avg_win / avg_loss
}

/// Hold-time statistics in bars plus exit-reason frequencies.
pub fn duration_stats(trades: &[Trade]) -> DurationStats {
    if trades.is_empty() {
        return DurationStats::default();
    }

    let mut durations: Vec<f64> = trades.iter().map(|t| t.bars_held() as f64).collect();
    let avg_duration = mean(&durations);

    let mut exit_reasons = BTreeMap::new();
    for trade in trades {
        *exit_reasons.entry(trade.exit_reason).or_insert(0) += 1;
    }

    durations.sort_by(|a, b| a.total_cmp(b));
    let (shortest_5_avg, longest_5_avg) = if durations.len() >= 5 {
        (
            mean(&durations[..5]),
            mean(&durations[durations.len() - 5..]),
        )
    } else {
        (0.0, 0.0)
    };

    DurationStats {
        avg_duration,
        shortest_5_avg,
        longest_5_avg,
        exit_reasons,
    }
}

pub fn returns_stats(returns: &[f64]) -> ReturnsStats {
    if returns.is_empty() {
        return ReturnsStats::default();
    }
    let med = median(returns);
    ReturnsStats {
        mean: mean(returns),
        std: if returns.len() > 1 { sample_std(returns) } else { 0.0 },
        min: returns.iter().copied().fold(f64::INFINITY, f64::min),
        max: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        median: med,
        mad: median_abs_deviation(returns, med),
    }
}

/// One row of the cross-strategy comparison table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ComparisonRow {
    pub strategy_name: String,
    pub trade_count: usize,
    pub win_rate: f64,
    pub final_capital: f64,
    pub total_return: f64,
    pub msr: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_ratio"))]
    pub profit_factor: f64,
    pub expectancy: f64,
    #[cfg_attr(feature = "json", serde(serialize_with = "serialize_ratio"))]
    pub risk_reward_ratio: f64,
    pub avg_duration: f64,
}

pub fn compare_strategies(reports: &[PerformanceReport]) -> Vec<ComparisonRow> {
    reports
        .iter()
        .map(|r| ComparisonRow {
            strategy_name: r.strategy_name.clone(),
            trade_count: r.trade_count,
            win_rate: r.win_rate,
            final_capital: r.final_capital,
            total_return: r.total_return,
            msr: r.msr,
            sharpe_ratio: r.sharpe_ratio,
            max_drawdown: r.max_drawdown,
            profit_factor: r.profit_factor,
            expectancy: r.expectancy,
            risk_reward_ratio: r.risk_reward_ratio,
            avg_duration: r.avg_duration,
        })
        .collect()
}

/// Highest MSR; the earliest report wins ties.
pub fn best_by_msr(reports: &[PerformanceReport]) -> Option<&PerformanceReport> {
    reports.iter().fold(None, |best, r| match best {
        Some(b) if b.msr >= r.msr => Some(b),
        _ => Some(r),
    })
}

/// JSON has no infinity, so unbounded ratios are written as `"inf"`.
#[cfg(feature = "json")]
fn serialize_ratio<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
    } else {
        serializer.serialize_f64(*value)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Middle value; mean of the two middle values for even lengths.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn median_abs_deviation(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}
