//! Plain-text report adapter.

use std::io::Write;

use crate::domain::error::GorkError;
use crate::domain::metrics::{PerformanceReport, best_by_msr, compare_strategies};
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &PerformanceReport, out: &mut dyn Write) -> Result<(), GorkError> {
        writeln!(out, "=== {} ===", report.strategy_name)?;
        writeln!(out, "Total Trades:     {}", report.trade_count)?;
        writeln!(out, "Win Rate:         {:.2}%", report.win_rate * 100.0)?;
        writeln!(out, "Initial Capital:  {:.2}", report.initial_capital)?;
        writeln!(out, "Final Capital:    {:.2}", report.final_capital)?;
        writeln!(out, "Total Return:     {:.4}%", report.total_return * 100.0)?;
        writeln!(out, "MSR:              {:.4}", report.msr)?;
        writeln!(out, "Sharpe Ratio:     {:.4}", report.sharpe_ratio)?;
        writeln!(out, "Max Drawdown:     {:.4}%", report.max_drawdown * 100.0)?;
        writeln!(out, "Profit Factor:    {:.4}", report.profit_factor)?;
        writeln!(out, "Expectancy:       {:.4}", report.expectancy)?;
        writeln!(out, "Risk/Reward:      {:.4}", report.risk_reward_ratio)?;
        writeln!(out, "Avg Duration:     {:.2} bars", report.avg_duration)?;
        writeln!(out, "Shortest 5 Avg:   {:.2} bars", report.shortest_5_avg)?;
        writeln!(out, "Longest 5 Avg:    {:.2} bars", report.longest_5_avg)?;

        if !report.exit_reasons.is_empty() {
            writeln!(out, "Exit Reasons:")?;
            for (reason, count) in &report.exit_reasons {
                writeln!(out, "  {:<22}{}", reason.as_str(), count)?;
            }
        }

        let stats = &report.returns_stats;
        writeln!(
            out,
            "Returns:          mean {:.4}, std {:.4}, min {:.4}, max {:.4}, median {:.4}, mad {:.4}",
            stats.mean, stats.std, stats.min, stats.max, stats.median, stats.mad
        )?;
        writeln!(out)?;
        Ok(())
    }

    fn write_all(
        &self,
        reports: &[PerformanceReport],
        out: &mut dyn Write,
    ) -> Result<(), GorkError> {
        for report in reports {
            self.write(report, out)?;
        }
        if reports.is_empty() {
            return Ok(());
        }

        writeln!(out, "=== Strategy Comparison ===")?;
        writeln!(
            out,
            "{:<36} {:>6} {:>8} {:>16} {:>10} {:>9} {:>9} {:>9} {:>9} {:>11} {:>9} {:>9}",
            "Strategy",
            "Trades",
            "WinRate",
            "FinalCapital",
            "Return%",
            "MSR",
            "Sharpe",
            "MaxDD%",
            "PF",
            "Expectancy",
            "R/R",
            "AvgDur"
        )?;
        for row in compare_strategies(reports) {
            writeln!(
                out,
                "{:<36} {:>6} {:>7.2}% {:>16.2} {:>10.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>11.4} {:>9.4} {:>9.2}",
                row.strategy_name,
                row.trade_count,
                row.win_rate * 100.0,
                row.final_capital,
                row.total_return * 100.0,
                row.msr,
                row.sharpe_ratio,
                row.max_drawdown * 100.0,
                row.profit_factor,
                row.expectancy,
                row.risk_reward_ratio,
                row.avg_duration
            )?;
        }

        if let Some(best) = best_by_msr(reports) {
            writeln!(out)?;
            writeln!(out, "Best by MSR: {} ({:.4})", best.strategy_name, best.msr)?;
        }
        Ok(())
    }
}
