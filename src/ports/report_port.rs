//! Report output port trait.

use std::io::Write;

use crate::domain::error::GorkError;
use crate::domain::metrics::PerformanceReport;

/// Port for rendering performance reports.
pub trait ReportPort {
    fn write(&self, report: &PerformanceReport, out: &mut dyn Write) -> Result<(), GorkError>;

    /// Default implementation: each report in turn, no cross-strategy summary.
    fn write_all(
        &self,
        reports: &[PerformanceReport],
        out: &mut dyn Write,
    ) -> Result<(), GorkError> {
        for report in reports {
            self.write(report, out)?;
        }
        Ok(())
    }
}
