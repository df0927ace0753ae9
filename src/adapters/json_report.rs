//! JSON report adapter.

use std::io::Write;

use crate::domain::error::GorkError;
use crate::domain::metrics::PerformanceReport;
use crate::ports::report_port::ReportPort;

/// Emits one JSON document per call; `write_all` produces a single array.
pub struct JsonReportAdapter {
    pub pretty: bool,
}

impl JsonReportAdapter {
    fn emit<T: serde::Serialize + ?Sized>(
        &self,
        value: &T,
        out: &mut dyn Write,
    ) -> Result<(), GorkError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| GorkError::Io(std::io::Error::other(e)))?;
        writeln!(out, "{text}")?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &PerformanceReport, out: &mut dyn Write) -> Result<(), GorkError> {
        self.emit(report, out)
    }

    fn write_all(
        &self,
        reports: &[PerformanceReport],
        out: &mut dyn Write,
    ) -> Result<(), GorkError> {
        self.emit(reports, out)
    }
}
