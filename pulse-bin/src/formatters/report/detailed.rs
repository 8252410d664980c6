use anyhow::Result;
use std::fmt::{self, Display};

use super::{ReportFormatter, SEPARATOR};
use crate::formatters::color::{availability_style, color};
use crate::options::OutputMode;
use pulse_lib::AvailabilityReport;

struct DetailedReport<'a> {
    report: &'a AvailabilityReport,
    mode: &'a OutputMode,
}

impl Display for DetailedReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f, "AVAILABILITY REPORT (cycle {})", self.report.cycle)?;

        let domain_width = self
            .report
            .domains
            .iter()
            .map(|entry| entry.domain.as_str().len())
            .max()
            .unwrap_or(0);

        for entry in &self.report.domains {
            let style = availability_style(entry.availability, self.mode);
            write!(f, "{:<domain_width$} ", entry.domain.as_str())?;
            color!(f, style, "{:>7}", entry.availability.to_string())?;
            writeln!(
                f,
                " ({} of {} probes succeeded)",
                entry.success, entry.total
            )?;
        }

        writeln!(f, "{SEPARATOR}")
    }
}

pub(crate) struct Detailed {
    mode: OutputMode,
}

impl Detailed {
    pub(crate) const fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl ReportFormatter for Detailed {
    fn format(&self, report: &AvailabilityReport) -> Result<String> {
        let detailed = DetailedReport {
            report,
            mode: &self.mode,
        };
        Ok(detailed.to_string())
    }
}
