use anyhow::Result;
use std::fmt::{self, Display};

use super::{ReportFormatter, SEPARATOR};
use crate::formatters::color::{availability_style, color};
use crate::options::OutputMode;
use pulse_lib::{Availability, AvailabilityReport};

struct CompactReport<'a> {
    report: &'a AvailabilityReport,
    mode: &'a OutputMode,
}

impl Display for CompactReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f, "AVAILABILITY REPORT")?;

        for entry in &self.report.domains {
            let style = availability_style(entry.availability, self.mode);
            match entry.availability {
                Availability::Percent(p) => {
                    write!(f, "{} has ", entry.domain)?;
                    color!(f, style, "{}%", p)?;
                    writeln!(f, " availability")?;
                }
                Availability::NoData => {
                    write!(f, "{} has ", entry.domain)?;
                    color!(f, style, "{}", "no availability data")?;
                    writeln!(f)?;
                }
            }
        }

        writeln!(f, "{SEPARATOR}")
    }
}

pub(crate) struct Compact {
    mode: OutputMode,
}

impl Compact {
    pub(crate) const fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl ReportFormatter for Compact {
    fn format(&self, report: &AvailabilityReport) -> Result<String> {
        let compact = CompactReport {
            report,
            mode: &self.mode,
        };
        Ok(compact.to_string())
    }
}
