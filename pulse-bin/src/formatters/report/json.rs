use anyhow::{Context, Result};

use super::ReportFormatter;
use pulse_lib::{AvailabilityReport, CycleId};

/// One JSON object per report and line; cycle markers are left out so the
/// output stays machine-readable
pub(crate) struct Json;

impl Json {
    pub(crate) const fn new() -> Self {
        Self
    }
}

impl ReportFormatter for Json {
    fn format(&self, report: &AvailabilityReport) -> Result<String> {
        let mut json = serde_json::to_string(report).context("Cannot format report as JSON")?;
        json.push('\n');
        Ok(json)
    }

    fn cycle_started(&self, _cycle: CycleId) -> Option<String> {
        None
    }

    fn cycle_finished(&self, _cycle: CycleId) -> Option<String> {
        None
    }
}
