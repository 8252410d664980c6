mod compact;
mod detailed;
mod json;

pub(crate) use compact::Compact;
pub(crate) use detailed::Detailed;
pub(crate) use json::Json;

use anyhow::Result;
use pulse_lib::{AvailabilityReport, CycleId};

const SEPARATOR: &str = "==============================";

/// Trait for formatting availability reports in different output formats
pub(crate) trait ReportFormatter: Send + Sync {
    /// Format the availability report of a finished cycle
    fn format(&self, report: &AvailabilityReport) -> Result<String>;

    /// Marker printed before a cycle dispatches its probes, if any
    fn cycle_started(&self, cycle: CycleId) -> Option<String> {
        Some(banner(&format!("CHECK CYCLE {cycle} BEGIN")))
    }

    /// Marker printed once all probes of a cycle have completed, if any
    fn cycle_finished(&self, cycle: CycleId) -> Option<String> {
        Some(banner(&format!("CHECK CYCLE {cycle} END")))
    }
}

fn banner(title: &str) -> String {
    format!("{SEPARATOR}\n{title}\n{SEPARATOR}\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use pulse_lib::{Domain, DomainAvailability, DomainStats};

    use super::*;

    /// One domain at 50%, one without data
    pub(crate) fn sample_report() -> AvailabilityReport {
        AvailabilityReport {
            cycle: 4,
            domains: vec![
                DomainAvailability::new(
                    Domain::from("a.test"),
                    DomainStats {
                        success: 1,
                        total: 2,
                    },
                ),
                DomainAvailability::new(Domain::from("b.test"), DomainStats::default()),
            ],
        }
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            banner("CHECK CYCLE 1 BEGIN"),
            "==============================\nCHECK CYCLE 1 BEGIN\n==============================\n"
        );
    }
}
