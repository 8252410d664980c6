//! The data handed to a [`ReportSink`] after every check cycle.
//!
//! How reports are rendered is up to the sink; this module only defines
//! what a report contains.

use serde::Serialize;

use crate::{Availability, Domain, DomainStats};

/// Identifies a check cycle in log output; starts at 1.
pub type CycleId = u64;

/// Availability of one domain at the time of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainAvailability {
    /// The domain
    pub domain: Domain,
    /// Successful probes since process start
    pub success: u64,
    /// Counted probes since process start
    pub total: u64,
    /// Rounded success percentage, or "no data"
    pub availability: Availability,
}

impl DomainAvailability {
    /// Compute the availability entry from a domain's counters
    #[must_use]
    pub fn new(domain: Domain, stats: DomainStats) -> Self {
        Self {
            domain,
            success: stats.success,
            total: stats.total,
            availability: stats.availability(),
        }
    }
}

/// Per-domain availability after a completed cycle, sorted by domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityReport {
    /// The cycle after which this report was taken
    pub cycle: CycleId,
    /// One entry per known domain
    pub domains: Vec<DomainAvailability>,
}

impl AvailabilityReport {
    /// Look up the entry of a single domain
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&DomainAvailability> {
        self.domains.iter().find(|d| d.domain.as_str() == domain)
    }
}

/// Receives cycle markers and availability reports from the scheduler.
///
/// Implementations are shared between the scheduler and its tasks, so they
/// must be thread-safe. Each method is called from the scheduler loop only,
/// never concurrently with itself.
pub trait ReportSink: Send + Sync {
    /// A cycle is about to dispatch its probes
    fn cycle_started(&self, _cycle: CycleId) {}

    /// All probes of the cycle have completed
    fn cycle_finished(&self, _cycle: CycleId) {}

    /// Emit the availability report of a finished cycle
    fn report(&self, report: &AvailabilityReport);
}
