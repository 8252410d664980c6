//! Thread-safe aggregation of per-domain probe outcomes.
//!
//! All counters live behind a single mutex inside [`StatsAggregator`]. The
//! guarded regions only ever touch the map, never the network, so holding
//! the lock is cheap and a global lock is sufficient.

use std::collections::HashMap;
use std::fmt;

use log::warn;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use crate::Domain;
use crate::report::DomainAvailability;

/// Cumulative probe counters for one domain since process start.
///
/// Invariant: `success <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    /// Number of probes answered with a 2xx status code
    pub success: u64,
    /// Number of counted probes (successful or not)
    pub total: u64,
}

impl DomainStats {
    /// Percentage of successful probes, rounded to the nearest integer
    /// (halves round up).
    ///
    /// A domain that was never probed has no availability yet and yields
    /// [`Availability::NoData`] instead of dividing by zero.
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.total == 0 {
            return Availability::NoData;
        }
        // round(100 * s / t) == floor((200 * s + t) / (2 * t)) for s, t >= 0
        let percent = (200 * u128::from(self.success) + u128::from(self.total))
            / (2 * u128::from(self.total));
        #[allow(clippy::cast_possible_truncation)]
        Availability::Percent(percent.min(100) as u8)
    }
}

/// Availability of a domain as reported to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Rounded percentage of successful probes, 0 to 100
    Percent(u8),
    /// The domain has not been probed yet
    NoData,
}

impl Availability {
    /// The percentage, if there is any data
    #[must_use]
    pub const fn percent(&self) -> Option<u8> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::NoData => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}%"),
            Self::NoData => f.write_str("no data"),
        }
    }
}

impl Serialize for Availability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // `null` stands for "no data"
        self.percent().serialize(serializer)
    }
}

/// Serialises all updates to the domain → [`DomainStats`] map.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    domains: Mutex<HashMap<Domain, DomainStats>>,
}

impl StatsAggregator {
    /// Create an aggregator that does not know any domain yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `domain` known without counting anything, so that it shows up
    /// in reports before its first probe completes
    pub fn register(&self, domain: &Domain) {
        self.domains.lock().entry(domain.clone()).or_default();
    }

    /// Count one probe against `domain`, creating the entry if needed
    pub fn record_total(&self, domain: &Domain) {
        self.domains.lock().entry(domain.clone()).or_default().total += 1;
    }

    /// Count one successful probe against `domain`.
    ///
    /// The probe must already have been counted with [`record_total`];
    /// a success without a matching total is dropped to keep
    /// `success <= total`.
    ///
    /// [`record_total`]: StatsAggregator::record_total
    pub fn record_success(&self, domain: &Domain) {
        let mut domains = self.domains.lock();
        let stats = domains.entry(domain.clone()).or_default();
        if stats.success < stats.total {
            stats.success += 1;
        } else {
            warn!("Ignoring success for {domain} without a matching probe");
        }
    }

    /// Count one finished probe and, if `success`, its success, as a
    /// single update
    pub fn record_probe(&self, domain: &Domain, success: bool) {
        let mut domains = self.domains.lock();
        let stats = domains.entry(domain.clone()).or_default();
        stats.total += 1;
        if success {
            stats.success += 1;
        }
    }

    /// Get the counters of a single domain
    #[must_use]
    pub fn get(&self, domain: &Domain) -> Option<DomainStats> {
        self.domains.lock().get(domain).copied()
    }

    /// Number of known domains
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.lock().len()
    }

    /// Returns `true` if no domain is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.lock().is_empty()
    }

    /// Availability of every known domain, sorted by domain.
    ///
    /// All values are read under one lock acquisition, so the snapshot is
    /// consistent across domains.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DomainAvailability> {
        let mut snapshot: Vec<_> = self
            .domains
            .lock()
            .iter()
            .map(|(domain, stats)| DomainAvailability::new(domain.clone(), *stats))
            .collect();
        snapshot.sort_by(|a, b| a.domain.cmp(&b.domain));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case(3, 4, 75)]
    #[case(1, 2, 50)]
    #[case(0, 5, 0)]
    #[case(5, 5, 100)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 8, 13)] // 12.5 rounds up
    #[case(1, 200, 1)] // 0.5 rounds up
    #[case(1, 201, 0)]
    fn test_availability_rounding(#[case] success: u64, #[case] total: u64, #[case] percent: u8) {
        let stats = DomainStats { success, total };
        assert_eq!(stats.availability(), Availability::Percent(percent));
    }

    #[test]
    fn test_zero_total_is_no_data() {
        let stats = DomainStats::default();
        assert_eq!(stats.availability(), Availability::NoData);
        assert_eq!(stats.availability().percent(), None);
        assert_eq!(stats.availability().to_string(), "no data");
    }

    #[test]
    fn test_record_probe() {
        let stats = StatsAggregator::new();
        let domain = Domain::from("a.test");

        stats.record_probe(&domain, true);
        stats.record_probe(&domain, true);
        stats.record_probe(&domain, false);
        stats.record_probe(&domain, true);

        assert_eq!(
            stats.get(&domain),
            Some(DomainStats {
                success: 3,
                total: 4
            })
        );
        assert_eq!(stats.snapshot()[0].availability, Availability::Percent(75));
    }

    #[test]
    fn test_record_total_and_success() {
        let stats = StatsAggregator::new();
        let domain = Domain::from("a.test");

        // Entries are created lazily
        stats.record_total(&domain);
        stats.record_success(&domain);
        stats.record_total(&domain);

        assert_eq!(
            stats.get(&domain),
            Some(DomainStats {
                success: 1,
                total: 2
            })
        );
    }

    #[test]
    fn test_success_never_exceeds_total() {
        let stats = StatsAggregator::new();
        let domain = Domain::from("a.test");

        stats.record_success(&domain);
        stats.record_total(&domain);
        stats.record_success(&domain);
        stats.record_success(&domain);

        assert_eq!(
            stats.get(&domain),
            Some(DomainStats {
                success: 1,
                total: 1
            })
        );
    }

    #[test]
    fn test_domains_are_isolated() {
        let stats = StatsAggregator::new();
        let a = Domain::from("a.test");
        let b = Domain::from("b.test");

        stats.record_probe(&b, true);
        let before = stats.get(&b);

        stats.record_probe(&a, false);
        stats.record_probe(&a, true);
        stats.record_total(&a);

        assert_eq!(stats.get(&b), before);
        assert_eq!(stats.get(&a).unwrap().total, 3);
    }

    #[test]
    fn test_snapshot_sorted_with_registered_domains() {
        let stats = StatsAggregator::new();
        stats.register(&Domain::from("c.test"));
        stats.record_probe(&Domain::from("b.test"), true);
        stats.record_probe(&Domain::from("a.test"), false);

        let snapshot = stats.snapshot();
        let domains: Vec<_> = snapshot.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(domains, vec!["a.test", "b.test", "c.test"]);

        assert_eq!(snapshot[0].availability, Availability::Percent(0));
        assert_eq!(snapshot[1].availability, Availability::Percent(100));
        assert_eq!(snapshot[2].availability, Availability::NoData);
    }

    #[test]
    fn test_register_keeps_existing_counts() {
        let stats = StatsAggregator::new();
        let domain = Domain::from("a.test");
        stats.record_probe(&domain, true);
        stats.register(&domain);
        assert_eq!(stats.get(&domain).unwrap().total, 1);
        assert_eq!(stats.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates() {
        let stats = Arc::new(StatsAggregator::new());
        let domain = Domain::from("a.test");

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let stats = stats.clone();
                let domain = domain.clone();
                tokio::spawn(async move { stats.record_probe(&domain, i % 4 != 0) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(
            stats.get(&domain),
            Some(DomainStats {
                success: 75,
                total: 100
            })
        );
    }

    #[test]
    fn test_serialize_availability() {
        let json = serde_json::to_string(&[Availability::Percent(42), Availability::NoData]).unwrap();
        assert_eq!(json, "[42,null]");
    }
}
