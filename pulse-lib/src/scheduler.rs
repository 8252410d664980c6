//! The check loop.
//!
//! A [`Scheduler`] owns the endpoint list and the per-domain admission
//! gates. Every cycle fans out one probe task per endpoint, waits for all of
//! them, and hands an availability report to the [`ReportSink`]. Cycles never
//! overlap: the pause before the next cycle only starts once the previous one
//! has been reported.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::task::JoinSet;

use crate::{
    AdmissionGate, AdmissionGates, AvailabilityReport, CycleId, Domain, Endpoint, ErrorKind,
    MonitorConfig, Prober, ProberBuilder, ReportSink, Result, StatsAggregator,
};

/// An endpoint together with the gate of its domain
#[derive(Debug, Clone)]
struct Target {
    endpoint: Arc<Endpoint>,
    gate: Arc<AdmissionGate>,
}

/// Drives repeating check cycles over a fixed list of endpoints.
pub struct Scheduler {
    targets: Vec<Target>,
    gates: AdmissionGates,
    prober: Prober,
    stats: Arc<StatsAggregator>,
    sink: Arc<dyn ReportSink>,
    interval: Duration,
    cycle: CycleId,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("targets", &self.targets.len())
            .field("domains", &self.gates.len())
            .field("interval", &self.interval)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Set up gates, stats and the prober for `endpoints`.
    ///
    /// Every distinct domain gets its own gate and is known to the stats
    /// right away, so it shows up in reports before its first probe
    /// finishes.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if
    /// - `config.max_concurrency_per_domain` is 0, even for an empty
    ///   endpoint list.
    /// - The HTTP client cannot be built.
    pub fn new(
        endpoints: Vec<Endpoint>,
        config: &MonitorConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        let capacity = config.max_concurrency_per_domain;
        if capacity == 0 {
            return Err(ErrorKind::InvalidCapacity(capacity));
        }

        let endpoints: Vec<(Domain, Arc<Endpoint>)> = endpoints
            .into_iter()
            .map(|endpoint| (endpoint.domain(), Arc::new(endpoint)))
            .collect();

        let gates = AdmissionGates::new(
            endpoints.iter().map(|(domain, _)| domain.clone()),
            capacity,
        )?;

        let stats = Arc::new(StatsAggregator::new());
        for (domain, _) in gates.iter() {
            stats.register(domain);
        }

        let mut targets = Vec::with_capacity(endpoints.len());
        for (domain, endpoint) in endpoints {
            // Every domain got a gate above
            if let Some(gate) = gates.get(&domain) {
                targets.push(Target {
                    endpoint,
                    gate: gate.clone(),
                });
            }
        }

        let prober = ProberBuilder::from(config).prober()?;

        info!(
            "Monitoring {} endpoint(s) across {} domain(s)",
            targets.len(),
            gates.len()
        );

        Ok(Self {
            targets,
            gates,
            prober,
            stats,
            sink,
            interval: config.interval,
            cycle: 0,
        })
    }

    /// Run check cycles forever, pausing for the configured interval after
    /// each report.
    pub async fn run(mut self) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a single check cycle and return the report handed to the sink.
    ///
    /// Returns once every probe of the cycle has completed, whatever its
    /// outcome. A panicking probe task is logged and does not affect the
    /// other probes.
    pub async fn run_cycle(&mut self) -> AvailabilityReport {
        self.cycle += 1;
        let cycle = self.cycle;

        self.sink.cycle_started(cycle);
        debug!("Cycle {cycle}: dispatching {} probe(s)", self.targets.len());

        let mut tasks = JoinSet::new();
        for target in &self.targets {
            let target = target.clone();
            let prober = self.prober.clone();
            let stats = self.stats.clone();
            tasks.spawn(async move {
                prober
                    .probe(&target.endpoint, &target.gate, &stats)
                    .await
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!("Cycle {cycle}: probe task failed: {e}");
            }
        }

        self.sink.cycle_finished(cycle);

        let report = AvailabilityReport {
            cycle,
            domains: self.stats.snapshot(),
        };
        self.sink.report(&report);
        report
    }

    /// The stats shared by all probes
    #[must_use]
    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    /// The gates of all known domains
    #[must_use]
    pub const fn gates(&self) -> &AdmissionGates {
        &self.gates
    }

    /// Id of the last started cycle, 0 before the first one
    #[must_use]
    pub const fn cycle(&self) -> CycleId {
        self.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Availability, DomainStats};
    use http::StatusCode;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::time::Instant;
    use test_utils::{mock_route, mock_server};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Started(CycleId),
        Finished(CycleId),
        Report(AvailabilityReport),
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<Event> {
            self.events.lock().clone()
        }

        fn reports(&self) -> usize {
            self.events
                .lock()
                .iter()
                .filter(|e| matches!(e, Event::Report(_)))
                .count()
        }
    }

    impl ReportSink for RecordingSink {
        fn cycle_started(&self, cycle: CycleId) {
            self.events.lock().push(Event::Started(cycle));
        }

        fn cycle_finished(&self, cycle: CycleId) {
            self.events.lock().push(Event::Finished(cycle));
        }

        fn report(&self, report: &AvailabilityReport) {
            self.events.lock().push(Event::Report(report.clone()));
        }
    }

    fn scheduler(endpoints: Vec<Endpoint>, config: &MonitorConfig) -> (Scheduler, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(endpoints, config, sink.clone()).unwrap();
        (scheduler, sink)
    }

    #[tokio::test]
    async fn test_half_available_domain() {
        let mock_server = wiremock::MockServer::start().await;
        mock_route!(mock_server, "/", StatusCode::OK);
        mock_route!(mock_server, "/2", StatusCode::INTERNAL_SERVER_ERROR);

        let endpoints = vec![
            Endpoint::new("root", format!("{}/", mock_server.uri())),
            Endpoint::new("second", format!("{}/2", mock_server.uri())),
        ];
        let (mut scheduler, _) = scheduler(endpoints, &MonitorConfig::default());

        let report = scheduler.run_cycle().await;

        let entry = report.get("127.0.0.1").unwrap();
        assert_eq!((entry.success, entry.total), (1, 2));
        assert_eq!(entry.availability, Availability::Percent(50));
        assert_eq!(report.domains.len(), 1);
    }

    #[tokio::test]
    async fn test_stats_accumulate_across_cycles() {
        let mock_server = mock_server!(StatusCode::OK);
        let endpoints = vec![Endpoint::new("ok", mock_server.uri())];
        let (mut scheduler, sink) = scheduler(endpoints, &MonitorConfig::default());

        scheduler.run_cycle().await;
        let report = scheduler.run_cycle().await;

        assert_eq!(report.cycle, 2);
        assert_eq!(scheduler.cycle(), 2);
        assert_eq!(
            scheduler.stats().get(&Domain::from("127.0.0.1")),
            Some(DomainStats {
                success: 2,
                total: 2
            })
        );

        let events = sink.events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], Event::Started(1));
        assert_eq!(events[1], Event::Finished(1));
        assert!(matches!(&events[2], Event::Report(r) if r.cycle == 1));
        assert_eq!(events[3], Event::Started(2));
        assert_eq!(events[4], Event::Finished(2));
        assert_eq!(events[5], Event::Report(report));
    }

    #[tokio::test]
    async fn test_timed_out_probe_does_not_block_cycle() {
        let slow = mock_server!(StatusCode::OK, set_delay(Duration::from_secs(5)));
        let fast = mock_server!(StatusCode::OK);

        let config = MonitorConfig {
            timeout: Duration::from_millis(100),
            ..MonitorConfig::default()
        };
        let endpoints = vec![
            Endpoint::new("slow", slow.uri()),
            Endpoint::new("fast", fast.uri()),
        ];
        let (mut scheduler, _) = scheduler(endpoints, &config);

        let start = Instant::now();
        let report = scheduler.run_cycle().await;
        assert!(start.elapsed() < Duration::from_secs(5));

        // Both mock servers listen on 127.0.0.1
        let entry = report.get("127.0.0.1").unwrap();
        assert_eq!((entry.success, entry.total), (1, 2));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_reports_no_data() {
        let mock_server = mock_server!(StatusCode::OK);
        let mut broken = Endpoint::new("broken", "http://broken.test/");
        broken.method = "NOT A METHOD".to_string();

        let endpoints = vec![broken, Endpoint::new("ok", mock_server.uri())];
        let (mut scheduler, _) = scheduler(endpoints, &MonitorConfig::default());

        let report = scheduler.run_cycle().await;

        let domains: Vec<_> = report.domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(domains, vec!["127.0.0.1", "broken.test"]);
        assert_eq!(
            report.get("broken.test").unwrap().availability,
            Availability::NoData
        );
        assert_eq!(
            report.get("127.0.0.1").unwrap().availability,
            Availability::Percent(100)
        );
    }

    #[tokio::test]
    async fn test_empty_endpoint_list() {
        let (mut scheduler, sink) = scheduler(Vec::new(), &MonitorConfig::default());
        let report = scheduler.run_cycle().await;

        assert!(report.domains.is_empty());
        assert_eq!(sink.reports(), 1);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = MonitorConfig {
            max_concurrency_per_domain: 0,
            ..MonitorConfig::default()
        };
        let sink = Arc::new(RecordingSink::default());

        let result = Scheduler::new(Vec::new(), &config, sink.clone());
        assert!(matches!(result, Err(ErrorKind::InvalidCapacity(0))));

        let endpoints = vec![Endpoint::new("a", "http://a.test/")];
        let result = Scheduler::new(endpoints, &config, sink);
        assert!(matches!(result, Err(ErrorKind::InvalidCapacity(0))));
    }

    #[test]
    fn test_one_gate_per_domain() {
        let endpoints = vec![
            Endpoint::new("a", "http://a.test/"),
            Endpoint::new("a2", "https://a.test:8443/health"),
            Endpoint::new("b", "http://b.test/"),
        ];
        let config = MonitorConfig {
            max_concurrency_per_domain: 3,
            ..MonitorConfig::default()
        };
        let (scheduler, _) = scheduler(endpoints, &config);

        assert_eq!(scheduler.gates().len(), 2);
        assert_eq!(
            scheduler
                .gates()
                .get(&Domain::from("a.test"))
                .unwrap()
                .capacity(),
            3
        );
        assert_eq!(scheduler.stats().len(), 2);
        assert_eq!(scheduler.cycle(), 0);
    }

    #[tokio::test]
    async fn test_run_repeats_cycles() {
        let mock_server = mock_server!(StatusCode::OK);
        let config = MonitorConfig {
            interval: Duration::from_millis(10),
            ..MonitorConfig::default()
        };
        let endpoints = vec![Endpoint::new("ok", mock_server.uri())];
        let (scheduler, sink) = scheduler(endpoints, &config);

        let handle = tokio::spawn(scheduler.run());
        tokio::time::timeout(Duration::from_secs(5), async {
            while sink.reports() < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("scheduler should keep running cycles");
        handle.abort();

        let events = sink.events();
        assert_eq!(events[0], Event::Started(1));
        assert!(events.contains(&Event::Started(3)));
    }
}
