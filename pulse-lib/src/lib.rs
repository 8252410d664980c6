//! `pulse` is a library for monitoring the availability of HTTP endpoints.
//!
//! A [`Scheduler`] probes a fixed list of [`Endpoint`]s in repeating cycles,
//! limits the number of concurrent probes per domain and reports the share of
//! successful probes per domain to a [`ReportSink`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use pulse_lib::{AvailabilityReport, Endpoint, MonitorConfig, ReportSink, Result, Scheduler};
//!
//! struct Print;
//!
//! impl ReportSink for Print {
//!     fn report(&self, report: &AvailabilityReport) {
//!         for entry in &report.domains {
//!             println!("{} has {} availability", entry.domain, entry.availability);
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let endpoints = vec![Endpoint::new("home", "https://example.com/")];
//!     let scheduler = Scheduler::new(endpoints, &MonitorConfig::default(), Arc::new(Print))?;
//!     scheduler.run().await;
//!     Ok(())
//! }
//! ```
//!
//! The building blocks can also be used on their own. A single probe only
//! needs a [`Prober`], the [`AdmissionGate`] of the endpoint's domain and a
//! [`StatsAggregator`]:
//!
//! ```no_run
//! use pulse_lib::{AdmissionGate, Endpoint, ProberBuilder, Result, StatsAggregator};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let endpoint = Endpoint::new("home", "https://example.com/");
//!     let gate = AdmissionGate::new(endpoint.domain(), 10)?;
//!     let stats = StatsAggregator::new();
//!
//!     let prober = ProberBuilder::default().prober()?;
//!     let status = prober.probe(&endpoint, &gate, &stats).await;
//!     println!("{status}");
//!     Ok(())
//! }
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]

mod config;
mod domain;
mod probe;
mod scheduler;
mod stats;
mod types;

pub mod admission;
pub mod report;

pub use admission::{
    AdmissionGate, AdmissionGates, DEFAULT_MAX_CONCURRENCY_PER_DOMAIN, GatePermit,
};
pub use config::{DEFAULT_INTERVAL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, MonitorConfig};
pub use domain::{Domain, extract_domain};
pub use probe::{Prober, ProberBuilder};
pub use report::{AvailabilityReport, CycleId, DomainAvailability, ReportSink};
pub use scheduler::Scheduler;
pub use stats::{Availability, DomainStats, StatsAggregator};
pub use types::*;
