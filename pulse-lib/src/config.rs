use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::admission::DEFAULT_MAX_CONCURRENCY_PER_DOMAIN;

/// Default deadline for a single probe, measured from dispatch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default pause between the end of one check cycle and the start of the next
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Default user agent, `pulse/<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("pulse/", env!("CARGO_PKG_VERSION"));

/// Values the monitoring core runs with.
///
/// Parsing flags or files into this struct is up to the caller; every field
/// falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Maximum number of probes in flight against a single domain
    #[serde(default = "default_max_concurrency_per_domain")]
    pub max_concurrency_per_domain: usize,

    /// Deadline for a single probe
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Do not enforce [`MonitorConfig::timeout`]
    #[serde(default)]
    pub timeout_disabled: bool,

    /// Pause between two check cycles
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Emit verbose diagnostics, such as the bodies of failed responses
    #[serde(default)]
    pub debug: bool,

    /// User agent sent with every probe unless the endpoint overrides it
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_concurrency_per_domain: default_max_concurrency_per_domain(),
            timeout: default_timeout(),
            timeout_disabled: false,
            interval: default_interval(),
            debug: false,
            user_agent: default_user_agent(),
        }
    }
}

const fn default_max_concurrency_per_domain() -> usize {
    DEFAULT_MAX_CONCURRENCY_PER_DOMAIN
}

const fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

const fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl MonitorConfig {
    /// The deadline to enforce per probe, if any
    #[must_use]
    pub const fn effective_timeout(&self) -> Option<Duration> {
        if self.timeout_disabled {
            None
        } else {
            Some(self.timeout)
        }
    }
}
