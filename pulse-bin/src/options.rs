use crate::verbosity::Verbosity;
use anyhow::{Context, Result};
use clap::builder::{PossibleValuesParser, RangedU64ValueParser};
use clap::{Parser, builder::TypedValueParser};
use const_format::{concatcp, formatcp};
use pulse_lib::{
    DEFAULT_INTERVAL, DEFAULT_MAX_CONCURRENCY_PER_DOMAIN, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
    MonitorConfig,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, time::Duration};
use strum::{Display, EnumString, VariantNames};

pub(crate) const PULSE_CONFIG_FILE: &str = "pulse.toml";

// this exists because clap requires `&str` type values for defaults
// whereas serde expects owned values
const MAX_DOMAIN_CONCURRENCY_STR: &str = concatcp!(DEFAULT_MAX_CONCURRENCY_PER_DOMAIN);
// humantime spelling of `DEFAULT_TIMEOUT` and `DEFAULT_INTERVAL`
const TIMEOUT_STR: &str = "500ms";
const INTERVAL_STR: &str = "15s";
// We use a custom help message here because we want to show the default
// value of the config file, but also be able to check if the user has
// provided a custom value. If they didn't, we won't throw an error if
// the file doesn't exist.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    PULSE_CONFIG_FILE,
);

/// The format to use for availability reports
#[derive(Debug, Deserialize, Default, Clone, Display, EnumString, VariantNames, PartialEq, Eq)]
#[non_exhaustive]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportFormat {
    /// One line per domain
    #[default]
    Compact,
    /// One line per domain, including probe counts
    Detailed,
    /// One JSON object per report
    Json,
}

/// The different formatter modes
///
/// This decides over whether to use color or plain text for the output.
#[derive(Debug, Deserialize, Default, Clone, Display, EnumString, VariantNames, PartialEq, Eq)]
#[non_exhaustive]
pub(crate) enum OutputMode {
    /// Plain text output.
    ///
    /// Helpful for scripting or when you want to pipe the output to another
    /// program.
    #[serde(rename = "plain")]
    #[strum(serialize = "plain", ascii_case_insensitive)]
    Plain,

    /// Colorful output.
    ///
    /// Availability values and log levels are highlighted, if the terminal
    /// supports it.
    ///
    /// This is the default output mode.
    #[serde(rename = "color")]
    #[strum(serialize = "color", ascii_case_insensitive)]
    #[default]
    Color,
}

impl OutputMode {
    /// Returns `true` if the output mode is `Plain`
    pub(crate) const fn is_plain(&self) -> bool {
        matches!(self, OutputMode::Plain)
    }
}

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    max_domain_concurrency: usize = DEFAULT_MAX_CONCURRENCY_PER_DOMAIN;
    timeout: Duration = DEFAULT_TIMEOUT;
    interval: Duration = DEFAULT_INTERVAL;
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    verbosity: Verbosity = Verbosity::default();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// pulse periodically probes HTTP endpoints and reports the availability of
/// their domains.
///
/// Probes run concurrently, with a limit on the number of probes in flight
/// against any single domain. After every check cycle, the share of
/// successful probes since startup is printed for each domain.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct PulseOptions {
    /// YAML file listing the endpoints to probe
    #[arg(
        name = "endpoints",
        value_name = "ENDPOINTS",
        long_help = "YAML file listing the endpoints to probe. Each entry has a `name`
and a `url`, and optionally a `method` (default: GET), `headers`
and a `body`:

- name: index page
  url: https://example.com/
- name: create user
  url: https://api.example.com/users
  method: POST
  headers:
    content-type: application/json
  body: '{\"name\": \"pulse\"}'"
    )]
    pub(crate) endpoints: PathBuf,

    /// Configuration file to use
    #[arg(short, long = "config")]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

/// The main configuration for pulse
#[derive(Parser, Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(default = "verbosity")]
    pub(crate) verbose: Verbosity,

    /// Do not abort slow requests
    #[arg(
        long,
        long_help = "Do not abort slow requests. Without this flag, a probe that takes longer than
`--timeout` counts as a failure."
    )]
    #[serde(default)]
    pub(crate) no_req_timeout: bool,

    /// Log diagnostics, including the bodies of failed responses
    #[arg(
        long,
        long_help = "Log diagnostics at debug level, including response times and the bodies
of failed responses, and print markers around every check cycle."
    )]
    #[serde(default)]
    pub(crate) debug_logs: bool,

    /// Maximum number of concurrent probes per domain
    #[arg(long, value_name = "N", default_value = MAX_DOMAIN_CONCURRENCY_STR)]
    #[serde(default = "max_domain_concurrency")]
    pub(crate) max_domain_concurrency: usize,

    /// Deadline for a single probe, e.g. `500ms` or `2s`
    #[arg(
        long,
        value_name = "DURATION",
        default_value = TIMEOUT_STR,
        value_parser = humantime::parse_duration
    )]
    #[serde(default = "timeout", with = "humantime_serde")]
    pub(crate) timeout: Duration,

    /// Pause between two check cycles, e.g. `15s` or `1m`
    #[arg(
        long,
        value_name = "DURATION",
        default_value = INTERVAL_STR,
        value_parser = humantime::parse_duration
    )]
    #[serde(default = "interval", with = "humantime_serde")]
    pub(crate) interval: Duration,

    /// User agent
    #[arg(short, long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Set the output display mode. Determines how results are presented in the terminal
    #[arg(long, default_value = "color", value_parser = PossibleValuesParser::new(OutputMode::VARIANTS).map(|s| s.parse::<OutputMode>().unwrap()))]
    #[serde(default)]
    pub(crate) mode: OutputMode,

    /// Output format of availability reports
    #[arg(short, long, default_value = "compact", value_parser = PossibleValuesParser::new(ReportFormat::VARIANTS).map(|s| s.parse::<ReportFormat>().unwrap()))]
    #[serde(default)]
    pub(crate) format: ReportFormat,

    /// Number of threads to utilize.
    /// Defaults to number of cores available to the system
    #[arg(short = 'T', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    #[serde(default)]
    pub(crate) threads: Option<usize>,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        // Read configuration file
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        // NOTE: if you see an error within this macro call, check to make sure that
        // that the fields provided to fold_in! match all the fields of the Config struct.
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Keys with defaults to assign
                debug_logs: false,
                format: ReportFormat::default(),
                interval: DEFAULT_INTERVAL,
                max_domain_concurrency: DEFAULT_MAX_CONCURRENCY_PER_DOMAIN,
                mode: OutputMode::Color,
                no_req_timeout: false,
                threads: None,
                timeout: DEFAULT_TIMEOUT,
                user_agent: DEFAULT_USER_AGENT,
                verbose: Verbosity::default(),
            }
        }
    }

    /// The values the monitoring core runs with
    pub(crate) fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            max_concurrency_per_domain: self.max_domain_concurrency,
            timeout: self.timeout,
            timeout_disabled: self.no_req_timeout,
            interval: self.interval,
            debug: self.debug_logs,
            user_agent: self.user_agent.clone(),
        }
    }
}
