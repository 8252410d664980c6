//! `pulse` periodically probes HTTP endpoints and reports the availability
//! of their domains.
//!
//! The pulse binary is a wrapper around pulse-lib, which provides the
//! monitoring core.
//!
//! List the endpoints to probe in a YAML file:
//! ```yaml
//! - name: index page
//!   url: https://example.com/
//! - name: health check
//!   url: https://api.example.com/health
//!   method: HEAD
//! ```
//!
//! Then run:
//! ```sh
//! pulse endpoints.yaml
//! ```
//!
//! Print a report every minute, without aborting slow requests:
//! ```sh
//! pulse --interval 1m --no-req-timeout endpoints.yaml
//! ```
//!
//! Debug slow or failing endpoints:
//! ```sh
//! pulse --debug-logs --max-domain-concurrency 2 endpoints.yaml
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Error, Result, bail};
use clap::Parser;
use log::{error, info};

#[cfg(feature = "native-tls")]
use openssl_sys as _; // required for vendored-openssl feature

use pulse_lib::{ErrorKind, Scheduler, load_endpoints};

mod formatters;
mod options;
mod sink;
mod verbosity;

use crate::formatters::log::init_logging;
use crate::options::{Config, PULSE_CONFIG_FILE, PulseOptions};
use crate::sink::StdoutSink;

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator.
    #[allow(unused)]
    UnexpectedFailure = 1,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    // See: https://doc.rust-lang.org/stable/std/process/fn.exit.html
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Parse the command line, falling back to exit code 3 for invalid values.
///
/// `--help` and `--version` still print and exit as usual.
fn parse_options() -> PulseOptions {
    match PulseOptions::try_parse() {
        Ok(opts) => opts,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // Printing may only fail if stderr is gone
            let _ = e.print();
            std::process::exit(ExitCode::ConfigFile as i32);
        }
    }
}

/// Merge all provided config options into one.
/// This includes a potential config file and command-line arguments.
///
/// Logging is initialised from the merged options. If the config file
/// cannot be loaded, the command-line options alone decide, so that the
/// error can still be logged.
fn load_config() -> Result<PulseOptions> {
    let mut opts = parse_options();
    let merged = merge_config_file(&mut opts);

    init_logging(
        &opts.config.verbose,
        &opts.config.mode,
        opts.config.debug_logs,
    );

    merged?;
    Ok(opts)
}

/// Load a potentially existing config file and merge it into the config
/// from the CLI. `opts` stays untouched if the file cannot be loaded.
fn merge_config_file(opts: &mut PulseOptions) -> Result<()> {
    if let Some(config_file) = &opts.config_file {
        match Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // If no config file was explicitly provided, we try to load the default
        // config file from the current directory if the file exits. This will
        // raise an error if the file is invalid, just like the explicit provided
        // config file.
        let default_config = PathBuf::from(PULSE_CONFIG_FILE);
        if default_config.is_file() {
            match Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }

    // The flag is range-checked by clap, the config file value is not
    if opts.config.threads == Some(0) {
        bail!("Number of threads must be greater than 0");
    }
    Ok(())
}

/// Set up runtime and call pulse entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = match opts.config.threads {
        Some(threads) => {
            // We define our own runtime instead of the `tokio::main` attribute
            // since we want to make the number of threads configurable
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()?
        }
        None => tokio::runtime::Runtime::new()?,
    };

    match runtime.block_on(run(&opts)) {
        Err(e) if Some(io::ErrorKind::BrokenPipe) == underlying_io_error_kind(&e) => {
            exit(ExitCode::Success as i32);
        }
        res => res,
    }
}

/// Check if the given error can be traced back to an `io::ErrorKind`
/// This is helpful for troubleshooting the root cause of an error.
/// Code is taken from the anyhow documentation.
fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}

/// Monitor the configured endpoints until the process is terminated
async fn run(opts: &PulseOptions) -> Result<i32> {
    let endpoints = match load_endpoints(&opts.endpoints) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            error!("Cannot load endpoints: {e}");
            return Ok(ExitCode::ConfigFile as i32);
        }
    };

    let config = opts.config.monitor_config();
    let sink = Arc::new(StdoutSink::new(&opts.config));

    let scheduler = match Scheduler::new(endpoints, &config, sink) {
        Ok(scheduler) => scheduler,
        Err(e @ ErrorKind::InvalidCapacity(_)) => {
            error!("Invalid `--max-domain-concurrency`: {e}");
            return Ok(ExitCode::ConfigFile as i32);
        }
        Err(e) => return Err(e).context("Cannot set up monitoring"),
    };

    info!(
        "Reporting every {} after all probes of a cycle completed",
        humantime::format_duration(config.interval)
    );
    scheduler.run().await;

    Ok(ExitCode::Success as i32)
}
