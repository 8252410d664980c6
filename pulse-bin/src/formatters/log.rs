use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

use crate::{formatters, options::OutputMode, verbosity::Verbosity};

/// Log level filter for the `pulse` crates.
///
/// `--debug-logs` raises the level to at least `debug`, a higher verbosity
/// from `-v` flags is kept.
pub(crate) fn level_filter(verbose: &Verbosity, debug_logs: bool) -> LevelFilter {
    let level_filter = verbose.log_level_filter();
    if debug_logs {
        level_filter.max(LevelFilter::Debug)
    } else {
        level_filter
    }
}

/// Initialize the logging system with the given verbosity level.
///
/// All log output goes to stderr, so that reports on stdout stay parseable.
pub(crate) fn init_logging(verbose: &Verbosity, mode: &OutputMode, debug_logs: bool) {
    // Set a base level for all modules to `warn`, which is a reasonable default.
    // It will be overridden by RUST_LOG if it's set.
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if std::env::var("RUST_LOG").is_err() {
        let level_filter = level_filter(verbose, debug_logs);

        // Other crates (e.g. `reqwest` or `hyper`) stay at `warn`
        builder.filter_level(LevelFilter::Warn);
        builder
            .filter_module("pulse", level_filter)
            .filter_module("pulse_lib", level_filter);
    }

    if mode.is_plain() {
        // Explicitly disable colors for plain output
        builder.format(move |buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    } else {
        builder.format(move |buf, record| {
            let level = record.level();
            let color = formatters::color::color_for_level(level);
            writeln!(
                buf,
                "{} {}",
                color.apply_to(format!("[{level}]")),
                record.args()
            )
        });
    }

    builder.init();
}
