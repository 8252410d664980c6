pub(crate) mod color;
pub(crate) mod log;
pub(crate) mod report;

use self::report::ReportFormatter;
use crate::options::{OutputMode, ReportFormat};
use supports_color::Stream;

/// Detects whether a terminal supports color, and gives details about that
/// support. It takes into account the `NO_COLOR` environment variable.
fn supports_color() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

/// Create a report formatter based on the given format and mode options.
///
/// Colors are only used if stdout supports them.
pub(crate) fn get_report_formatter(
    format: &ReportFormat,
    mode: &OutputMode,
) -> Box<dyn ReportFormatter> {
    let mode = if supports_color() {
        mode.clone()
    } else {
        OutputMode::Plain
    };
    match format {
        ReportFormat::Compact => Box::new(report::Compact::new(mode)),
        ReportFormat::Detailed => Box::new(report::Detailed::new(mode)),
        ReportFormat::Json => Box::new(report::Json::new()),
    }
}
