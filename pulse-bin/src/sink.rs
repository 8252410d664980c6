//! Prints availability reports to stdout.

use std::io::{self, Write};

use log::error;
use pulse_lib::{AvailabilityReport, CycleId, ReportSink};

use crate::formatters::{get_report_formatter, report::ReportFormatter};
use crate::options::Config;

/// A [`ReportSink`] writing to a shared output, stdout by default.
///
/// Every report is written while holding the output lock, so the lines of a
/// report are never interleaved with other stdout output. Cycle markers are
/// only written in debug mode.
pub(crate) struct WriterSink<W> {
    formatter: Box<dyn ReportFormatter>,
    cycle_markers: bool,
    out: W,
}

/// Output that can be locked for the duration of one write
pub(crate) trait LockWrite: Send + Sync {
    /// Write all of `text` and flush it, while holding the lock
    fn write_locked(&self, text: &str) -> io::Result<()>;
}

impl LockWrite for io::Stdout {
    fn write_locked(&self, text: &str) -> io::Result<()> {
        let mut out = self.lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

pub(crate) type StdoutSink = WriterSink<io::Stdout>;

impl StdoutSink {
    pub(crate) fn new(config: &Config) -> Self {
        WriterSink::with_writer(
            get_report_formatter(&config.format, &config.mode),
            config.debug_logs,
            io::stdout(),
        )
    }
}

impl<W: LockWrite> WriterSink<W> {
    pub(crate) fn with_writer(
        formatter: Box<dyn ReportFormatter>,
        cycle_markers: bool,
        out: W,
    ) -> Self {
        Self {
            formatter,
            cycle_markers,
            out,
        }
    }

    fn write(&self, text: &str) {
        if let Err(e) = self.out.write_locked(text) {
            error!("Cannot write report: {e}");
        }
    }
}

impl<W: LockWrite> ReportSink for WriterSink<W> {
    fn cycle_started(&self, cycle: CycleId) {
        if !self.cycle_markers {
            return;
        }
        if let Some(marker) = self.formatter.cycle_started(cycle) {
            self.write(&marker);
        }
    }

    fn cycle_finished(&self, cycle: CycleId) {
        if !self.cycle_markers {
            return;
        }
        if let Some(marker) = self.formatter.cycle_finished(cycle) {
            self.write(&marker);
        }
    }

    fn report(&self, report: &AvailabilityReport) {
        match self.formatter.format(report) {
            Ok(text) => self.write(&text),
            Err(e) => error!("Cannot format report of cycle {}: {e:#}", report.cycle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::report::{Compact, Json};
    use crate::formatters::report::tests::sample_report;
    use crate::options::OutputMode;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Buffer(Mutex<String>);

    impl LockWrite for Buffer {
        fn write_locked(&self, text: &str) -> io::Result<()> {
            self.0.lock().unwrap().push_str(text);
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    fn run_cycle<W: LockWrite>(sink: &WriterSink<W>) {
        sink.cycle_started(4);
        sink.cycle_finished(4);
        sink.report(&sample_report());
    }

    #[test]
    fn test_markers_only_in_debug_mode() {
        let sink =
            WriterSink::with_writer(Box::new(Compact::new(OutputMode::Plain)), false, Buffer::default());
        run_cycle(&sink);
        let output = sink.out.contents();
        assert!(!output.contains("CHECK CYCLE"));
        assert!(output.contains("a.test has 50% availability"));

        let sink =
            WriterSink::with_writer(Box::new(Compact::new(OutputMode::Plain)), true, Buffer::default());
        run_cycle(&sink);
        let output = sink.out.contents();
        let begin = output.find("CHECK CYCLE 4 BEGIN").unwrap();
        let end = output.find("CHECK CYCLE 4 END").unwrap();
        let report = output.find("AVAILABILITY REPORT").unwrap();
        assert!(begin < end && end < report);
    }

    #[test]
    fn test_json_output_stays_parseable_in_debug_mode() {
        let sink = WriterSink::with_writer(Box::new(Json::new()), true, Buffer::default());
        run_cycle(&sink);

        let output = sink.out.contents();
        assert_eq!(output.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["cycle"], 4);
    }
}
