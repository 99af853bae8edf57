//! Log line format and subscriber setup
//!
//! Every event is written to stderr as
//! `2024-05-01 12:00:00,123 - INFO - message` followed by an empty line.

use chrono::Local;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Event formatter producing blank-line separated records
#[derive(Debug, Default, Clone, Copy)]
pub struct SeparatedFormat;

impl<S, N> FormatEvent<S, N> for SeparatedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            level_name(*event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)?;
        writeln!(writer)
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Filter for the requested verbosity; `RUST_LOG` wins when set
pub fn filter(verbose: u8, quiet: bool) -> EnvFilter {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber
pub fn init_tracing(verbose: u8, quiet: bool) {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .event_format(SeparatedFormat)
        .with_writer(std::io::stderr)
        .with_env_filter(filter(verbose, quiet))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(SeparatedFormat)
            .with_writer(move || writer.clone())
            .with_max_level(Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_record_layout() {
        let output = capture(|| tracing::info!("Total Execution Time - [{:.2}] seconds", 1.5));

        assert!(output.ends_with(" - INFO - Total Execution Time - [1.50] seconds\n\n"));
        let timestamp = output.split(" - ").next().unwrap();
        let (seconds, millis) = timestamp.split_once(',').unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(seconds, "%Y-%m-%d %H:%M:%S").is_ok());
        assert_eq!(millis.len(), 3);
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_records_are_blank_line_separated() {
        let output = capture(|| {
            tracing::info!("first");
            tracing::warn!("second");
        });

        let records: Vec<&str> = output.split("\n\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with(" - INFO - first"));
        assert!(records[1].ends_with(" - WARNING - second"));
    }

    #[test]
    fn test_span_fields_are_not_printed() {
        let output = capture(|| {
            let span = tracing::info_span!("reconcile", group = "ocid1.x");
            let _guard = span.enter();
            tracing::error!("boom");
        });

        assert!(output.ends_with(" - ERROR - boom\n\n"));
        assert!(!output.contains("reconcile"));
    }

    #[test]
    fn test_level_names() {
        assert_eq!(level_name(Level::WARN), "WARNING");
        assert_eq!(level_name(Level::ERROR), "ERROR");
    }
}
