use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use chrono::NaiveDateTime;
use colored::Colorize;

use crate::{Severity, log_writer::LogWriter};

/// strftime pattern of the record timestamp, microsecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S%.6f";

/// A committed log record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    severity: Severity,
    tag: Arc<str>,
    timestamp: NaiveDateTime,
    message: String,
}

impl Record {
    pub fn new(
        severity: Severity,
        tag: impl Into<Arc<str>>,
        timestamp: NaiveDateTime,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            tag: tag.into(),
            timestamp,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Maps a record to the line written by every stream of a sink.
pub type Formatter = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// `[<label>] From <tag> @<timestamp> -- <message>`
pub fn format_record(record: &Record) -> String {
    format!(
        "[{}] From {} @{} -- {}",
        record.severity.label(),
        record.tag,
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.message
    )
}

/// Same layout as [`format_record`] with a colored severity label.
pub fn colored_format(record: &Record) -> String {
    let label = record.severity.label();
    let label = match record.severity {
        Severity::Info => label.green(),
        Severity::Debug => label.blue(),
        Severity::Warning => label.yellow(),
        Severity::Error => label.red(),
        Severity::Critical => label.bright_red().bold(),
    };
    format!(
        "[{label}] From {} @{} -- {}",
        record.tag,
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.message
    )
}

struct Stream {
    writer: Box<dyn LogWriter>,
    failed: bool,
}

impl Stream {
    // Only the first failure of a stream is reported.
    fn report(&mut self, index: usize, result: std::io::Result<()>) {
        match result {
            Ok(()) => {}
            Err(err) if !self.failed => {
                self.failed = true;
                eprintln!("sevlog: log stream #{index} failed: {err}");
            }
            Err(_) => {}
        }
    }
}

/// A formatter plus the streams it writes to.
///
/// One mutex guards all streams: each record is written to every stream
/// before the next one starts, so lines never interleave and every stream
/// sees the same order.
pub struct Sink {
    formatter: Formatter,
    streams: Mutex<Vec<Stream>>,
}

impl Sink {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            streams: Mutex::new(Vec::new()),
        }
    }

    pub fn add_stream(&mut self, writer: Box<dyn LogWriter>) {
        self.streams
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Stream {
                writer,
                failed: false,
            });
    }

    pub fn stream_count(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn format(&self, record: &Record) -> String {
        (self.formatter)(record)
    }

    /// Formats `record` once and writes the line to every stream.
    pub fn consume(&self, record: &Record) {
        let line = self.format(record);
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        for (index, stream) in streams.iter_mut().enumerate() {
            let result = stream.writer.regular(&line);
            stream.report(index, result);
        }
    }

    pub fn flush(&self) {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        for (index, stream) in streams.iter_mut().enumerate() {
            let result = stream.writer.flush();
            stream.report(index, result);
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new(Arc::new(format_record))
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("streams", &self.stream_count())
            .finish_non_exhaustive()
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use chrono::NaiveDate;

    use super::*;
    use crate::log_writer::LogMemory;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 3, 1)
            .unwrap()
            .and_hms_micro_opt(9, 5, 7, 42)
            .unwrap()
    }

    #[test]
    fn test_format_record() {
        let record = Record::new(Severity::Warning, "X", timestamp(), "hello");
        assert_eq!(
            format_record(&record),
            "[  Warning ] From X @2015-03-01, 09:05:07.000042 -- hello"
        );
    }

    #[test]
    fn test_format_every_label() {
        let expected = [
            "[   Info   ] From RTB @2015-03-01, 09:05:07.000042 -- ",
            "[   Debug  ] From RTB @2015-03-01, 09:05:07.000042 -- ",
            "[  Warning ] From RTB @2015-03-01, 09:05:07.000042 -- ",
            "[   Error  ] From RTB @2015-03-01, 09:05:07.000042 -- ",
            "[ Critical ] From RTB @2015-03-01, 09:05:07.000042 -- ",
        ];
        for (severity, expected) in Severity::ALL.into_iter().zip(expected) {
            let record = Record::new(severity, "RTB", timestamp(), "");
            assert_eq!(format_record(&record), expected);
        }
    }

    #[test]
    fn test_colored_format_without_tty() {
        colored::control::set_override(false);
        let record = Record::new(Severity::Critical, "X", timestamp(), "boom");
        assert_eq!(colored_format(&record), format_record(&record));
        colored::control::unset_override();
    }

    #[test]
    fn test_sink_writes_same_line_to_every_stream() {
        let first = LogMemory::new();
        let second = LogMemory::new();
        let mut sink = Sink::default();
        sink.add_stream(Box::new(first.clone()));
        sink.add_stream(Box::new(second.clone()));
        assert_eq!(sink.stream_count(), 2);
        let record = Record::new(Severity::Error, "X", timestamp(), "disk full");
        sink.consume(&record);
        assert_eq!(first.lines(), vec![format_record(&record)]);
        assert_eq!(first.lines(), second.lines());
    }

    #[test]
    fn test_sink_custom_formatter() {
        let memory = LogMemory::new();
        let mut sink = Sink::new(Arc::new(|record: &Record| {
            format!("{}:{}", record.severity().name(), record.message())
        }));
        sink.add_stream(Box::new(memory.clone()));
        sink.consume(&Record::new(Severity::Debug, "X", timestamp(), "hi"));
        assert_eq!(memory.lines(), vec!["Debug:hi"]);
    }

    struct Broken;

    impl LogWriter for Broken {
        fn regular(&mut self, _: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_failing_stream_does_not_block_others() {
        let memory = LogMemory::new();
        let mut sink = Sink::default();
        sink.add_stream(Box::new(Broken));
        sink.add_stream(Box::new(memory.clone()));
        for i in 0..3 {
            sink.consume(&Record::new(Severity::Info, "X", timestamp(), i.to_string()));
        }
        sink.flush();
        assert_eq!(memory.lines().len(), 3);
    }
}
