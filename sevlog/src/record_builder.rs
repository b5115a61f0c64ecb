use std::{
    fmt::{self, Write},
    ops::Shl,
};

use sevlog_core::Severity;

use crate::Logger;

/// Accumulates one message and commits it when dropped.
///
/// The severity is chosen when the builder is created and cannot change. The
/// record is emitted exactly once, on every exit path of the scope holding the
/// builder, including early returns and panics. Appending nothing still emits
/// a record with an empty message.
///
/// ```rust
/// use sevlog::{LogMemory, logger_config};
///
/// let memory = LogMemory::new();
/// let logger = logger_config()
///     .with_tag("RTB")
///     .no_stdout()
///     .with_writer(memory.clone())
///     .build();
///
/// logger.warning().append("disk usage at ").append(93).append('%');
/// let _ = logger.error() << "code " << 7;
///
/// let lines = memory.lines();
/// assert!(lines[0].starts_with("[  Warning ] From RTB @"));
/// assert!(lines[0].ends_with(" -- disk usage at 93%"));
/// assert!(lines[1].ends_with(" -- code 7"));
/// ```
pub struct RecordBuilder {
    logger: Logger,
    severity: Severity,
    buf: String,
    enabled: bool,
}

impl RecordBuilder {
    pub(crate) fn new(logger: Logger, severity: Severity) -> Self {
        let enabled = logger.enabled(severity);
        Self {
            logger,
            severity,
            buf: String::new(),
            enabled,
        }
    }

    /// Appends the `Display` text of `value`, without separator.
    pub fn append<T: fmt::Display>(&mut self, value: T) -> &mut Self {
        if self.enabled {
            write!(self.buf, "{value}").ok();
        }
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message accumulated so far. Always empty when the severity is filtered out.
    pub fn message(&self) -> &str {
        &self.buf
    }

    /// Commits now instead of at the end of the scope.
    pub fn commit(self) {}
}

impl Write for RecordBuilder {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.enabled {
            self.buf.push_str(s);
        }
        Ok(())
    }
}

impl<T: fmt::Display> Shl<T> for RecordBuilder {
    type Output = RecordBuilder;

    fn shl(mut self, value: T) -> Self::Output {
        self.append(value);
        self
    }
}

impl Drop for RecordBuilder {
    fn drop(&mut self) {
        if self.enabled {
            self.logger
                .commit(self.severity, std::mem::take(&mut self.buf));
        }
    }
}

impl fmt::Debug for RecordBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBuilder")
            .field("severity", &self.severity)
            .field("tag", &self.logger.tag())
            .field("message", &self.buf)
            .finish()
    }
}
