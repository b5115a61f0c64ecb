//! # sevlog
//! Severity-tagged line logger with stream-style record builders, console and file sinks.
//!
//! Every line has the layout
//! `[<severity label>] From <tag> @<YYYY-MM-DD, HH:MM:SS.ffffff> -- <message>`.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! sevlog = "0.1.0"
//! ```
//!
//! ```rust
//! use sevlog::{Severity, logger_config};
//!
//! let logger = logger_config()
//!     .with_tag("RTB")
//!     .with_level(Severity::Info)
//!     .build();
//! logger.info().append("Information");
//! logger.critical().append("exit code ").append(3);
//! ```
//!
//! ## Global logger and the `log` facade
//! ```rust
//! use sevlog::logger_config;
//!
//! let _guard = logger_config()
//!     .with_tag("main")
//!     .init_global();
//! sevlog::warning().append("from the global logger");
//! log::error!("log macros are routed too");
//! // guard flushes and uninstalls the logger when dropped
//! ```
//!
//! ## Logging to files
//! The log file is created if it does not exist and appended to if it does.
//! Failing to open it is reported when configuring, not when logging.
//!
//! ```rust
//! use sevlog::logger_config;
//!
//! std::fs::remove_file("/tmp/sevlog_doc.log").ok();
//! let logger = logger_config()
//!     .with_log_file("/tmp/sevlog_doc.log")
//!     .expect("Unable to create log file")
//!     .no_stdout()
//!     .build();
//! logger.error().append("Hello, world!");
//! drop(logger); // flushes the file
//! assert!(std::fs::read_to_string("/tmp/sevlog_doc.log").unwrap().ends_with("-- Hello, world!\n"));
//! ```
//!
//! Records committed through the global functions before a global logger is
//! installed are lost.

mod record_builder;

use chrono::Local;
use log::{LevelFilter, Log};
use std::{
    fmt,
    path::Path,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

pub use record_builder::RecordBuilder;
pub use sevlog_core::{
    Formatter, LogFile, LogMemory, LogStdout, LogStream, LogWriter, ParseSeverityError, Record,
    SEVLOG_CONFIG, Severity, SevlogConfig, Sink, TIMESTAMP_FORMAT, colored_format, format_record,
};

/// Tag used when none is configured.
pub const DEFAULT_TAG: &str = "main";

/// Frozen engine state shared by every handle.
struct Engine {
    /// Minimum severity
    level: Severity,
    sink: Sink,
}

/// Handle to a configured logging engine.
///
/// Cloning is cheap and clones share the engine. The streams are flushed when
/// the last handle is dropped.
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    tag: Arc<str>,
}

impl Logger {
    /// A logger without any stream. Everything committed to it is lost.
    pub fn disconnected() -> Self {
        Self {
            engine: Arc::new(Engine {
                level: Severity::Info,
                sink: Sink::default(),
            }),
            tag: DEFAULT_TAG.into(),
        }
    }

    /// Same engine, different tag.
    pub fn with_tag(&self, tag: &str) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            tag: tag.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn level(&self) -> Severity {
        self.engine.level
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.engine.level
    }

    pub fn record(&self, severity: Severity) -> RecordBuilder {
        RecordBuilder::new(self.clone(), severity)
    }

    pub fn info(&self) -> RecordBuilder {
        self.record(Severity::Info)
    }

    pub fn debug(&self) -> RecordBuilder {
        self.record(Severity::Debug)
    }

    pub fn warning(&self) -> RecordBuilder {
        self.record(Severity::Warning)
    }

    pub fn error(&self) -> RecordBuilder {
        self.record(Severity::Error)
    }

    pub fn critical(&self) -> RecordBuilder {
        self.record(Severity::Critical)
    }

    /// Commits a complete message.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        if self.enabled(severity) {
            self.commit(severity, message.into());
        }
    }

    pub fn flush(&self) {
        self.engine.sink.flush();
    }

    pub(crate) fn commit(&self, severity: Severity, message: String) {
        let record = Record::new(
            severity,
            Arc::clone(&self.tag),
            Local::now().naive_local(),
            message,
        );
        self.engine.sink.consume(&record);
    }

    fn same_engine(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("tag", &self.tag)
            .field("level", &self.engine.level)
            .field("sink", &self.engine.sink)
            .finish()
    }
}

static DISCONNECTED: LazyLock<Logger> = LazyLock::new(Logger::disconnected);

/// Process-wide logger used by the free functions and the `log` facade.
static GLOBAL_LOGGER: LazyLock<RwLock<Option<Logger>>> = LazyLock::new(|| {
    if log::set_boxed_logger(Box::new(LogBridge)).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    RwLock::new(None)
});

/// Returns the global logger, or a disconnected one if none is installed.
pub fn global() -> Logger {
    GLOBAL_LOGGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| DISCONNECTED.clone())
}

pub fn info() -> RecordBuilder {
    global().info()
}

pub fn debug() -> RecordBuilder {
    global().debug()
}

pub fn warning() -> RecordBuilder {
    global().warning()
}

pub fn error() -> RecordBuilder {
    global().error()
}

pub fn critical() -> RecordBuilder {
    global().critical()
}

/// Routes `log` facade records into the global logger.
struct LogBridge;

impl Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        GLOBAL_LOGGER
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|logger| logger.enabled(metadata.level().into()))
    }

    fn log(&self, record: &log::Record) {
        let global = GLOBAL_LOGGER.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = global.as_ref() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {
        if let Some(logger) = GLOBAL_LOGGER
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            logger.flush();
        }
    }
}

/// Guard returned by [`ConfigBuilder::init_global`].
/// Flushes the logger and uninstalls it when dropped.
pub struct LoggerGuard {
    logger: Logger,
}

impl LoggerGuard {
    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        self.logger.flush();
        let mut global = GLOBAL_LOGGER.write().unwrap_or_else(PoisonError::into_inner);
        if global
            .as_ref()
            .is_some_and(|installed| installed.same_engine(&self.logger))
        {
            *global = None;
        }
    }
}

/// Builder for configuring and initializing the logger.
pub struct ConfigBuilder {
    log_file: Option<LogFile>,
    no_stdout: bool,
    writers: Vec<Box<dyn LogWriter>>,
    formatter: Formatter,
    level: Severity,
    tag: Option<String>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            log_file: None,
            no_stdout: false,
            writers: Vec::new(),
            formatter: Arc::new(format_record),
            level: Severity::Info,
            tag: None,
        }
    }
}

impl ConfigBuilder {
    /// Defaults overridden by `SEVLOG_TAG`, `SEVLOG_LEVEL` and `SEVLOG_FILE`.
    pub fn from_env() -> Result<Self, std::io::Error> {
        Self::from_config(&SEVLOG_CONFIG)
    }

    /// Defaults overridden by whatever `config` sets.
    /// Fails when `config.file` cannot be opened for appending.
    pub fn from_config(config: &SevlogConfig) -> Result<Self, std::io::Error> {
        Self::default()
            .maybe_with_tag(config.tag.as_deref())
            .with_level(config.level.unwrap_or_default())
            .maybe_with_log_file(config.file.as_deref())
    }

    /// Appends to `path`, creating it if missing.
    /// An unopenable path is a configuration error, returned here rather than
    /// dropping file output later.
    pub fn with_log_file<P: AsRef<Path>>(self, path: P) -> Result<Self, std::io::Error> {
        Ok(Self {
            log_file: Some(LogFile::new(path)?),
            ..self
        })
    }
    /// [`with_log_file`](Self::with_log_file) when `path` is `Some`, otherwise no file.
    pub fn maybe_with_log_file<P: AsRef<Path>>(
        self,
        path: Option<P>,
    ) -> Result<Self, std::io::Error> {
        Ok(Self {
            log_file: path.map(LogFile::new).transpose()?,
            ..self
        })
    }
    /// Leaves the console out of the sink.
    pub fn no_stdout(self) -> Self {
        Self {
            no_stdout: true,
            ..self
        }
    }
    /// Console stream on (`true`, the default) or off.
    pub fn with_stdout(self, enabled: bool) -> Self {
        Self {
            no_stdout: !enabled,
            ..self
        }
    }
    /// Adds another stream.
    pub fn with_writer<W: LogWriter + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }
    /// Replaces the line formatter.
    pub fn with_formatter<F>(self, formatter: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
            ..self
        }
    }
    /// Sets the minimum severity.
    pub fn with_level(self, level: Severity) -> Self {
        Self { level, ..self }
    }
    /// Sets the tag
    pub fn with_tag(self, tag: &str) -> Self {
        Self {
            tag: Some(tag.into()),
            ..self
        }
    }
    /// Maybe sets the tag
    pub fn maybe_with_tag(self, tag: Option<&str>) -> Self {
        Self {
            tag: tag.map(String::from),
            ..self
        }
    }

    pub fn build(self) -> Logger {
        let Self {
            log_file,
            no_stdout,
            writers,
            formatter,
            level,
            tag,
        } = self;
        let mut sink = Sink::new(formatter);
        if !no_stdout {
            sink.add_stream(Box::new(LogStdout));
        }
        if let Some(log_file) = log_file {
            sink.add_stream(Box::new(log_file));
        }
        for writer in writers {
            sink.add_stream(writer);
        }
        Logger {
            engine: Arc::new(Engine { level, sink }),
            tag: tag.as_deref().unwrap_or(DEFAULT_TAG).into(),
        }
    }

    /// Initialize the logger globally, replacing any previous global logger.
    /// Returns a guard that will flush and uninstall the logger when dropped.
    #[must_use = "LoggerGuard must be kept alive to keep the global logger. Do \"let _guard = logger_config().init_global();\""]
    pub fn init_global(self) -> LoggerGuard {
        let logger = self.build();
        *GLOBAL_LOGGER.write().unwrap_or_else(PoisonError::into_inner) = Some(logger.clone());
        LoggerGuard { logger }
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}
