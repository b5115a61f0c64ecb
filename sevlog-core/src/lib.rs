//! # sevlog-core
//! Core utilities for sevlog - severities, records, sinks and log writers.

mod config;
mod log_writer;
mod severity;
mod utils;

pub use config::{SEVLOG_CONFIG, SevlogConfig};
pub use log_writer::{LogFile, LogMemory, LogStdout, LogStream, LogWriter};
pub use severity::{ParseSeverityError, Severity};
pub use utils::{Formatter, Record, Sink, TIMESTAMP_FORMAT, colored_format, format_record};
