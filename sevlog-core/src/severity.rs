use std::{fmt, str::FromStr};

use log::Level;

/// Severity of a log record.
///
/// The numeric order is `Info < Debug < Warning < Error < Critical`: debug
/// ranks *above* info. Filtering compares these discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Info = 0,
    Debug = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl Severity {
    /// Every severity, in numeric order.
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Debug,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Fixed-width (10 chars) label used in formatted lines.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "   Info   ",
            Severity::Debug => "   Debug  ",
            Severity::Warning => "  Warning ",
            Severity::Error => "   Error  ",
            Severity::Critical => " Critical ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Debug => "Debug",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Severity::Error,
            Level::Warn => Severity::Warning,
            Level::Info => Severity::Info,
            Level::Debug | Level::Trace => Severity::Debug,
        }
    }
}

/// Error returned when a string or number does not name a [`Severity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSeverityError(String);

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity `{}`", self.0)
    }
}

impl std::error::Error for ParseSeverityError {}

impl TryFrom<u8> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: u8) -> Result<Self, ParseSeverityError> {
        Severity::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ParseSeverityError(value.to_string()))
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u8>() {
            return Severity::try_from(n);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            "critical" | "crit" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_order_is_not_alphabetic() {
        assert_eq!(Severity::Info.as_u8(), 0);
        assert_eq!(Severity::Debug.as_u8(), 1);
        assert_eq!(Severity::Warning.as_u8(), 2);
        assert_eq!(Severity::Error.as_u8(), 3);
        assert_eq!(Severity::Critical.as_u8(), 4);
        assert!(Severity::Info < Severity::Debug);
        assert!(Severity::Debug < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
        let mut sorted = Severity::ALL;
        sorted.sort();
        assert_eq!(sorted, Severity::ALL);
    }

    #[test]
    fn test_labels_are_ten_chars() {
        for severity in Severity::ALL {
            assert_eq!(severity.label().len(), 10);
            assert_eq!(severity.label().trim(), severity.name());
            assert_eq!(severity.to_string(), severity.label());
        }
        assert_eq!(Severity::Warning.label(), "  Warning ");
        assert_eq!(Severity::Debug.label(), "   Debug  ");
    }

    #[test]
    fn test_parse() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!(" debug ".parse::<Severity>(), Ok(Severity::Debug));
        assert_eq!("3".parse::<Severity>(), Ok(Severity::Error));
        assert!("5".parse::<Severity>().is_err());
        assert!("verbose".parse::<Severity>().is_err());
        assert_eq!(Severity::try_from(1), Ok(Severity::Debug));
    }

    #[test]
    fn test_try_from_u8() {
        for severity in Severity::ALL {
            assert_eq!(Severity::try_from(severity.as_u8()), Ok(severity));
        }
        let err = Severity::try_from(5).unwrap_err();
        assert_eq!(err.to_string(), "unknown severity `5`");
    }

    #[test]
    fn test_from_log_level() {
        assert_eq!(Severity::from(Level::Error), Severity::Error);
        assert_eq!(Severity::from(Level::Warn), Severity::Warning);
        assert_eq!(Severity::from(Level::Info), Severity::Info);
        assert_eq!(Severity::from(Level::Debug), Severity::Debug);
        assert_eq!(Severity::from(Level::Trace), Severity::Debug);
    }
}
