//! Log level definitions and the emission policy for the logging path

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered severity for the logging path.
///
/// The ordinal values match the ones stored by configuration (`LogLevel=0..3`).
/// `Off` is the lowest ordinal but, as a threshold, disables everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Off = 0,
    Trace = 1,
    Info = 2,
    #[default]
    Error = 3,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [LogLevel::Off, LogLevel::Trace, LogLevel::Info, LogLevel::Error];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "OFF",
            LogLevel::Trace => "TRACE",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }

    /// Convert a stored ordinal back into a level
    pub fn from_ordinal(value: u32) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Off),
            1 => Some(LogLevel::Trace),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Whether a message at `self` passes `threshold`.
    #[inline]
    pub fn passes(self, threshold: LogLevel) -> bool {
        should_emit(self, threshold)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Off => White,
            LogLevel::Trace => BrightBlack,
            LogLevel::Info => Green,
            LogLevel::Error => Red,
        }
    }
}

/// Decide whether a message at `requested` is emitted under `threshold`.
///
/// Nothing passes an `Off` threshold, and an `Off` message is never emitted.
#[inline]
pub fn should_emit(requested: LogLevel, threshold: LogLevel) -> bool {
    threshold != LogLevel::Off && requested != LogLevel::Off && requested >= threshold
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts level names in any case, or the stored ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u32>() {
            return LogLevel::from_ordinal(ordinal)
                .ok_or_else(|| format!("Invalid log level ordinal: {}", ordinal));
        }
        match trimmed.to_uppercase().as_str() {
            "OFF" => Ok(LogLevel::Off),
            "TRACE" => Ok(LogLevel::Trace),
            "INFO" => Ok(LogLevel::Info),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_filters_lower_levels() {
        assert!(!should_emit(LogLevel::Trace, LogLevel::Info));
        assert!(should_emit(LogLevel::Info, LogLevel::Info));
        assert!(should_emit(LogLevel::Error, LogLevel::Info));
        assert!(should_emit(LogLevel::Trace, LogLevel::Trace));
    }

    #[test]
    fn test_off_threshold_disables_everything() {
        for level in LogLevel::ALL {
            assert!(!should_emit(level, LogLevel::Off));
        }
    }

    #[test]
    fn test_off_message_never_emitted() {
        for threshold in LogLevel::ALL {
            assert!(!should_emit(LogLevel::Off, threshold));
        }
    }

    #[test]
    fn test_parse_names_and_ordinals() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("1".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert_eq!(" 0 ".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert!("4".parse::<LogLevel>().is_err());
        assert!("warn".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_default_is_error() {
        assert_eq!(LogLevel::default(), LogLevel::Error);
    }
}
