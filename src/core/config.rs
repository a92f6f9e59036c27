//! Logger configuration
//!
//! The host decides the threshold and the destination. Values come from a
//! JSON document, from `GFX_LOG_*` environment variables, or from code; the
//! logger only consumes the resulting [`LoggerConfig`].

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    log_level::LogLevel,
    timestamp::TimestampFormat,
};
use crate::appenders::{DebugOutputAppender, RotatingFileAppender, RotationPolicy};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Base name of the log file when none is configured
pub const DEFAULT_LOG_FILE: &str = "./gmm_log";

/// Size at which the current log file is rotated (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Rotated generations kept next to the current file
pub const DEFAULT_MAX_BACKUPS: usize = 3;

/// Process name used when the executable name cannot be determined
pub const UNKNOWN_PROCESS: &str = "Unknown_Proc";

pub const ENV_LEVEL: &str = "GFX_LOG_LEVEL";
pub const ENV_TO_FILE: &str = "GFX_LOG_TO_FILE";
pub const ENV_FILE: &str = "GFX_LOG_FILE";
pub const ENV_FILE_SIZE: &str = "GFX_LOG_FILE_SIZE";
pub const ENV_ROTATE_COUNT: &str = "GFX_LOG_ROTATE_COUNT";
pub const ENV_PER_PROCESS: &str = "GFX_LOG_PER_PROCESS";
/// Path of a JSON configuration applied before the other variables
pub const ENV_CONFIG: &str = "GFX_LOG_CONFIG";

/// Where records go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SinkKind {
    /// The OS debug channel (stderr on hosted targets)
    #[default]
    DebugOutput,
    /// A size-rotated log file
    File,
}

/// # Examples
///
/// ```
/// use gfx_diagnostics::{LoggerConfig, LogLevel, SinkKind};
///
/// let config = LoggerConfig::from_vars([
///     ("GFX_LOG_LEVEL", "info"),
///     ("GFX_LOG_TO_FILE", "1"),
///     ("GFX_LOG_ROTATE_COUNT", "2"),
/// ]);
///
/// assert_eq!(config.level, LogLevel::Info);
/// assert_eq!(config.sink, SinkKind::File);
/// assert_eq!(config.max_backups, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub sink: SinkKind,
    pub file_path: PathBuf,
    pub max_file_size: u64,
    pub max_backups: usize,
    /// Suffix the file name with the executable name
    pub append_process_name: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            sink: SinkKind::default(),
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
            append_process_name: false,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for a file sink at `path`
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: SinkKind::File,
            file_path: path.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_sink(mut self, sink: SinkKind) -> Self {
        self.sink = sink;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_process_name(mut self, enabled: bool) -> Self {
        self.append_process_name = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a configuration from `(name, value)` pairs.
    ///
    /// Unknown names are ignored. A value that does not parse is reported on
    /// stderr and the default is kept.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_owned(), value.as_ref().trim().to_owned()))
            .collect();

        let mut config = vars
            .iter()
            .find(|(key, _)| key == ENV_CONFIG)
            .and_then(|(_, path)| match Self::from_json_file(path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!("[LOGGER WARNING] Ignoring {}: {}", ENV_CONFIG, e);
                    None
                }
            })
            .unwrap_or_default();

        for (key, value) in &vars {
            let value = value.as_str();
            match key.as_str() {
                ENV_LEVEL => match value.parse::<LogLevel>() {
                    Ok(level) => config.level = level,
                    Err(e) => warn_invalid(ENV_LEVEL, &e),
                },
                ENV_TO_FILE => match parse_flag(value) {
                    Some(true) => config.sink = SinkKind::File,
                    Some(false) => config.sink = SinkKind::DebugOutput,
                    None => warn_invalid(ENV_TO_FILE, value),
                },
                ENV_FILE if !value.is_empty() => config.file_path = PathBuf::from(value),
                ENV_FILE_SIZE => match value.parse::<u64>() {
                    Ok(size) if size > 0 => config.max_file_size = size,
                    _ => warn_invalid(ENV_FILE_SIZE, value),
                },
                ENV_ROTATE_COUNT => match value.parse::<usize>() {
                    Ok(count) => config.max_backups = count,
                    Err(_) => warn_invalid(ENV_ROTATE_COUNT, value),
                },
                ENV_PER_PROCESS => match parse_flag(value) {
                    Some(enabled) => config.append_process_name = enabled,
                    None => warn_invalid(ENV_PER_PROCESS, value),
                },
                _ => {}
            }
        }

        config
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sink == SinkKind::File {
            if self.file_path.as_os_str().is_empty() {
                return Err(LoggerError::config("LoggerConfig", "file_path is empty"));
            }
            if self.max_file_size == 0 {
                return Err(LoggerError::config("LoggerConfig", "max_file_size must be positive"));
            }
        }
        Ok(())
    }

    /// A threshold of `Off` turns the logger off entirely
    pub fn is_logging_disabled(&self) -> bool {
        self.level == LogLevel::Off
    }

    /// The file path after the optional process-name suffix
    pub fn resolved_file_path(&self) -> PathBuf {
        if !self.append_process_name {
            return self.file_path.clone();
        }
        let mut name: OsString = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("gmm_log"));
        name.push("_");
        name.push(process_name());
        self.file_path.with_file_name(name)
    }

    /// Open the configured sink
    pub fn open_sink(&self) -> Result<Box<dyn Appender>> {
        self.validate()?;
        match self.sink {
            SinkKind::DebugOutput => Ok(Box::new(
                DebugOutputAppender::new().with_timestamp_format(self.timestamp_format.clone()),
            )),
            SinkKind::File => {
                let path = self.resolved_file_path();
                let policy = RotationPolicy::new()
                    .with_max_size(self.max_file_size)
                    .with_max_backups(self.max_backups);
                let appender = RotatingFileAppender::with_policy(&path, policy)
                    .map_err(|e| LoggerError::sink_unavailable(path.display().to_string(), e.to_string()))?
                    .with_timestamp_format(self.timestamp_format.clone());
                Ok(Box::new(appender))
            }
        }
    }
}

/// Executable stem, or [`UNKNOWN_PROCESS`]
pub fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_PROCESS.to_string())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn warn_invalid(name: &str, value: &str) {
    eprintln!("[LOGGER WARNING] Ignoring invalid {}: {}", name, value);
}
