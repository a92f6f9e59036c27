//! Error types for the diagnostics subsystem
//!
//! None of these errors reach instrumented code through the emission or
//! assertion APIs. They surface only from constructors that acquire
//! resources (sinks, configuration files, control blocks) and are otherwise
//! reported on stderr by the logger itself.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Sink could not be opened
    #[error("Sink '{sink}' unavailable: {message}")]
    SinkUnavailable { sink: String, message: String },

    /// Logger is disabled and will not emit
    #[error("Logger is disabled")]
    LoggerDisabled,

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Rendered message did not fit the bounded buffer
    #[error("Rendered message exceeds {limit} bytes")]
    FormatOverflow { limit: usize },

    /// A `Display` implementation failed while rendering
    #[error("Formatting failed while rendering message")]
    FormatError,

    /// Control block ABI tag mismatch
    #[error("Control block {field} mismatch: expected {expected}, found {found}")]
    ControlBlockMismatch {
        field: &'static str,
        expected: u32,
        found: u32,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink unavailable error
    pub fn sink_unavailable(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkUnavailable {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a control block mismatch error
    pub fn control_block_mismatch(field: &'static str, expected: u32, found: u32) -> Self {
        LoggerError::ControlBlockMismatch {
            field,
            expected,
            found,
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "Invalid level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_appender("/var/log/gmm_log", "Permission denied");
        assert!(matches!(err, LoggerError::FileAppenderError { .. }));

        let err = LoggerError::sink_unavailable("file", "read-only filesystem");
        assert!(matches!(err, LoggerError::SinkUnavailable { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::FormatOverflow { limit: 512 };
        assert_eq!(err.to_string(), "Rendered message exceeds 512 bytes");

        let err = LoggerError::file_rotation("/var/log/gmm_log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/gmm_log': Disk full"
        );

        let err = LoggerError::control_block_mismatch("version", 2, 1);
        assert_eq!(
            err.to_string(),
            "Control block version mismatch: expected 2, found 1"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot create file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot create file"));
    }
}
