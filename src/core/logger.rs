//! Lazily initialized, leveled logger
//!
//! A [`Logger`] opens its sink and loads its threshold on first use. The
//! first caller runs initialization; concurrent first callers block until it
//! finishes and then observe the same outcome. A logger whose setup failed,
//! or whose configuration turns logging off, stays disabled for the life of
//! the process.

use super::{
    appender::Appender,
    config::LoggerConfig,
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::{should_emit, LogLevel},
    metrics::LoggerMetrics,
    render::{render_bounded, FORMAT_ERROR_NOTICE, MAX_LOG_MESSAGE_LEN, OVERFLOW_NOTICE},
};
use crate::appenders::DebugOutputAppender;
use parking_lot::{Mutex, RwLock};
use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

/// Produces the threshold and sink on first use
pub type SinkFactory = Box<dyn Fn() -> Result<(LogLevel, Box<dyn Appender>)> + Send + Sync>;

type SinkSlot = Option<Mutex<Box<dyn Appender>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoggerState {
    Uninitialized = 0,
    Initializing = 1,
    Ready = 2,
    Disabled = 3,
}

impl LoggerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Uninitialized,
            1 => LoggerState::Initializing,
            2 => LoggerState::Ready,
            _ => LoggerState::Disabled,
        }
    }
}

pub struct Logger {
    state: AtomicU8,
    factory: Option<SinkFactory>,
    sink: OnceLock<SinkSlot>,
    threshold: RwLock<LogLevel>,
    metrics: LoggerMetrics,
}

impl Logger {
    /// A logger that runs `factory` on first use
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<(LogLevel, Box<dyn Appender>)> + Send + Sync + 'static,
    {
        Self {
            state: AtomicU8::new(LoggerState::Uninitialized as u8),
            factory: Some(Box::new(factory)),
            sink: OnceLock::new(),
            threshold: RwLock::new(LogLevel::default()),
            metrics: LoggerMetrics::new(),
        }
    }

    /// A logger that loads its configuration on first use
    ///
    /// # Example
    ///
    /// ```
    /// use gfx_diagnostics::{Logger, LoggerConfig, LoggerState, LogLevel};
    ///
    /// let logger = Logger::lazy(|| LoggerConfig::new().with_level(LogLevel::Info));
    /// assert_eq!(logger.state(), LoggerState::Uninitialized);
    ///
    /// logger.info("first use opens the sink");
    /// assert_eq!(logger.state(), LoggerState::Ready);
    /// ```
    pub fn lazy<F>(load: F) -> Self
    where
        F: Fn() -> LoggerConfig + Send + Sync + 'static,
    {
        Self::with_factory(move || {
            let config = load();
            if config.is_logging_disabled() {
                return Err(LoggerError::LoggerDisabled);
            }
            Ok((config.level, config.open_sink()?))
        })
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self::lazy(move || config.clone())
    }

    /// A logger that is ready immediately
    pub fn with_appender(level: LogLevel, appender: Box<dyn Appender>) -> Self {
        let (state, sink) = if level == LogLevel::Off {
            (LoggerState::Disabled, None)
        } else {
            (LoggerState::Ready, Some(Mutex::new(appender)))
        };
        Self {
            state: AtomicU8::new(state as u8),
            factory: None,
            sink: OnceLock::from(sink),
            threshold: RwLock::new(level),
            metrics: LoggerMetrics::new(),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn initialize(&self) -> SinkSlot {
        self.state.store(LoggerState::Initializing as u8, Ordering::Release);

        let outcome = match self.factory.as_ref() {
            Some(factory) => catch_unwind(AssertUnwindSafe(|| factory()))
                .unwrap_or_else(|_| Err(LoggerError::other("sink factory panicked"))),
            None => Err(LoggerError::LoggerDisabled),
        };

        match outcome {
            Ok((level, appender)) if level != LogLevel::Off => {
                *self.threshold.write() = level;
                self.state.store(LoggerState::Ready as u8, Ordering::Release);
                Some(Mutex::new(appender))
            }
            Ok(_) | Err(LoggerError::LoggerDisabled) => {
                *self.threshold.write() = LogLevel::Off;
                self.state.store(LoggerState::Disabled as u8, Ordering::Release);
                None
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] Logger disabled: {}", e);
                *self.threshold.write() = LogLevel::Off;
                self.state.store(LoggerState::Disabled as u8, Ordering::Release);
                None
            }
        }
    }

    #[inline]
    fn sink(&self) -> Option<&Mutex<Box<dyn Appender>>> {
        self.sink.get_or_init(|| self.initialize()).as_ref()
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current threshold, initializing the logger if needed
    pub fn level(&self) -> LogLevel {
        self.sink();
        *self.threshold.read()
    }

    /// Has no effect on a disabled logger
    pub fn set_level(&self, level: LogLevel) {
        if self.sink().is_some() {
            *self.threshold.write() = level;
        }
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.sink().is_some() && should_emit(level, *self.threshold.read())
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Render and write one record
    pub fn emit(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let Some(sink) = self.sink() else {
            return;
        };
        if !should_emit(level, *self.threshold.read()) {
            self.metrics.record_filtered();
            return;
        }

        match render_bounded(args, MAX_LOG_MESSAGE_LEN) {
            Ok(message) => {
                if write_guarded(sink, &LogEntry::new(level, message), &self.metrics) {
                    self.metrics.record_emitted();
                }
            }
            Err(e) => {
                self.metrics.record_format_failure();
                eprintln!("[LOGGER ERROR] Dropped {} message: {}", level, e);
                let notice = match e {
                    LoggerError::FormatOverflow { .. } => OVERFLOW_NOTICE,
                    _ => FORMAT_ERROR_NOTICE,
                };
                write_guarded(sink, &LogEntry::new(level, notice), &self.metrics);
            }
        }
    }

    #[inline]
    pub fn emit_if(&self, guard: bool, level: LogLevel, args: fmt::Arguments<'_>) {
        if guard {
            self.emit(level, args);
        }
    }

    /// Emit an already-built message at Trace.
    ///
    /// Unlike the [`trace!`](crate::trace) macro family, these methods stay
    /// live in every build flavor, and the caller pays for building the
    /// string even when the record is filtered. Instrumentation that should
    /// compile out belongs in the macros.
    #[inline]
    pub fn trace(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Trace, format_args!("{}", message.as_ref()));
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Info, format_args!("{}", message.as_ref()));
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Error, format_args!("{}", message.as_ref()));
    }

    /// Flush the sink if the logger is ready
    pub fn flush(&self) -> Result<()> {
        match self.sink.get().and_then(Option::as_ref) {
            Some(sink) => sink.lock().flush(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("state", &self.state())
            .field("threshold", &*self.threshold.read())
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// # Example
/// ```
/// use gfx_diagnostics::appenders::DebugOutputAppender;
/// use gfx_diagnostics::{Logger, LogLevel};
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Trace)
///     .appender(DebugOutputAppender::new())
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    appender: Option<Box<dyn Appender>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::default(),
            appender: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Replace the default debug-output sink
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appender = Some(Box::new(appender));
        self
    }

    pub fn build(self) -> Logger {
        let appender = self
            .appender
            .unwrap_or_else(|| Box::new(DebugOutputAppender::new()));
        Logger::with_appender(self.min_level, appender)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static IN_SINK_WRITE: Cell<bool> = const { Cell::new(false) };
}

/// Whether this thread is inside an appender call made by a logger.
///
/// Sink locks are not reentrant; code reached from an appender must not log
/// through the logger that owns it.
pub fn in_sink_write() -> bool {
    IN_SINK_WRITE.with(Cell::get)
}

/// Write one record under the sink lock, containing sink errors and panics
pub(crate) fn write_guarded(
    sink: &Mutex<Box<dyn Appender>>,
    entry: &LogEntry,
    metrics: &LoggerMetrics,
) -> bool {
    let mut appender = sink.lock();
    let outer = IN_SINK_WRITE.with(|flag| flag.replace(true));
    let result = catch_unwind(AssertUnwindSafe(|| {
        appender.append(entry)?;
        appender.flush()
    }));
    IN_SINK_WRITE.with(|flag| flag.set(outer));

    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", appender.name(), e);
            metrics.record_dropped();
            false
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked: {}. Record dropped.",
                appender.name(),
                panic_msg
            );
            metrics.record_dropped();
            false
        }
    }
}

/// The logger for this module instance, configured from the environment on
/// first use
pub fn logger() -> &'static Logger {
    static LOGGER: OnceLock<Logger> = OnceLock::new();
    LOGGER.get_or_init(|| Logger::lazy(LoggerConfig::from_env))
}
