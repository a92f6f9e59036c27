//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// A sink that rendered records are written to.
///
/// Callers serialize access; an appender never sees two records at once.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
