//! OS debug channel appender
//!
//! On hosted targets the debug channel is the process's stderr. A writer can
//! be injected instead, which is how the channel is captured in tests.

use crate::core::{Appender, LogEntry, Result, TimestampFormat};
use std::io::{self, Write};

pub struct DebugOutputAppender {
    writer: Option<Box<dyn Write + Send + Sync>>,
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl DebugOutputAppender {
    /// Write to stderr
    pub fn new() -> Self {
        Self {
            writer: None,
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::default(),
        }
    }

    /// Write to `writer` instead of stderr; colors are off
    pub fn with_writer<W: Write + Send + Sync + 'static>(writer: W) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            use_colors: false,
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors && cfg!(feature = "console");
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn format_line(&self, entry: &LogEntry) -> String {
        #[cfg(feature = "console")]
        if self.use_colors {
            use colored::Colorize;
            return format!(
                "[{}] [{}] [{}] {}{}\n",
                self.timestamp_format.format(&entry.timestamp),
                format!("{:5}", entry.level.to_str()).color(entry.level.color_code()),
                entry.thread_label(),
                entry.component.map_or("", |c| c.prefix()),
                entry.message
            );
        }
        entry.format_line(&self.timestamp_format)
    }
}

impl Default for DebugOutputAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for DebugOutputAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = self.format_line(entry);
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(line.as_bytes())?,
            // One write_all per record keeps lines from interleaving
            None => io::stderr().lock().write_all(line.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush()?,
            None => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "debug_output"
    }
}
