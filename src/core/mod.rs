//! Core logger and diagnostic types

pub mod appender;
pub mod assert_gate;
pub mod config;
pub mod debug_control;
pub mod diagnostics;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod render;
pub mod timestamp;

pub use appender::Appender;
pub use assert_gate::{
    disable_assert_site, enable_assert_site, evaluate, registered_assert_sites, AssertAction,
    AssertHook, AssertHooks, AssertReport, AssertSite, BuildFlavor,
};
pub use config::{process_name, LoggerConfig, SinkKind};
pub use debug_control::{
    Component, ComponentControlBlock, ControlSlot, DebugLevel, CONTROL_BLOCK_SIZE,
    CONTROL_BLOCK_VERSION, MAX_COMPONENT_COUNT,
};
pub use diagnostics::{diagnostics, Diagnostics};
pub use error::{LoggerError, Result};
pub use log_entry::LogEntry;
pub use log_level::{should_emit, LogLevel};
pub use logger::{in_sink_write, logger, Logger, LoggerBuilder, LoggerState, SinkFactory};
pub use metrics::LoggerMetrics;
pub use render::{render_bounded, MAX_DEBUG_MESSAGE_LEN, MAX_LOG_MESSAGE_LEN};
pub use timestamp::TimestampFormat;
