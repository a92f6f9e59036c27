//! # gfx_diagnostics
//!
//! Diagnostic subsystem for driver-support libraries: a leveled logger with
//! debug-output and rotating-file sinks, plus component-scoped debug messages
//! and assertions gated by a shared control block.
//!
//! ## Features
//!
//! - **Leveled logging**: `Off`, `Trace`, `Info`, `Error` with a per-logger threshold
//! - **Lazy singleton**: the logger configures itself exactly once on first use
//! - **Rotating files**: `<base>`, `<base>.1` .. `<base>.N`, rotated inline by size
//! - **Component control**: per-component enable bits, escalating debug levels
//!   and assertion masks, swapped atomically at runtime
//! - **Build flavors**: release builds compile logging and assertions out
//!
//! ## Example
//!
//! ```
//! use gfx_diagnostics::prelude::*;
//! use gfx_diagnostics::{error, gfx_debug_message};
//!
//! let logger = Logger::builder().min_level(LogLevel::Info).build();
//! error!(logger, "allocation of {} bytes failed", 4096);
//!
//! let diag = Diagnostics::new();
//! gfx_debug_message!(diag, Component::Gmm, DebugLevel::CRITICAL, "tile mode {} unsupported", 3);
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{DebugOutputAppender, RotatingFileAppender, RotationPolicy};
    pub use crate::core::{
        diagnostics, logger, Appender, AssertAction, AssertHooks, BuildFlavor, Component,
        ComponentControlBlock, DebugLevel, Diagnostics, LogEntry, LogLevel, Logger,
        LoggerConfig, LoggerError, LoggerMetrics, LoggerState, Result, SinkKind,
        TimestampFormat,
    };
}

pub use appenders::{DebugOutputAppender, RotatingFileAppender, RotationPolicy};
pub use core::{
    diagnostics, disable_assert_site, enable_assert_site, evaluate, in_sink_write, logger,
    process_name,
    registered_assert_sites, render_bounded, should_emit, Appender, AssertAction, AssertHook,
    AssertHooks, AssertReport, AssertSite, BuildFlavor, Component, ComponentControlBlock,
    ControlSlot, DebugLevel, Diagnostics, LogEntry, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, LoggerState, Result, SinkFactory, SinkKind,
    TimestampFormat, CONTROL_BLOCK_SIZE, CONTROL_BLOCK_VERSION, MAX_COMPONENT_COUNT,
    MAX_DEBUG_MESSAGE_LEN, MAX_LOG_MESSAGE_LEN,
};
