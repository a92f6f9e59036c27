//! Appender implementations

pub mod debug_output;
pub mod rotating_file;

pub use debug_output::DebugOutputAppender;
pub use rotating_file::{RotatingFileAppender, RotationPolicy};

pub use crate::core::Appender;
