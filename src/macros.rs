//! Logging and assertion macros.
//!
//! Logging macros take the logger first and format lazily: arguments are
//! rendered only when the record passes the threshold. Assertion macros take
//! a [`Diagnostics`](crate::Diagnostics) first and declare one static
//! [`AssertSite`](crate::AssertSite) per call site. Except for
//! [`gfx_release_assert!`], all of them expand to nothing observable in
//! release builds.
//!
//! # Examples
//!
//! ```
//! use gfx_diagnostics::prelude::*;
//! use gfx_diagnostics::{error_if, info};
//!
//! let logger = Logger::builder().min_level(LogLevel::Info).build();
//!
//! let pitch = 256;
//! info!(logger, "surface pitch {}", pitch);
//! error_if!(logger, pitch % 64 != 0, "pitch {} is not aligned", pitch);
//! ```

/// Emit a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use gfx_diagnostics::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Trace).build();
/// use gfx_diagnostics::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        if $crate::BuildFlavor::CURRENT.logging_enabled() {
            $logger.emit($level, format_args!($($arg)+))
        }
    };
}

/// # Examples
///
/// ```
/// # use gfx_diagnostics::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Trace).build();
/// use gfx_diagnostics::trace;
/// trace!(logger, "Entering function: compute_pitch()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Emit at an explicit level when `$cond` holds; the condition is not
/// evaluated in release builds.
#[macro_export]
macro_rules! log_if {
    ($logger:expr, $level:expr, $cond:expr, $($arg:tt)+) => {
        if $crate::BuildFlavor::CURRENT.logging_enabled() {
            $logger.emit_if($cond, $level, format_args!($($arg)+))
        }
    };
}

#[macro_export]
macro_rules! trace_if {
    ($logger:expr, $cond:expr, $($arg:tt)+) => {
        $crate::log_if!($logger, $crate::LogLevel::Trace, $cond, $($arg)+)
    };
}

#[macro_export]
macro_rules! info_if {
    ($logger:expr, $cond:expr, $($arg:tt)+) => {
        $crate::log_if!($logger, $crate::LogLevel::Info, $cond, $($arg)+)
    };
}

#[macro_export]
macro_rules! error_if {
    ($logger:expr, $cond:expr, $($arg:tt)+) => {
        $crate::log_if!($logger, $crate::LogLevel::Error, $cond, $($arg)+)
    };
}

/// Component debug message, filtered by the control block.
///
/// # Examples
///
/// ```
/// use gfx_diagnostics::{gfx_debug_message, Component, DebugLevel, Diagnostics};
///
/// let diag = Diagnostics::new();
/// gfx_debug_message!(diag, Component::Kmd, DebugLevel::NORMAL, "fence {} signaled", 7);
/// ```
#[macro_export]
macro_rules! gfx_debug_message {
    ($diag:expr, $component:expr, $level:expr, $($arg:tt)+) => {
        if $crate::BuildFlavor::CURRENT.logging_enabled() {
            $diag.debug_message($component, $level, format_args!($($arg)+))
        }
    };
}

/// Checked assertion for a component.
///
/// # Examples
///
/// ```
/// use gfx_diagnostics::{gfx_assert, Component, ComponentControlBlock, Diagnostics};
///
/// // Assertions are enabled only for GMM; a failing KMD assertion stays silent
/// let diag = Diagnostics::new()
///     .with_control_block(ComponentControlBlock::new().with_asserts(Component::Gmm))
///     .unwrap();
/// gfx_assert!(diag, Component::Kmd, 1 + 1 == 3);
/// ```
#[macro_export]
macro_rules! gfx_assert {
    ($diag:expr, $component:expr, $expr:expr) => {
        if $crate::BuildFlavor::CURRENT.asserts_compiled() {
            static SITE: $crate::AssertSite =
                $crate::AssertSite::new(file!(), line!(), stringify!($expr));
            let _ = $diag.check_assert(&SITE, $component, $expr);
        }
    };
}

/// Checked assertion that returns `$ret` from the enclosing function when
/// the expression is false, whether or not it trapped.
///
/// # Examples
///
/// ```
/// use gfx_diagnostics::{gfx_assert_ptr, AssertHooks, AssertReport, Component, Diagnostics};
///
/// fn quiet(_: &AssertReport) {}
///
/// fn first_byte(diag: &Diagnostics, data: Option<&[u8]>) -> Option<u8> {
///     gfx_assert_ptr!(diag, Component::Gmm, data.is_some(), None);
///     data?.first().copied()
/// }
///
/// let diag = Diagnostics::new().with_hooks(AssertHooks { report: quiet, trap: quiet, trace: quiet });
/// assert_eq!(first_byte(&diag, None), None);
/// assert_eq!(first_byte(&diag, Some(&[9])), Some(9));
/// ```
#[macro_export]
macro_rules! gfx_assert_ptr {
    ($diag:expr, $component:expr, $expr:expr, $ret:expr) => {
        if $crate::BuildFlavor::CURRENT.asserts_compiled() {
            static SITE: $crate::AssertSite =
                $crate::AssertSite::new(file!(), line!(), stringify!($expr));
            let passed: bool = $expr;
            let _ = $diag.check_assert(&SITE, $component, passed);
            if !passed {
                return $ret;
            }
        }
    };
}

/// Assertion kept in every build flavor; traps only, never reports.
#[macro_export]
macro_rules! gfx_release_assert {
    ($diag:expr, $component:expr, $expr:expr) => {{
        static SITE: $crate::AssertSite =
            $crate::AssertSite::new(file!(), line!(), stringify!($expr));
        let _ = $diag.release_assert(&SITE, $component, $expr);
    }};
}
