//! Bounded message rendering
//!
//! Messages are rendered into a per-thread buffer that never grows past the
//! configured limit. A message that does not fit is rejected instead of
//! truncated so a partial record never reaches a sink.

use super::error::{LoggerError, Result};
use std::cell::RefCell;
use std::fmt::{self, Write};

/// Limit for messages emitted through the [`Logger`](super::Logger)
pub const MAX_LOG_MESSAGE_LEN: usize = 1024;

/// Limit for component debug messages
pub const MAX_DEBUG_MESSAGE_LEN: usize = 512;

/// Written in place of a message that overflowed its buffer
pub(crate) const OVERFLOW_NOTICE: &str = "message dropped: rendered text exceeds the message buffer";

/// Written in place of a message whose arguments failed to format
pub(crate) const FORMAT_ERROR_NOTICE: &str = "message dropped: argument formatting failed";

thread_local! {
    static RENDER_BUFFER: RefCell<String> = RefCell::new(String::with_capacity(MAX_LOG_MESSAGE_LEN));
}

struct BoundedWriter<'a> {
    buf: &'a mut String,
    limit: usize,
    overflowed: bool,
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.buf.len() + s.len() > self.limit {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        self.buf.push_str(s);
        Ok(())
    }
}

fn render_into(buf: &mut String, args: fmt::Arguments<'_>, limit: usize) -> Result<String> {
    let mut writer = BoundedWriter {
        buf,
        limit,
        overflowed: false,
    };
    let outcome = fmt::write(&mut writer, args);
    let overflowed = writer.overflowed;

    match outcome {
        Ok(()) => Ok(buf.clone()),
        Err(_) if overflowed => Err(LoggerError::FormatOverflow { limit }),
        Err(_) => Err(LoggerError::FormatError),
    }
}

/// Render `args` into at most `limit` bytes.
///
/// # Errors
///
/// `FormatOverflow` when the text does not fit, `FormatError` when an
/// argument's formatting implementation fails.
pub fn render_bounded(args: fmt::Arguments<'_>, limit: usize) -> Result<String> {
    if let Some(literal) = args.as_str() {
        if literal.len() > limit {
            return Err(LoggerError::FormatOverflow { limit });
        }
        return Ok(literal.to_owned());
    }

    RENDER_BUFFER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut buf) => {
            buf.clear();
            render_into(&mut buf, args, limit)
        }
        // An argument's Display impl is itself logging on this thread
        Err(_) => render_into(&mut String::new(), args, limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl fmt::Display for Failing {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn test_render_within_limit() {
        let text = render_bounded(format_args!("{} + {} = {}", 1, 1, 2), 64).unwrap();
        assert_eq!(text, "1 + 1 = 2");
    }

    #[test]
    fn test_render_exact_limit() {
        let value = "x".repeat(8);
        assert_eq!(render_bounded(format_args!("{}", value), 8).unwrap(), value);
    }

    #[test]
    fn test_render_overflow() {
        let value = "x".repeat(9);
        let err = render_bounded(format_args!("{}", value), 8).unwrap_err();
        assert!(matches!(err, LoggerError::FormatOverflow { limit: 8 }));
    }

    #[test]
    fn test_literal_overflow() {
        let err = render_bounded(format_args!("a literal longer than ten"), 10).unwrap_err();
        assert!(matches!(err, LoggerError::FormatOverflow { limit: 10 }));
    }

    #[test]
    fn test_failing_display_is_format_error() {
        let err = render_bounded(format_args!("value: {}", Failing), 64).unwrap_err();
        assert!(matches!(err, LoggerError::FormatError));
    }

    #[test]
    fn test_buffer_reused_between_calls() {
        let first = render_bounded(format_args!("{}", "long message body"), 64).unwrap();
        let second = render_bounded(format_args!("{}", "short"), 64).unwrap();
        assert_eq!(first, "long message body");
        assert_eq!(second, "short");
    }
}
