//! Integration tests for gfx_diagnostics
//!
//! These tests verify:
//! - Threshold filtering through a real file sink
//! - Size-based rotation driven by the logger
//! - Disabled state when the sink cannot be opened
//! - Overflowing messages dropped with a notice
//! - Control block gating of debug messages and assertions
//! - Per-site assertion toggles
//! - JSON configuration loading

use gfx_diagnostics::appenders::{RotatingFileAppender, RotationPolicy};
use gfx_diagnostics::core::render::MAX_LOG_MESSAGE_LEN;
use gfx_diagnostics::{
    gfx_debug_message, Appender, AssertHooks, AssertReport, Component, ComponentControlBlock,
    DebugLevel, Diagnostics, LogEntry, LogLevel, Logger, LoggerConfig, LoggerError, LoggerState,
    SinkKind, TimestampFormat,
};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct CaptureAppender {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Appender for CaptureAppender {
    fn append(&mut self, entry: &LogEntry) -> gfx_diagnostics::Result<()> {
        let prefix = entry.component.map_or("", |c| c.prefix());
        self.lines.lock().push(format!("{}{}", prefix, entry.message));
        Ok(())
    }

    fn flush(&mut self) -> gfx_diagnostics::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "capture"
    }
}

fn file_logger(path: &Path, level: LogLevel) -> Logger {
    Logger::from_config(
        LoggerConfig::file(path)
            .with_level(level)
            .with_timestamp_format(TimestampFormat::UnixMillis),
    )
}

fn message_of(line: &str) -> &str {
    line.rsplit("] ").next().unwrap_or(line)
}

#[test]
fn test_threshold_info_scenario() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("gmm_log");

    let logger = file_logger(&log_file, LogLevel::Info);
    logger.trace("a");
    logger.info("b");
    logger.error("c");

    assert_eq!(logger.state(), LoggerState::Ready);
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let messages: Vec<&str> = content.lines().map(message_of).collect();
    assert_eq!(messages, vec!["b", "c"]);
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("gmm_log");

    let logger = file_logger(&log_file, LogLevel::Trace);
    logger.error("surface ok\n[0] [ERROR] [main] forged record");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1, "Log should be a single line");
    assert!(content.contains("\\n"));
}

#[test]
fn test_rotation_keeps_contiguous_tail() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("gmm_log");

    let logger = Logger::from_config(
        LoggerConfig::file(&log_file)
            .with_level(LogLevel::Trace)
            .with_max_file_size(400)
            .with_max_backups(2)
            .with_timestamp_format(TimestampFormat::UnixMillis),
    );

    for i in 0..60 {
        logger.info(format!("record {:04}", i));
    }

    let generations = [log_file.with_file_name("gmm_log.2"), log_file.with_file_name("gmm_log.1"), log_file.clone()];
    assert!(generations.iter().all(|p| p.exists()));
    assert!(!log_file.with_file_name("gmm_log.3").exists());

    let mut numbers = Vec::new();
    for path in &generations {
        let content = fs::read_to_string(path).expect("Failed to read generation");
        assert!(content.len() as u64 <= 400);
        for line in content.lines() {
            let number = message_of(line).trim_start_matches("record ").parse::<u32>().unwrap();
            numbers.push(number);
        }
    }

    // Oldest records were evicted; what is left is an unbroken tail
    assert_eq!(*numbers.last().unwrap(), 59);
    assert!(numbers.len() < 60);
    for pair in numbers.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn test_three_records_rotation_scenario() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("gmm_log");
    let policy = RotationPolicy::new().with_max_size(100).with_max_backups(2);
    let mut appender = RotatingFileAppender::with_policy(&log_file, policy).expect("Failed to create appender");

    let records: Vec<String> = ["first", "second", "third"]
        .iter()
        .map(|name| format!("{:<59}\n", name))
        .collect();
    for record in &records {
        assert_eq!(record.len(), 60);
        appender.write_record(record.as_bytes()).unwrap();
    }
    appender.flush().unwrap();

    assert_eq!(fs::read_to_string(&log_file).unwrap(), records[2]);
    assert_eq!(fs::read_to_string(appender.backup_path(1)).unwrap(), records[1]);
    assert_eq!(fs::read_to_string(appender.backup_path(2)).unwrap(), records[0]);
}

#[test]
fn test_unavailable_sink_disables_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    // A directory cannot be opened as the log file
    let logger = file_logger(temp_dir.path(), LogLevel::Trace);
    logger.error("never written");

    assert_eq!(logger.state(), LoggerState::Disabled);
    assert_eq!(logger.metrics().emitted(), 0);
    logger.error("still disabled");
    assert_eq!(logger.state(), LoggerState::Disabled);
}

#[test]
fn test_sink_unavailable_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = LoggerConfig::file(temp_dir.path());
    assert!(matches!(config.open_sink(), Err(LoggerError::SinkUnavailable { .. })));
}

#[test]
fn test_overflow_writes_notice_only() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("gmm_log");

    let logger = file_logger(&log_file, LogLevel::Trace);
    let oversized = "z".repeat(MAX_LOG_MESSAGE_LEN * 2);
    logger.emit(LogLevel::Error, format_args!("{}{}", "prefix ", oversized));
    logger.info("after overflow");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(!content.contains("zzzz"));
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("message dropped"));
    assert!(content.ends_with("after overflow\n"));
    assert_eq!(logger.metrics().format_failures(), 1);
}

#[test]
fn test_message_at_limit_is_kept() {
    let capture = CaptureAppender::default();
    let logger = Logger::with_appender(LogLevel::Trace, Box::new(capture.clone()));

    let exact = "q".repeat(MAX_LOG_MESSAGE_LEN);
    logger.emit(LogLevel::Info, format_args!("{}", exact));
    assert_eq!(capture.lines.lock()[0].len(), MAX_LOG_MESSAGE_LEN);
}

#[test]
fn test_control_block_swap_changes_gating() {
    let capture = CaptureAppender::default();
    let diag = Diagnostics::with_appender(Box::new(capture.clone()));

    gfx_debug_message!(diag, Component::Media, DebugLevel::VERBOSE, "unconfigured");

    diag.install_control_block(
        ComponentControlBlock::new().with_debug_level(Component::Media, DebugLevel::CRITICAL),
    )
    .unwrap();
    gfx_debug_message!(diag, Component::Media, DebugLevel::VERBOSE, "verbose hidden");
    gfx_debug_message!(diag, Component::Media, DebugLevel::CRITICAL, "critical shown");

    let previous = diag.clear_control_block();
    assert!(previous.is_some());
    gfx_debug_message!(diag, Component::Media, DebugLevel::VERBOSE, "unconfigured again");

    if gfx_diagnostics::BuildFlavor::CURRENT.logging_enabled() {
        assert_eq!(
            *capture.lines.lock(),
            vec!["MEDIA: unconfigured", "MEDIA: critical shown", "MEDIA: unconfigured again"]
        );
    }
}

#[test]
fn test_control_block_from_json() {
    let json = r#"{
        "debug_enable_mask": 2,
        "assert_enable_mask": 2,
        "report_assert_enable": true,
        "debug_level": [0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    }"#;

    let block = ComponentControlBlock::from_json_str(json).expect("Failed to parse block");
    assert!(block.message_enabled(Component::Gmm, DebugLevel::CRITICAL));
    assert!(!block.message_enabled(Component::Gmm, DebugLevel::NORMAL));
    assert!(block.asserts_enabled(Component::Gmm.mask()));
    assert!(!block.asserts_enabled(Component::Kmd.mask()));
}

#[test]
fn test_config_from_json_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("diagnostics.json");
    let log_path = temp_dir.path().join("from_json");
    fs::write(
        &config_path,
        format!(
            r#"{{ "level": "Info", "sink": "File", "file_path": {:?}, "max_backups": 1 }}"#,
            log_path.display().to_string()
        ),
    )
    .unwrap();

    let config = LoggerConfig::from_json_file(&config_path).expect("Failed to load config");
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.sink, SinkKind::File);
    assert_eq!(config.max_backups, 1);

    let logger = Logger::from_config(config);
    logger.info("configured from json");
    assert!(fs::read_to_string(&log_path).unwrap().contains("configured from json"));
}

#[cfg(debug_assertions)]
mod asserts {
    use super::*;
    use gfx_diagnostics::{disable_assert_site, enable_assert_site, gfx_assert, registered_assert_sites};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TOGGLE_TRAPS: AtomicUsize = AtomicUsize::new(0);

    fn ignore(_: &AssertReport) {}

    fn count_toggle_trap(_: &AssertReport) {
        TOGGLE_TRAPS.fetch_add(1, Ordering::SeqCst);
    }

    fn run_sites(diag: &Diagnostics, toggle_site_one: bool, toggle_site_two: bool) {
        gfx_assert!(diag, Component::Media, toggle_site_one);
        gfx_assert!(diag, Component::Media, toggle_site_two);
    }

    #[test]
    #[should_panic(expected = "GMM: ASSERT")]
    fn test_null_block_traps() {
        let diag = Diagnostics::new().with_hooks(AssertHooks {
            report: ignore,
            ..AssertHooks::default()
        });
        let resource_valid = false;
        gfx_assert!(diag, Component::Gmm, resource_valid);
    }

    #[test]
    fn test_site_toggle_disables_exactly_one_site() {
        let diag = Diagnostics::new().with_hooks(AssertHooks {
            report: ignore,
            trap: count_toggle_trap,
            trace: ignore,
        });

        // Passing evaluations register both sites
        run_sites(&diag, true, true);
        let sites = registered_assert_sites();
        let one = sites
            .iter()
            .find(|s| s.expression() == "toggle_site_one")
            .expect("site one registered");
        let two = sites
            .iter()
            .find(|s| s.expression() == "toggle_site_two")
            .expect("site two registered");

        assert_eq!(disable_assert_site(one.file(), one.line()), 1);
        run_sites(&diag, false, true);
        assert_eq!(TOGGLE_TRAPS.load(Ordering::SeqCst), 0);

        run_sites(&diag, true, false);
        assert_eq!(TOGGLE_TRAPS.load(Ordering::SeqCst), 1);
        assert!(two.is_enabled());

        assert_eq!(enable_assert_site(one.file(), one.line()), 1);
        run_sites(&diag, false, true);
        assert_eq!(TOGGLE_TRAPS.load(Ordering::SeqCst), 2);
    }
}
