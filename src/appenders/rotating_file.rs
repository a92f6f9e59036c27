//! Size-bounded log file with a fixed number of rotated generations
//!
//! The current file is `<base>`; rotated generations are `<base>.1` (newest)
//! through `<base>.N` (oldest). Rotation runs inline on the write that would
//! push the current file past its limit, so at most N+1 files ever exist.

use crate::core::appender::Appender;
use crate::core::config::{DEFAULT_MAX_BACKUPS, DEFAULT_MAX_FILE_SIZE};
use crate::core::error::{LoggerError, Result};
use crate::core::log_entry::LogEntry;
use crate::core::timestamp::TimestampFormat;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// # Examples
///
/// ```
/// use gfx_diagnostics::appenders::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(1024 * 1024)
///     .with_max_backups(2);
/// assert_eq!(policy.max_file_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Bytes the current file may hold before a write rotates it
    pub max_file_size: u64,
    /// Rotated generations kept; zero truncates instead of rotating
    pub max_backup_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backup_files: DEFAULT_MAX_BACKUPS,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }
}

/// # Examples
///
/// ```no_run
/// use gfx_diagnostics::appenders::{RotatingFileAppender, RotationPolicy};
///
/// let policy = RotationPolicy::new().with_max_size(5 * 1024 * 1024).with_max_backups(3);
/// let appender = RotatingFileAppender::with_policy("./gmm_log", policy).unwrap();
/// ```
pub struct RotatingFileAppender {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    rotation_count: u64,
    timestamp_format: TimestampFormat,
}

impl RotatingFileAppender {
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_current(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            rotation_count: 0,
            timestamp_format: TimestampFormat::default(),
        })
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn open_current(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    /// An empty file never rotates, so a single oversized record still lands
    fn should_rotate(&self, incoming: u64) -> bool {
        self.current_size > 0 && self.current_size + incoming > self.policy.max_file_size
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        // Removed externally: start a fresh file and leave the backups alone
        if !self.base_path.exists() {
            return self.reopen();
        }

        let depth = self.policy.max_backup_files;
        if depth == 0 {
            fs::remove_file(&self.base_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to truncate current log file: {}", e),
                )
            })?;
        } else {
            // Move the current file out of the way before touching any backup,
            // so a failed rename leaves every generation where it was
            let staged = self.staging_path();
            Self::rename_replacing(&self.base_path, &staged)?;

            if let Err(e) = self.shift_backups(depth, &staged) {
                // Put the current file back so the next write keeps appending to it
                if staged.exists() {
                    let _ = fs::rename(&staged, &self.base_path);
                }
                return Err(e);
            }
        }

        self.reopen()?;
        self.rotation_count += 1;
        Ok(())
    }

    fn shift_backups(&self, depth: usize, staged: &Path) -> Result<()> {
        let oldest = self.backup_path(depth);
        if oldest.exists() {
            fs::remove_file(&oldest).map_err(|e| {
                LoggerError::file_rotation(
                    oldest.display().to_string(),
                    format!("Failed to evict oldest generation: {}", e),
                )
            })?;
        }

        for i in (1..depth).rev() {
            let old_path = self.backup_path(i);
            if old_path.exists() {
                Self::rename_replacing(&old_path, &self.backup_path(i + 1))?;
            }
        }

        Self::rename_replacing(staged, &self.backup_path(1))
    }

    fn reopen(&mut self) -> Result<()> {
        let (file, size) = Self::open_current(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .base_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".rotating");
        self.base_path.with_file_name(name)
    }

    fn rename_replacing(from: &Path, to: &Path) -> Result<()> {
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        // Some platforms refuse to rename over an existing file
        if to.exists() {
            let _ = fs::remove_file(to);
        }
        fs::rename(from, to).map_err(|e| {
            LoggerError::file_rotation(
                from.display().to_string(),
                format!("Failed to rename to '{}': {}", to.display(), e),
            )
        })
    }

    /// Path of rotated generation `index` (1 is the newest)
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self
            .base_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}", index));
        self.base_path.with_file_name(name)
    }

    /// Write one already-rendered record, rotating first when needed
    pub fn write_record(&mut self, record: &[u8]) -> Result<()> {
        let incoming = record.len() as u64;

        if self.should_rotate(incoming) {
            if let Err(e) = self.rotate() {
                eprintln!("[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.", e);

                if self.writer.is_none() {
                    if let Err(reopen_err) = self.reopen() {
                        eprintln!(
                            "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                            reopen_err
                        );
                        return Err(e);
                    }
                }

                // Let the file grow past its limit rather than retry on every write
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(record).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += incoming;
        Ok(())
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Rotations performed by this appender
    #[must_use]
    pub fn rotation_count(&self) -> u64 {
        self.rotation_count
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        "RotatingFileAppender"
    }

    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = entry.format_line(&self.timestamp_format);
        self.write_record(line.as_bytes())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
