//! Size-bounded rotating file writer
//!
//! The active file is `<path>`; rotated files are `<path>.1` (newest) up to
//! `<path>.N`, each optionally gzip-compressed to `<path>.K.gz`. Backups past
//! the count limit or older than the age limit are deleted on rotation.

use crate::core::config::Config;
use crate::core::error::{LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MAX_DELETION_FAILURES: usize = 5;

/// Limits applied by [`RotatingFileWriter`]
///
/// # Examples
///
/// ```
/// use teelog::sinks::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_max_age(Some(Duration::from_secs(7 * 86_400)))
///     .with_compression(true);
/// assert_eq!(policy.max_backups, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RotationPolicy {
    /// Size in bytes past which the active file is rotated
    pub max_bytes: u64,
    /// Number of rotated files to keep; zero keeps none
    pub max_backups: usize,
    /// Rotated files older than this are deleted
    pub max_age: Option<Duration>,
    /// Whether to gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            max_backups: 5,
            max_age: None,
            compress: false,
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy described by the rotation keys of `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_bytes: config.max_size_bytes(),
            max_backups: config.max_backups,
            max_age: config.max_age_duration(),
            compress: config.compress,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Option<Duration>) -> Self {
        self.max_age = age;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Rotating file writer
///
/// Not synchronized; wrap it in a locking sink to share it.
///
/// # Examples
///
/// ```no_run
/// use teelog::sinks::{RotatingFileWriter, RotationPolicy};
/// use std::io::Write;
///
/// let mut writer = RotatingFileWriter::open(
///     "/var/log/app.log",
///     RotationPolicy::new().with_max_size(10 * 1024 * 1024),
/// ).unwrap();
/// writer.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
/// ```
#[derive(Debug)]
pub struct RotatingFileWriter {
    base_path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    current_size: u64,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
}

impl RotatingFileWriter {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the file cannot be created or opened
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        let (file, current_size) = Self::open_file(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            file: Some(file),
            current_size,
            deletion_failure_count: 0,
        })
    }

    fn open_file(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggerError::filesystem("opening log file", path, e))?;

        let size = file
            .metadata()
            .map_err(|e| LoggerError::filesystem("reading log file metadata", path, e))?
            .len();
        Ok((file, size))
    }

    /// Whether writing `incoming` more bytes would exceed the size limit
    fn should_rotate(&self, incoming: usize) -> bool {
        self.current_size > 0 && self.current_size + incoming as u64 > self.policy.max_bytes
    }

    /// Perform log rotation
    fn rotate(&mut self) -> Result<()> {
        // Release the handle before renaming the file underneath it
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.policy.max_backups == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to discard full log file: {}", e),
                    )
                })?;
            }
        } else {
            self.drop_oldest_backup()?;
            self.shift_backups()?;

            let backup_path = self.backup_path(1);
            if self.base_path.exists() {
                fs::rename(&self.base_path, &backup_path).map_err(|e| {
                    LoggerError::rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;

                if self.policy.compress {
                    compress_file(&backup_path, &self.compressed_path(1))?;
                }
            }
        }

        self.prune_expired();

        let (file, size) = Self::open_file(&self.base_path)?;
        self.file = Some(file);
        self.current_size = size;
        Ok(())
    }

    /// Delete the backup that would fall past the count limit
    fn drop_oldest_backup(&mut self) -> Result<()> {
        let index = self.policy.max_backups;
        let mut deletion_failed = false;

        for oldest in [self.backup_path(index), self.compressed_path(index)] {
            if oldest.exists() {
                if let Err(e) = fs::remove_file(&oldest) {
                    deletion_failed = true;
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove oldest backup {}: {} (failure #{}/{})",
                        oldest.display(),
                        e,
                        self.deletion_failure_count + 1,
                        MAX_DELETION_FAILURES
                    );
                }
            }
        }

        if deletion_failed {
            self.deletion_failure_count += 1;
            if self.deletion_failure_count >= MAX_DELETION_FAILURES {
                return Err(LoggerError::rotation(
                    self.base_path.display().to_string(),
                    format!(
                        "Rotation aborted: failed to delete old backup files {} consecutive times",
                        self.deletion_failure_count
                    ),
                ));
            }
        } else {
            self.deletion_failure_count = 0;
        }
        Ok(())
    }

    /// Move `.i` to `.i+1` for every retained backup, newest last
    fn shift_backups(&self) -> Result<()> {
        for i in (1..self.policy.max_backups).rev() {
            for (old_path, new_path) in [
                (self.compressed_path(i), self.compressed_path(i + 1)),
                (self.backup_path(i), self.backup_path(i + 1)),
            ] {
                if !old_path.exists() {
                    continue;
                }
                if fs::rename(&old_path, &new_path).is_err() {
                    // Some platforms refuse to rename over an existing file
                    if new_path.exists() {
                        let _ = fs::remove_file(&new_path);
                    }
                    fs::rename(&old_path, &new_path).map_err(|e| {
                        LoggerError::rotation(
                            old_path.display().to_string(),
                            format!("Failed to rotate backup files: {}", e),
                        )
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Delete backups whose modification time is past the age limit
    fn prune_expired(&self) {
        let Some(max_age) = self.policy.max_age else {
            return;
        };
        let Some(horizon) = SystemTime::now().checked_sub(max_age) else {
            return;
        };

        for i in 1..=self.policy.max_backups {
            for path in [self.backup_path(i), self.compressed_path(i)] {
                let expired = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .map(|modified| modified < horizon)
                    .unwrap_or(false);
                if expired {
                    if let Err(e) = fs::remove_file(&path) {
                        eprintln!(
                            "[LOGGER WARNING] Failed to remove expired backup {}: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }
    }

    /// Get backup file path for given index
    fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    fn compressed_path(&self, index: usize) -> PathBuf {
        let mut path = self.backup_path(index).into_os_string();
        path.push(".gz");
        PathBuf::from(path)
    }

    /// Get current file size
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Get base path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Write for RotatingFileWriter {
    /// Writes `buf` as a unit; a record is never split across two files
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len()) {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                if self.file.is_none() {
                    let (file, size) = Self::open_file(&self.base_path)
                        .map_err(|reopen| io::Error::new(io::ErrorKind::Other, reopen))?;
                    self.file = Some(file);
                    self.current_size = size;
                }
                // Let the file grow past the limit rather than retry on every write
                self.current_size = 0;
            }
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "log file not open"))?;
        file.write_all(buf)?;
        self.current_size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Gzip `path` into `gz_path`, removing `path` only once the archive is complete
fn compress_file(path: &Path, gz_path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let mut temp_path = gz_path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let input = File::open(path)
        .map_err(|e| LoggerError::filesystem("opening file for compression", path, e))?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_path)
        .map_err(|e| LoggerError::filesystem("creating compressed file", &temp_path, e))?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut inner| inner.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_path);
        return Err(LoggerError::filesystem("compressing rotated file", path, e));
    }

    fs::rename(&temp_path, gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LoggerError::filesystem("renaming compressed file", gz_path, e)
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}
