//! Size- and age-bounded log file with numbered backups
//!
//! [`RotatingFile`] owns the file descriptor of the active log file. Every
//! write goes through an internal mutex, so one instance can be shared by all
//! loggers forked from the same root.
//!
//! When a write would push the file past the size limit the active file is
//! renamed to `<stem>-<timestamp>.<ext>` and a fresh file is opened in its
//! place. Retired segments beyond the backup count or older than the age
//! limit are removed, and the rest are gzipped when compression is enabled.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::config::Config;
use crate::core::{LogError, LogIoResultExt, LogResult};

const MEGABYTE: u64 = 1024 * 1024;
const GZ_EXT: &str = "gz";

/// Limits that trigger rotation and retention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before the file would exceed this many megabytes; `0` disables
    /// size-based rotation
    pub max_size_mb: u64,
    /// Retired segments to keep; `0` keeps all
    pub max_backups: usize,
    /// Days to keep retired segments; `0` keeps them regardless of age
    pub max_age_days: u64,
    /// Gzip retired segments
    pub compress: bool,
}

impl RotationPolicy {
    /// Policy described by a merged configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_size_mb: config.max_size,
            max_backups: config.max_backups,
            max_age_days: config.max_age,
            compress: config.compress.unwrap_or(false),
        }
    }

    fn max_bytes(&self) -> Option<u64> {
        (self.max_size_mb > 0).then(|| self.max_size_mb.saturating_mul(MEGABYTE))
    }
}

/// A retired log segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Location on disk
    pub path: PathBuf,
    /// Rotation time encoded in the file name
    pub rotated_at: OffsetDateTime,
    /// `true` if the segment has been gzipped
    pub compressed: bool,
}

#[derive(Debug)]
struct State {
    file: File,
    size: u64,
    max_bytes: Option<u64>,
    last_rotation: Option<OffsetDateTime>,
}

/// Log file that rotates itself according to a [`RotationPolicy`]
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<State>,
}

impl RotatingFile {
    /// Open (or create) the log file at `path` for appending, creating
    /// missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory or the file cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> LogResult<Self> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(LogError::config(format!(
                "Invalid file path (no filename): '{}'",
                path.display()
            )));
        }
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_log_context(|| format!("create log directory {}", dir.display()))?;
        }

        let file = open_append(&path)?;
        let size = file
            .metadata()
            .with_log_context(|| format!("stat {}", path.display()))?
            .len();

        Ok(Self {
            state: Mutex::new(State {
                file,
                size,
                max_bytes: policy.max_bytes(),
                last_rotation: None,
            }),
            path,
            policy,
        })
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active limits
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Bytes written to the active file
    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    /// Retire the active file now and start a new one, then apply retention.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if renaming, reopening or cleaning up fails.
    pub fn rotate(&self) -> LogResult<()> {
        let mut state = self.state.lock();
        self.roll(&mut state)?;
        self.retain()
    }

    /// Flush buffered data of the active file to disk
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the sync fails.
    pub fn sync(&self) -> LogResult<()> {
        self.state
            .lock()
            .file
            .sync_all()
            .with_log_context(|| format!("sync {}", self.path.display()))
    }

    /// Retired segments of this file, newest first
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory cannot be read.
    pub fn backups(&self) -> LogResult<Vec<Backup>> {
        let dir = self.dir();
        let entries =
            fs::read_dir(dir).with_log_context(|| format!("list {}", dir.display()))?;

        let mut backups: Vec<Backup> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| self.parse_backup(entry.path()))
            .collect();
        backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
        Ok(backups)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_path(&self, at: OffsetDateTime) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = at
            .format(format_description!(
                "[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]"
            ))
            .unwrap_or_else(|_| at.unix_timestamp().to_string());
        self.dir().join(format!("{stem}-{stamp}{ext}"))
    }

    fn parse_backup(&self, path: PathBuf) -> Option<Backup> {
        let name = path.file_name()?.to_str()?;
        let (name, compressed) = match name.strip_suffix(&format!(".{GZ_EXT}")) {
            Some(plain) => (plain, true),
            None => (name, false),
        };

        let (stem, ext) = self.name_parts();
        let stamp = name
            .strip_prefix(stem.as_str())?
            .strip_prefix('-')?
            .strip_suffix(ext.as_str())?;
        let rotated_at = PrimitiveDateTime::parse(
            stamp,
            format_description!(
                "[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]"
            ),
        )
        .ok()?
        .assume_utc();

        Some(Backup {
            path,
            rotated_at,
            compressed,
        })
    }

    /// Rename the active file to a fresh backup name and reopen
    fn roll(&self, state: &mut State) -> LogResult<()> {
        state
            .file
            .flush()
            .with_log_context(|| format!("flush {}", self.path.display()))?;

        // Backup names must sort in rotation order even within one millisecond.
        let mut at = OffsetDateTime::now_utc();
        if let Some(last) = state.last_rotation {
            at = at.max(last + Duration::milliseconds(1));
        }
        let mut backup = self.backup_path(at);
        while backup.exists() || gz_path(&backup).exists() {
            at += Duration::milliseconds(1);
            backup = self.backup_path(at);
        }

        fs::rename(&self.path, &backup).with_log_context(|| {
            format!("rename {} to {}", self.path.display(), backup.display())
        })?;
        state.file = open_append(&self.path)?;
        state.size = 0;
        state.last_rotation = Some(at);
        Ok(())
    }

    /// Apply backup-count, age and compression rules to retired segments
    fn retain(&self) -> LogResult<()> {
        let mut backups = self.backups()?;

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            for stale in backups.split_off(self.policy.max_backups) {
                remove(&stale.path)?;
            }
        }

        if let Some(cutoff) = age_cutoff(OffsetDateTime::now_utc(), self.policy.max_age_days) {
            let (keep, expired): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|b| b.rotated_at >= cutoff);
            for stale in expired {
                remove(&stale.path)?;
            }
            backups = keep;
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                compress(&backup.path)?;
            }
        }
        Ok(())
    }

    fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        let len = buf.len() as u64;

        if let Some(max) = state.max_bytes {
            if len > max {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("write length {len} exceeds maximum file size {max}"),
                ));
            }
            if state.size + len > max {
                self.roll(&mut state).map_err(io::Error::other)?;
                // Retention problems must not lose the record being written.
                let _ = self.retain();
            }
        }

        let written = state.file.write(buf)?;
        state.size += written as u64;
        Ok(written)
    }
}

impl Write for &RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().file.flush()
    }
}

/// Oldest rotation time kept by an age limit of `days`; `None` when the limit
/// is off or reaches past the representable range.
fn age_cutoff(now: OffsetDateTime, days: u64) -> Option<OffsetDateTime> {
    if days == 0 {
        return None;
    }
    i64::try_from(days)
        .ok()
        .and_then(|days| days.checked_mul(86_400))
        .map(Duration::seconds)
        .and_then(|age| now.checked_sub(age))
}

fn open_append(path: &Path) -> LogResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_log_context(|| format!("open {}", path.display()))
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(GZ_EXT);
    PathBuf::from(name)
}

fn remove(path: &Path) -> LogResult<()> {
    fs::remove_file(path).with_log_context(|| format!("remove {}", path.display()))
}

fn compress(path: &Path) -> LogResult<()> {
    let target = gz_path(path);
    let result = (|| -> io::Result<()> {
        let mut source = File::open(path)?;
        let mut encoder = GzEncoder::new(File::create(&target)?, Compression::default());
        io::copy(&mut source, &mut encoder)?;
        encoder.finish()?.sync_all()
    })();
    result.with_log_context(|| format!("compress {}", path.display()))?;
    remove(path)
}
