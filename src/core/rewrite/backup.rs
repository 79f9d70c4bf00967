//! Pre-rewrite snapshots.
//!
//! A backup is written before any destructive write. Its name embeds the
//! original file name and the run's timestamp:
//!
//! ```text
//! src/app/page.tsx  ->  src/app/page.tsx.20261017-143005.bak
//! ```
//!
//! Backups are created with create-new semantics. If the name is taken (a
//! re-run within the same second, or two same-named files sharing a backup
//! directory) a `-1`, `-2`, ... counter is appended before `.bak`.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

pub const BACKUP_SUFFIX: &str = ".bak";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const MAX_COLLISIONS: u32 = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    started_at: DateTime<Local>,
    dir: Option<PathBuf>,
}

impl BackupManager {
    /// Backups land beside the originals, stamped with the current time.
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    pub fn at(started_at: DateTime<Local>) -> Self {
        BackupManager {
            started_at,
            dir: None,
        }
    }

    /// Collect all backups in `dir` instead of beside each original.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn timestamp(&self) -> String {
        self.started_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Write `content` (the pre-rewrite text) to a fresh backup path.
    ///
    /// Fails with `file.backup_failed`; the caller must then leave `path` alone.
    pub fn snapshot(&self, path: &Path, content: &str) -> Result<BackupRecord> {
        let timestamp = self.timestamp();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::file_backup_failed(path, path, "path has no file name"))?;

        let dir = match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| Error::file_backup_failed(path, dir, e.to_string()))?;
                dir.clone()
            }
            None => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let mut attempt = 0;
        loop {
            let candidate = dir.join(backup_file_name(&file_name, &timestamp, attempt));
            match io::write_new(&candidate, content.as_bytes()) {
                Ok(()) => {
                    crate::log_status!("backup", "{} -> {}", path.display(), candidate.display());
                    return Ok(BackupRecord {
                        original_path: path.to_path_buf(),
                        backup_path: candidate,
                        timestamp,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_COLLISIONS => {
                    attempt += 1;
                }
                Err(e) => {
                    return Err(Error::file_backup_failed(path, &candidate, e.to_string()));
                }
            }
        }
    }
}

impl Default for BackupManager {
    fn default() -> Self {
        Self::new()
    }
}

fn backup_file_name(file_name: &str, timestamp: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}.{}{}", file_name, timestamp, BACKUP_SUFFIX)
    } else {
        format!("{}.{}-{}{}", file_name, timestamp, attempt, BACKUP_SUFFIX)
    }
}
