//! push::log
//!
//! Append-only record of pushed solutions.
//!
//! # Design
//!
//! One entry per (user, filename): the first write that lands records the
//! solution and later writes of the same file are not recorded again.
//! Entries are never modified or removed.
//!
//! [`FilePushLog`] stores entries as JSON lines and holds an exclusive file
//! lock while checking for a duplicate and appending, so two processes
//! pushing the same file record it once.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use super::catalog::{points_for, Difficulty};
use crate::core::naming::{language_of, problem_slug};
use crate::core::types::{RepositoryRef, SyncOutcome};

/// Errors from push log operations.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to access push log '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt push log '{path}' at line {line}: {message}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to serialize push log entry: {0}")]
    Serialize(String),
}

/// One recorded push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushLogEntry {
    pub id: Uuid,
    /// Login of the user who pushed
    pub user: String,
    /// Path of the file in the repository
    pub filename: String,
    pub language: Option<String>,
    pub slug: String,
    /// Problem number, when the catalog knew it
    #[serde(default)]
    pub number: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub points: u32,
    pub repository: RepositoryRef,
    pub outcome: SyncOutcome,
    /// SHA-256 of the pushed content, hex
    pub content_digest: String,
    pub timestamp: DateTime<Utc>,
}

impl PushLogEntry {
    /// New entry for a landed write. Language and slug come from the
    /// filename; difficulty is unset.
    pub fn new(
        user: &str,
        filename: &str,
        repository: RepositoryRef,
        outcome: SyncOutcome,
        content: &[u8],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.to_string(),
            filename: filename.to_string(),
            language: language_of(filename).map(str::to_string),
            slug: problem_slug(filename),
            number: None,
            difficulty: None,
            points: 0,
            repository,
            outcome,
            content_digest: hex::encode(Sha256::digest(content)),
            timestamp: Utc::now(),
        }
    }

    /// Attach catalog data.
    pub fn with_problem(mut self, number: Option<String>, difficulty: Option<Difficulty>) -> Self {
        self.number = number;
        self.difficulty = difficulty;
        self.points = points_for(difficulty);
        self
    }

    /// Whether this entry records `filename` for `user`.
    pub fn is_for(&self, user: &str, filename: &str) -> bool {
        self.user == user && self.filename == filename
    }
}

/// Storage for push log entries.
pub trait PushLogStore: Send + Sync {
    /// Record an entry unless one already exists for its (user, filename).
    ///
    /// Returns whether the entry was stored.
    fn record(&self, entry: PushLogEntry) -> Result<bool, LogError>;

    /// All entries, oldest first, optionally for one user.
    fn entries(&self, user: Option<&str>) -> Result<Vec<PushLogEntry>, LogError>;
}

/// In-memory push log.
#[derive(Debug, Default)]
pub struct MemoryPushLog {
    entries: Mutex<Vec<PushLogEntry>>,
}

impl MemoryPushLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PushLogStore for MemoryPushLog {
    fn record(&self, entry: PushLogEntry) -> Result<bool, LogError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.iter().any(|e| e.is_for(&entry.user, &entry.filename)) {
            return Ok(false);
        }
        entries.push(entry);
        Ok(true)
    }

    fn entries(&self, user: Option<&str>) -> Result<Vec<PushLogEntry>, LogError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(filter_user(entries.iter().cloned(), user))
    }
}

/// JSON-lines push log on disk.
#[derive(Debug, Clone)]
pub struct FilePushLog {
    path: PathBuf,
}

impl FilePushLog {
    /// Use the log at `path`. The file is created on first record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self, file: &File) -> Result<Vec<PushLogEntry>, LogError> {
        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| LogError::Corrupt {
                path: self.path.clone(),
                line: index + 1,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl PushLogStore for FilePushLog {
    fn record(&self, entry: PushLogEntry) -> Result<bool, LogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut line =
            serde_json::to_string(&entry).map_err(|e| LogError::Serialize(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        // Held until the file is dropped.
        FileExt::lock_exclusive(&file).map_err(|e| self.io_error(e))?;

        let existing = self.read_all(&file)?;
        if existing
            .iter()
            .any(|e| e.is_for(&entry.user, &entry.filename))
        {
            return Ok(false);
        }

        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| self.io_error(e))?;
        Ok(true)
    }

    fn entries(&self, user: Option<&str>) -> Result<Vec<PushLogEntry>, LogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        FileExt::lock_shared(&file).map_err(|e| self.io_error(e))?;

        let entries = self.read_all(&file)?;
        Ok(filter_user(entries.into_iter(), user))
    }
}

fn filter_user(
    entries: impl Iterator<Item = PushLogEntry>,
    user: Option<&str>,
) -> Vec<PushLogEntry> {
    entries
        .filter(|e| user.map_or(true, |u| e.user == u))
        .collect()
}
