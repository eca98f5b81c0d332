//! # Chat Store
//!
//! Append-only local record of received chat lines, replayed on startup.
//!
//! A missing store is not an error: [`ChatStore::replay`] returns `Ok(None)`.
//! Any other failure comes back as a [`PersistenceError`] so callers can log
//! it without confusing it with "no history yet".

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

/// Default store location, relative to the repository root.
pub const DEFAULT_STORE_PATH: &str = ".git/.gitchat_store";

#[derive(Debug)]
pub struct PersistenceError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat store {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub trait ChatStore: Send {
    /// Every stored line, oldest first. `Ok(None)` when nothing was ever stored.
    fn replay(&self) -> Result<Option<Vec<String>>, PersistenceError>;

    fn append_line(&mut self, line: &str) -> Result<(), PersistenceError>;
}

/// Newline-terminated lines in a plain text file.
#[derive(Debug, Clone)]
pub struct FileChatStore {
    path: PathBuf,
}

impl FileChatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: io::Error) -> PersistenceError {
        PersistenceError {
            path: self.path.clone(),
            source,
        }
    }
}

impl ChatStore for FileChatStore {
    fn replay(&self) -> Result<Option<Vec<String>>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let lines: Vec<String> = contents
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect();
                debug!("Replaying {} stored lines from {}", lines.len(), self.path.display());
                Ok(Some(lines))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.error(e)),
        }
    }

    fn append_line(&mut self, line: &str) -> Result<(), PersistenceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e))?;
        writeln!(file, "{line}").map_err(|e| self.error(e))
    }
}
