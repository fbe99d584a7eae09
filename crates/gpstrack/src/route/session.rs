//! Append-only route log files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::LogRecord;
use crate::error::{Error, Result};

/// File name of the session for `project` started at `started_at`.
#[must_use]
pub fn session_file_name(project: &str, started_at: i64) -> String {
    format!("route_{project}_{started_at}.jsonl")
}

fn session_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^route_(?P<project>.+)_(?P<started>\d+)\.jsonl$")
            .expect("valid session name pattern")
    })
}

/// Split a session file name into its project name and start timestamp.
#[must_use]
pub fn parse_session_file_name(file_name: &str) -> Option<(String, i64)> {
    let caps = session_name_pattern().captures(file_name)?;
    let started = caps["started"].parse().ok()?;
    Some((caps["project"].to_string(), started))
}

/// An open, append-only session file.
///
/// Each record is written as one JSON line and flushed before `append`
/// returns. Complete lines are never truncated or rewritten.
///
/// A write that fails part-way is cut back to the end of the last complete
/// line. If even that fails, the next record starts with a newline so the
/// torn bytes stay on a line of their own.
#[derive(Debug)]
pub struct LogSession {
    path: PathBuf,
    started_at: i64,
    file: File,
    records: u64,
    /// Bytes covered by complete lines.
    committed: u64,
    torn: bool,
}

impl LogSession {
    /// Create a new session file for `project` in `routes_dir`.
    ///
    /// If a file for the same second already exists, the start timestamp is
    /// moved forward until the name is free.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn create(routes_dir: &Path, project: &str, started_at: i64) -> Result<Self> {
        if !routes_dir.exists() {
            fs::create_dir_all(routes_dir).map_err(|source| Error::DirectoryCreate {
                path: routes_dir.to_path_buf(),
                source,
            })?;
        }

        let mut started_at = started_at;
        loop {
            let path = routes_dir.join(session_file_name(project, started_at));
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => {
                    debug!("Opened session file {}", path.display());
                    return Ok(Self {
                        path,
                        started_at,
                        file,
                        records: 0,
                        committed: 0,
                        torn: false,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => started_at += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append one record as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        let mut line = String::new();
        if self.torn {
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(record)?);
        line.push('\n');

        let written = self
            .file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush());
        if let Err(e) = written {
            self.discard_partial();
            return Err(e.into());
        }

        // After a torn write the file holds bytes this handle never counted
        let appended = self.committed + line.len() as u64;
        self.committed = if self.torn {
            self.file.metadata().map_or(appended, |meta| meta.len())
        } else {
            appended
        };
        self.torn = false;
        self.records += 1;
        Ok(())
    }

    /// Drop any bytes past the last complete line.
    fn discard_partial(&mut self) {
        match self.file.set_len(self.committed) {
            Ok(()) => self.torn = false,
            Err(e) => {
                warn!(
                    "Could not trim {} after a failed append: {}",
                    self.path.display(),
                    e
                );
                self.torn = true;
            }
        }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start timestamp embedded in the file name.
    #[must_use]
    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Number of records appended through this handle.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records
    }

    #[cfg(test)]
    pub(super) fn replace_file(&mut self, file: File) {
        self.file = file;
    }
}
