//! Reading route logs back for display.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::route::parse_session_file_name;

/// A session file found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFile {
    /// File name, used as the session's identifier.
    pub file_name: String,
    /// Project the session belongs to.
    pub project: String,
    /// Start timestamp embedded in the file name.
    pub started_at: i64,
    /// Full path.
    pub path: PathBuf,
}

/// The marker appended when a session has more records than are shown.
#[must_use]
pub fn truncation_marker(max_lines: usize) -> String {
    format!("...\n(Only showing first {max_lines} logs)")
}

/// Read-only access to the route log directory.
#[derive(Debug, Clone)]
pub struct RouteViewer {
    dir: PathBuf,
}

impl RouteViewer {
    /// Create a viewer over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory being read.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sessions recorded for `project`, most recent first.
    ///
    /// A missing directory means no sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list_sessions(&self, project: &str) -> Result<Vec<SessionFile>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let Some((owner, started_at)) = parse_session_file_name(&file_name) else {
                continue;
            };
            if owner != project {
                continue;
            }
            sessions.push(SessionFile {
                path: entry.path(),
                file_name,
                project: owner,
                started_at,
            });
        }

        sessions.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        debug!("Found {} sessions for '{}'", sessions.len(), project);
        Ok(sessions)
    }

    /// Up to `max_lines` records of a session, pretty-printed.
    ///
    /// Lines that are not valid JSON are returned verbatim. If the file holds
    /// more than `max_lines` lines a single [`truncation_marker`] is appended.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if `file_name` does not name a session file
    /// in the directory, or an I/O error if it cannot be read.
    pub fn read_session(&self, file_name: &str, max_lines: usize) -> Result<Vec<String>> {
        let not_found = || Error::SessionNotFound {
            name: file_name.to_string(),
        };

        // Only plain file names inside the directory
        if Path::new(file_name).file_name().and_then(|n| n.to_str()) != Some(file_name) {
            return Err(not_found());
        }

        let file = match File::open(self.dir.join(file_name)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let mut shown = Vec::new();
        for (i, raw) in BufReader::new(file).split(b'\n').enumerate() {
            if i >= max_lines {
                shown.push(truncation_marker(max_lines));
                break;
            }
            // Undecodable bytes are shown, not fatal
            let raw = raw?;
            let decoded = String::from_utf8_lossy(&raw);
            let line = decoded.strip_suffix('\r').unwrap_or(&decoded);
            let pretty = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|value| serde_json::to_string_pretty(&value).ok());
            shown.push(pretty.unwrap_or_else(|| line.to_string()));
        }
        Ok(shown)
    }
}
