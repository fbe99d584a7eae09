//! The route logger state machine.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::{unix_now, LogRecord, LogSession, LoggerState, MetaData, MetaSelection, PendingMeta};
use crate::error::{Error, Result};
use crate::location::LocationProvider;
use crate::project::Project;

/// Snapshot of a logger for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerStatus {
    /// Idle or logging.
    pub state: LoggerState,
    /// The open session file, while logging.
    pub session: Option<PathBuf>,
    /// Submissions waiting for a tick.
    pub pending: usize,
    /// Records written to the open session.
    pub records: u64,
}

/// What a stopped session left on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// The session file.
    pub path: PathBuf,
    /// Start timestamp embedded in the file name.
    pub started_at: i64,
    /// Number of records written.
    pub records: u64,
}

/// Samples positions for one project and appends them to session files.
///
/// `Idle -> Logging` on [`start`](Self::start), back on
/// [`stop`](Self::stop); every start opens a fresh session file. The pending
/// queue belongs to the logger, not the session, so submissions left over at
/// `stop` are attached to the first ticks of the next session.
///
/// The logger does no scheduling of its own: whoever drives it calls
/// [`on_tick`](Self::on_tick) every [`interval`](Self::interval) while it is
/// logging (see [`spawn_logger`](super::spawn_logger)).
pub struct RouteLogger<L> {
    project: Project,
    routes_dir: PathBuf,
    location: L,
    pending: VecDeque<PendingMeta>,
    capacity: Option<usize>,
    session: Option<LogSession>,
}

// Providers are often closures, so `location` is left out.
impl<L> std::fmt::Debug for RouteLogger<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteLogger")
            .field("project", &self.project.name)
            .field("routes_dir", &self.routes_dir)
            .field("pending", &self.pending.len())
            .field("capacity", &self.capacity)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<L: LocationProvider> RouteLogger<L> {
    /// Create an idle logger for `project`, writing sessions to `routes_dir`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the project would not pass a save.
    pub fn new(project: Project, routes_dir: impl Into<PathBuf>, location: L) -> Result<Self> {
        project.validate()?;
        Ok(Self {
            project,
            routes_dir: routes_dir.into(),
            location,
            pending: VecDeque::new(),
            capacity: None,
            session: None,
        })
    }

    /// Cap the pending queue. `None` leaves it unbounded.
    #[must_use]
    pub fn with_pending_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// The project being logged.
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Time between ticks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.project.interval()
    }

    /// Directory session files are created in.
    #[must_use]
    pub fn routes_dir(&self) -> &Path {
        &self.routes_dir
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoggerState {
        if self.session.is_some() {
            LoggerState::Logging
        } else {
            LoggerState::Idle
        }
    }

    /// Number of submissions waiting for a tick.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of the logger.
    #[must_use]
    pub fn status(&self) -> LoggerStatus {
        LoggerStatus {
            state: self.state(),
            session: self.session.as_ref().map(|s| s.path().to_path_buf()),
            pending: self.pending.len(),
            records: self.session.as_ref().map_or(0, LogSession::records_written),
        }
    }

    /// Open a new session file and enter `Logging`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if already logging, or an I/O error if the
    /// session file cannot be created.
    pub fn start(&mut self) -> Result<PathBuf> {
        if self.session.is_some() {
            return Err(Error::invalid_state("start", self.state()));
        }

        let session = LogSession::create(&self.routes_dir, &self.project.name, unix_now())?;
        let path = session.path().to_path_buf();
        info!(
            "Started logging '{}' every {}s to {}",
            self.project.name,
            self.project.interval_secs,
            path.display()
        );
        self.session = Some(session);
        Ok(path)
    }

    /// Close the session and return to `Idle`. The file stays on disk.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if already idle.
    pub fn stop(&mut self) -> Result<SessionSummary> {
        let session = self
            .session
            .take()
            .ok_or_else(|| Error::invalid_state("stop", LoggerState::Idle))?;

        let summary = SessionSummary {
            path: session.path().to_path_buf(),
            started_at: session.started_at(),
            records: session.records_written(),
        };
        info!(
            "Stopped logging '{}': {} records in {}",
            self.project.name,
            summary.records,
            summary.path.display()
        );
        Ok(summary)
    }

    /// Queue the selection's choices for the next tick and reset it.
    ///
    /// Returns whether anything was queued: a selection with no choices is
    /// cleared but queues nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when idle and `PendingQueueFull` when a cap is
    /// set and reached. The selection is left as it was in both cases.
    pub fn submit_meta(&mut self, selection: &mut MetaSelection) -> Result<bool> {
        if self.session.is_none() {
            return Err(Error::invalid_state("submit metadata", self.state()));
        }

        let meta_data = selection.to_meta_data();
        if meta_data.is_empty() {
            selection.clear();
            return Ok(false);
        }

        if let Some(capacity) = self.capacity {
            if self.pending.len() >= capacity {
                return Err(Error::PendingQueueFull { capacity });
            }
        }

        self.pending.push_back(PendingMeta {
            submitted_at: unix_now(),
            meta_data,
        });
        selection.clear();
        debug!("Queued metadata ({} pending)", self.pending.len());
        Ok(true)
    }

    /// Sample the position and append one record to the session.
    ///
    /// The oldest pending submission, if any, is attached to the record and
    /// removed from the queue once the record is on disk. At most one
    /// submission is consumed per tick.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when idle, a location error if no position is
    /// available, or an I/O error if the append fails. The pending queue is
    /// unchanged on error.
    pub fn on_tick(&mut self) -> Result<LogRecord> {
        let Some(session) = self.session.as_mut() else {
            return Err(Error::invalid_state("record a tick", LoggerState::Idle));
        };

        let position = self.location.current_location()?;
        let (meta_submitted_at, meta_data) = match self.pending.front() {
            Some(meta) => (Some(meta.submitted_at), meta.meta_data.clone()),
            None => (None, MetaData::new()),
        };

        let record = LogRecord {
            tick_timestamp: unix_now(),
            meta_submitted_at,
            latitude: position.latitude,
            longitude: position.longitude,
            meta_data,
        };
        session.append(&record)?;

        if record.meta_submitted_at.is_some() {
            self.pending.pop_front();
        }
        debug!(
            "Tick at {} ({}), {} pending",
            record.tick_timestamp,
            position,
            self.pending.len()
        );
        Ok(record)
    }
}
