//! Route logging.
//!
//! A [`RouteLogger`] samples the position at the project's interval and
//! appends one [`LogRecord`] per tick to a session file. Metadata the user
//! submits while logging waits in a FIFO queue and is attached to the next
//! tick's record, one submission per tick.

mod driver;
mod logger;
mod session;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::project::{Project, TaxonomyClass};

pub use driver::{spawn_logger, LoggerEvent, LoggerHandle};
pub use logger::{LoggerStatus, RouteLogger, SessionSummary};
pub use session::{parse_session_file_name, session_file_name, LogSession};

/// Chosen attribute per taxonomy class.
pub type MetaData = BTreeMap<String, String>;

/// Current wall-clock time as unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Whether a logger is currently writing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerState {
    /// No session is open; ticks are not scheduled.
    Idle,
    /// A session is open and ticks append to it.
    Logging,
}

impl std::fmt::Display for LoggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Logging => write!(f, "logging"),
        }
    }
}

/// A metadata submission waiting for the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMeta {
    /// When the user submitted it (unix seconds).
    pub submitted_at: i64,
    /// Only classes with a selection are present.
    pub meta_data: MetaData,
}

/// One line of a route log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the tick fired (unix seconds).
    pub tick_timestamp: i64,
    /// Present only if a pending submission was consumed by this tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_submitted_at: Option<i64>,
    /// Sampled latitude.
    pub latitude: f64,
    /// Sampled longitude.
    pub longitude: f64,
    /// The consumed submission's selections, or empty.
    #[serde(default)]
    pub meta_data: MetaData,
}

/// Transient per-class attribute choices for one metadata submission.
///
/// Built from a project's taxonomy; every class starts unselected. Passing it
/// to [`RouteLogger::submit_meta`] consumes the current choices and resets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSelection {
    classes: Vec<TaxonomyClass>,
    choices: Vec<Option<String>>,
}

impl MetaSelection {
    /// An empty selection over `project`'s taxonomy.
    #[must_use]
    pub fn for_project(project: &Project) -> Self {
        Self {
            classes: project.taxonomy.clone(),
            choices: vec![None; project.taxonomy.len()],
        }
    }

    /// Choose `attribute` for `class`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the class is unknown or the attribute is
    /// not one of its values.
    pub fn select(&mut self, class: &str, attribute: &str) -> Result<()> {
        let index = self.index_of(class)?;
        if !self.classes[index].has_attribute(attribute) {
            return Err(Error::validation(format!(
                "'{attribute}' is not an attribute of class '{class}' (expected one of: {})",
                self.classes[index].attributes.join(", ")
            )));
        }
        self.choices[index] = Some(attribute.to_string());
        Ok(())
    }

    /// Drop the choice for `class`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the class is unknown.
    pub fn deselect(&mut self, class: &str) -> Result<()> {
        let index = self.index_of(class)?;
        self.choices[index] = None;
        Ok(())
    }

    /// The current choice for `class`, if any.
    #[must_use]
    pub fn selected(&self, class: &str) -> Option<&str> {
        self.classes
            .iter()
            .position(|c| c.name == class)
            .and_then(|i| self.choices[i].as_deref())
    }

    /// True when no class has a choice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.iter().all(Option::is_none)
    }

    /// Reset every class to unselected.
    pub fn clear(&mut self) {
        self.choices.iter_mut().for_each(|c| *c = None);
    }

    /// The chosen attributes, keyed by class. Unselected classes are omitted.
    #[must_use]
    pub fn to_meta_data(&self) -> MetaData {
        self.classes
            .iter()
            .zip(&self.choices)
            .filter_map(|(class, choice)| {
                choice
                    .as_ref()
                    .map(|attr| (class.name.clone(), attr.clone()))
            })
            .collect()
    }

    fn index_of(&self, class: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c.name == class)
            .ok_or_else(|| Error::validation(format!("unknown taxonomy class '{class}'")))
    }
}
