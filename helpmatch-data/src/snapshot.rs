//! JSON snapshot backing both [`TaskSource`] and [`ProfileSource`].
//!
//! A snapshot is a single document exported from the task store:
//!
//! ```json
//! {
//!   "requesters": [{ "id": "vol-1", "skills": ["cooking"] }],
//!   "tasks": [{
//!     "id": "t-1", "title": "Soup kitchen", "description": "Help cook",
//!     "deadline": "2026-03-01T12:00:00Z", "status": "Open"
//!   }]
//! }
//! ```
//!
//! Files are opened through `cap-std` using ambient authority, as the rest of
//! the workspace does.

use std::collections::HashSet;
use std::io::{self, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use helpmatch_core::{
    CandidateTask, ProfileSource, Requester, RequesterId, SourceError, TaskSource,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be opened.
    #[error("failed to open snapshot {path}")]
    Io {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The snapshot was not valid JSON or did not match the schema.
    #[error("failed to parse snapshot {path}")]
    Parse {
        /// Path (or `<inline>`) being parsed.
        path: Utf8PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// Two requester profiles shared an identifier.
    #[error("snapshot lists requester {id} more than once")]
    DuplicateRequester {
        /// Repeated identifier.
        id: RequesterId,
    },
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    requesters: Vec<Requester>,
    #[serde(default)]
    tasks: Vec<CandidateTask>,
}

/// Task and profile source loaded from a JSON snapshot.
///
/// Task order in the document is preserved and defines the ranking
/// tie-break order.
///
/// # Examples
///
/// ```
/// use helpmatch_core::{ProfileSource, RequesterId, TaskSource};
/// use helpmatch_data::SnapshotSource;
///
/// let source = SnapshotSource::from_json_str(r#"{
///     "requesters": [{ "id": "vol-1", "skills": ["driving"] }],
///     "tasks": [
///         { "id": "a", "title": "Lift", "description": "", "deadline": "2026-01-01T00:00:00Z" },
///         { "id": "b", "title": "Done", "description": "", "deadline": "2026-01-01T00:00:00Z",
///           "status": "Completed" }
///     ]
/// }"#)?;
///
/// assert_eq!(source.fetch_open_tasks()?.len(), 1);
/// let requester = source.fetch_requester(&RequesterId::new("vol-1")?)?;
/// assert!(requester.skills.contains("driving"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    requesters: Vec<Requester>,
    tasks: Vec<CandidateTask>,
}

impl SnapshotSource {
    /// Load a snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the file cannot be opened, is not a valid
    /// snapshot, or repeats a requester identifier.
    pub fn load(path: &Utf8Path) -> Result<Self, SnapshotError> {
        let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let document: SnapshotDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = Self::from_document(document)?;
        log::debug!(
            "loaded snapshot {path}: {} requesters, {} tasks",
            snapshot.requesters.len(),
            snapshot.tasks.len()
        );
        Ok(snapshot)
    }

    /// Parse a snapshot held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Parse`] for invalid documents and
    /// [`SnapshotError::DuplicateRequester`] for repeated identifiers.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument =
            serde_json::from_str(json).map_err(|source| SnapshotError::Parse {
                path: Utf8PathBuf::from("<inline>"),
                source,
            })?;
        Self::from_document(document)
    }

    fn from_document(document: SnapshotDocument) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = document
            .requesters
            .iter()
            .find(|requester| !seen.insert(&requester.id))
        {
            return Err(SnapshotError::DuplicateRequester {
                id: duplicate.id.clone(),
            });
        }
        Ok(Self {
            requesters: document.requesters,
            tasks: document.tasks,
        })
    }

    /// Number of tasks in the snapshot, open or not.
    #[must_use]
    pub const fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl TaskSource for SnapshotSource {
    fn fetch_open_tasks(&self) -> Result<Vec<CandidateTask>, SourceError> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| task.status.is_open())
            .cloned()
            .collect())
    }
}

impl ProfileSource for SnapshotSource {
    fn fetch_requester(&self, id: &RequesterId) -> Result<Requester, SourceError> {
        self.requesters
            .iter()
            .find(|requester| requester.id == *id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound { id: id.clone() })
    }
}
