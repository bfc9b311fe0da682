//! In-memory task and profile source used by unit and behaviour tests.

use crate::{CandidateTask, ProfileSource, Requester, RequesterId, SourceError, TaskSource};

/// In-memory implementation of [`TaskSource`] and [`ProfileSource`].
///
/// The source performs linear scans and is intended only for small datasets.
/// It can be switched into a failing mode to exercise error paths.
#[derive(Default, Debug, Clone)]
pub struct MemorySource {
    requesters: Vec<Requester>,
    tasks: Vec<CandidateTask>,
    unavailable: Option<String>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requester profile.
    #[must_use]
    pub fn with_requester(mut self, requester: Requester) -> Self {
        self.requesters.push(requester);
        self
    }

    /// Add tasks in the order they should be returned.
    #[must_use]
    pub fn with_tasks<I>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = CandidateTask>,
    {
        self.tasks.extend(tasks);
        self
    }

    /// Make every fetch fail with [`SourceError::Unavailable`].
    #[must_use]
    pub fn unavailable(mut self, message: impl Into<String>) -> Self {
        self.unavailable = Some(message.into());
        self
    }

    fn check_available(&self) -> Result<(), SourceError> {
        self.unavailable
            .as_ref()
            .map_or(Ok(()), |message| {
                Err(SourceError::Unavailable {
                    message: message.clone(),
                })
            })
    }
}

impl TaskSource for MemorySource {
    fn fetch_open_tasks(&self) -> Result<Vec<CandidateTask>, SourceError> {
        self.check_available()?;
        Ok(self
            .tasks
            .iter()
            .filter(|task| task.status.is_open())
            .cloned()
            .collect())
    }
}

impl ProfileSource for MemorySource {
    fn fetch_requester(&self, id: &RequesterId) -> Result<Requester, SourceError> {
        self.check_available()?;
        self.requesters
            .iter()
            .find(|requester| requester.id == *id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound { id: id.clone() })
    }
}
