//! The `relevant-tasks-for` entry point.
//!
//! [`RelevantTasksService`] validates the requester id, loads the requester
//! and the open tasks from their sources, and hands both to the
//! [`RankingEngine`]. The caller receives either a complete ranked list or an
//! explicit error.

use helpmatch_core::{
    ProfileSource, RankedList, RequesterId, RequesterIdError, Similarity, SourceError, TaskSource,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{RankingEngine, RankingError};

/// Errors returned by [`RelevantTasksService::relevant_tasks_for`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelevantTasksError {
    /// The requester id was malformed; no source was consulted.
    #[error("invalid requester id")]
    InvalidRequesterId(#[from] RequesterIdError),
    /// No requester exists with the given id.
    #[error("requester {id} not found")]
    RequesterNotFound {
        /// Identifier that was looked up.
        id: RequesterId,
    },
    /// The profile source failed.
    #[error("failed to load requester profile")]
    ProfileSource(#[source] SourceError),
    /// The task source failed.
    #[error("failed to load open tasks")]
    TaskSource(#[source] SourceError),
    /// The caller cancelled the request.
    #[error("request was cancelled")]
    Cancelled,
}

impl From<RankingError> for RelevantTasksError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::Cancelled => Self::Cancelled,
        }
    }
}

/// Ranks a requester's open tasks from pluggable sources.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use helpmatch_core::test_support::MemorySource;
/// use helpmatch_core::{CandidateTask, Requester, RequesterId};
/// use helpmatch_ranker::test_support::StubSimilarity;
/// use helpmatch_ranker::{RankingConfig, RankingEngine, RelevantTasksService};
/// use tokio_util::sync::CancellationToken;
///
/// let now = Utc::now();
/// let source = MemorySource::new()
///     .with_requester(Requester::new(RequesterId::new("vol-1").unwrap()))
///     .with_tasks([
///         CandidateTask::new("a", "Walk dogs", "", now),
///         CandidateTask::new("b", "Cook", "", now),
///     ]);
/// let similarity = StubSimilarity::scoring(10).with_title_score("Cook", 90);
/// let engine = RankingEngine::new(similarity, RankingConfig::default()).unwrap();
/// let service = RelevantTasksService::new(source.clone(), source, engine);
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let ranked = service
///     .relevant_tasks_for("vol-1", &CancellationToken::new())
///     .await
///     .unwrap();
/// assert_eq!(ranked.as_slice()[0].task().id.as_str(), "b");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RelevantTasksService<P, T, S> {
    profiles: P,
    tasks: T,
    engine: RankingEngine<S>,
}

impl<P, T, S> RelevantTasksService<P, T, S>
where
    P: ProfileSource,
    T: TaskSource,
    S: Similarity,
{
    /// Assemble a service from its collaborators.
    #[must_use]
    pub const fn new(profiles: P, tasks: T, engine: RankingEngine<S>) -> Self {
        Self {
            profiles,
            tasks,
            engine,
        }
    }

    /// Borrow the ranking engine.
    #[must_use]
    pub const fn engine(&self) -> &RankingEngine<S> {
        &self.engine
    }

    /// Rank the open tasks for the requester identified by `requester_id`.
    ///
    /// # Errors
    ///
    /// - [`RelevantTasksError::InvalidRequesterId`] before any source call
    ///   when the id is malformed.
    /// - [`RelevantTasksError::RequesterNotFound`] when the id is unknown.
    /// - [`RelevantTasksError::ProfileSource`] or
    ///   [`RelevantTasksError::TaskSource`] when a source fails.
    /// - [`RelevantTasksError::Cancelled`] when `cancel` fires.
    pub async fn relevant_tasks_for(
        &self,
        requester_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RankedList, RelevantTasksError> {
        let id = RequesterId::new(requester_id)?;
        if cancel.is_cancelled() {
            return Err(RelevantTasksError::Cancelled);
        }

        let requester = self.profiles.fetch_requester(&id).map_err(|err| match err {
            SourceError::NotFound { id: missing } => {
                RelevantTasksError::RequesterNotFound { id: missing }
            }
            other @ SourceError::Unavailable { .. } => RelevantTasksError::ProfileSource(other),
        })?;
        let tasks = self
            .tasks
            .fetch_open_tasks()
            .map_err(RelevantTasksError::TaskSource)?;
        log::debug!("ranking {} open tasks for requester {id}", tasks.len());

        Ok(self.engine.rank(&requester, tasks, cancel).await?)
    }
}
