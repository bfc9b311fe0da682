//! Read-only collaborators supplying tasks and requester profiles.

use thiserror::Error;

use crate::{CandidateTask, Requester, RequesterId};

/// Errors returned by [`TaskSource`] and [`ProfileSource`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No requester exists with the given identifier.
    #[error("requester {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: RequesterId,
    },
    /// The backing store could not be read.
    #[error("source unavailable: {message}")]
    Unavailable {
        /// Description of the underlying failure.
        message: String,
    },
}

/// Supply the pool of tasks eligible for ranking.
///
/// Only tasks whose status is [`TaskStatus::Open`](crate::TaskStatus::Open)
/// are returned. The order of the returned tasks defines the tie-break order
/// of the final ranking.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use helpmatch_core::{CandidateTask, SourceError, TaskSource};
///
/// struct Fixed(Vec<CandidateTask>);
///
/// impl TaskSource for Fixed {
///     fn fetch_open_tasks(&self) -> Result<Vec<CandidateTask>, SourceError> {
///         Ok(self.0.iter().filter(|t| t.status.is_open()).cloned().collect())
///     }
/// }
///
/// let source = Fixed(vec![CandidateTask::new("t", "Title", "", Utc::now())]);
/// assert_eq!(source.fetch_open_tasks()?.len(), 1);
/// # Ok::<(), SourceError>(())
/// ```
pub trait TaskSource: Send + Sync {
    /// Return every open task.
    fn fetch_open_tasks(&self) -> Result<Vec<CandidateTask>, SourceError>;
}

/// Look up requester profiles.
pub trait ProfileSource: Send + Sync {
    /// Return the requester with identifier `id`.
    ///
    /// Implementations return [`SourceError::NotFound`] when the identifier is
    /// unknown.
    fn fetch_requester(&self, id: &RequesterId) -> Result<Requester, SourceError>;
}

impl<T> TaskSource for &T
where
    T: TaskSource + ?Sized,
{
    fn fetch_open_tasks(&self) -> Result<Vec<CandidateTask>, SourceError> {
        (**self).fetch_open_tasks()
    }
}

impl<T> ProfileSource for &T
where
    T: ProfileSource + ?Sized,
{
    fn fetch_requester(&self, id: &RequesterId) -> Result<Requester, SourceError> {
        (**self).fetch_requester(id)
    }
}
