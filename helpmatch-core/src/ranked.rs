//! Ranking output: scored tasks and the ordered list handed to callers.
//!
//! A [`RankedList`] is always sorted by score, highest first, and keeps the
//! input order of tasks that share a score. Both types are transient and
//! built fresh for every ranking request.

use crate::CandidateTask;

/// Highest score any task can receive.
pub const MAX_SCORE: u8 = 100;

/// Where a task's score came from.
///
/// `OracleUnavailable` marks tasks whose zero score is a fallback rather
/// than a judgement by the similarity oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ScoreSource {
    /// The similarity oracle produced the score.
    Oracle,
    /// The oracle failed; the score is the configured fallback.
    OracleUnavailable,
    /// The deterministic scorer produced the score.
    Deterministic,
}

/// A task paired with its score in `0..=100`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use helpmatch_core::{CandidateTask, ScoreSource, ScoredTask};
///
/// let task = CandidateTask::new("t-1", "Title", "Description", Utc::now());
/// let scored = ScoredTask::new(task, 250, ScoreSource::Oracle);
/// assert_eq!(scored.score(), 100);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScoredTask {
    task: CandidateTask,
    score: u8,
    source: ScoreSource,
}

impl ScoredTask {
    /// Pair a task with a score, clamping the score to [`MAX_SCORE`].
    #[must_use]
    pub fn new(task: CandidateTask, score: u8, source: ScoreSource) -> Self {
        Self {
            task,
            score: score.min(MAX_SCORE),
            source,
        }
    }

    /// The scored task.
    #[must_use]
    pub const fn task(&self) -> &CandidateTask {
        &self.task
    }

    /// Score in `0..=100`.
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.score
    }

    /// Provenance of the score.
    #[must_use]
    pub const fn source(&self) -> ScoreSource {
        self.source
    }

    /// Consume the pairing and return the task.
    #[must_use]
    pub fn into_task(self) -> CandidateTask {
        self.task
    }
}

/// Scored tasks ordered best-first.
///
/// Serialises as a plain JSON array of `{ task, score, source }` objects.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use helpmatch_core::{CandidateTask, RankedList, ScoreSource, ScoredTask};
///
/// let now = Utc::now();
/// let list = RankedList::from_scored(vec![
///     ScoredTask::new(CandidateTask::new("a", "A", "", now), 10, ScoreSource::Oracle),
///     ScoredTask::new(CandidateTask::new("b", "B", "", now), 90, ScoreSource::Oracle),
///     ScoredTask::new(CandidateTask::new("c", "C", "", now), 10, ScoreSource::Oracle),
/// ]);
/// let ids: Vec<_> = list.iter().map(|s| s.task().id.as_str()).collect();
/// assert_eq!(ids, ["b", "a", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct RankedList {
    entries: Vec<ScoredTask>,
}

impl RankedList {
    /// Order scored tasks by descending score.
    ///
    /// The sort is stable: tasks with equal scores keep the order in which
    /// they were supplied.
    #[must_use]
    pub fn from_scored(mut entries: Vec<ScoredTask>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }

    /// Iterate over the entries, best first.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredTask> {
        self.entries.iter()
    }

    /// Borrow the entries as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[ScoredTask] {
        self.entries.as_slice()
    }

    /// Number of ranked tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the list and return the ordered entries.
    #[must_use]
    pub fn into_inner(self) -> Vec<ScoredTask> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a ScoredTask;
    type IntoIter = std::slice::Iter<'a, ScoredTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for RankedList {
    type Item = ScoredTask;
    type IntoIter = std::vec::IntoIter<ScoredTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
