//! Score a pool of tasks for one requester and order them best-first.
//!
//! Each task moves through `Pending -> Scoring -> Scored`. Oracle calls run
//! concurrently, bounded by [`RankingConfig::max_in_flight`], and results are
//! collected in input order so the final stable sort keeps ties in the order
//! the tasks were supplied.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use helpmatch_core::{
    CandidateTask, DeterministicScorer, RankedList, Requester, ScoreSource, ScoredTask, Similarity,
    SimilarityError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Default bound on concurrent oracle calls.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// How each task obtains its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Ask the similarity oracle.
    #[default]
    Oracle,
    /// Use the rule-based [`DeterministicScorer`]; the oracle is never called.
    Deterministic,
}

/// Score recorded when the oracle fails for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Record 0, marked [`ScoreSource::OracleUnavailable`].
    #[default]
    Zero,
    /// Substitute the deterministic score, marked
    /// [`ScoreSource::Deterministic`].
    ///
    /// This changes the ranking a caller observes when the oracle is down and
    /// must be opted into.
    Deterministic,
}

/// Error returned when parsing an unknown strategy or fallback label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct ParsePolicyError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ScoringStrategy {
    /// Label used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Deterministic => "deterministic",
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringStrategy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(Self::Oracle),
            "deterministic" => Ok(Self::Deterministic),
            _ => Err(ParsePolicyError {
                kind: "scoring strategy",
                value: s.to_owned(),
                expected: "oracle, deterministic",
            }),
        }
    }
}

impl FallbackPolicy {
    /// Label used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Deterministic => "deterministic",
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "deterministic" => Ok(Self::Deterministic),
            _ => Err(ParsePolicyError {
                kind: "fallback policy",
                value: s.to_owned(),
                expected: "zero, deterministic",
            }),
        }
    }
}

/// Errors returned by [`RankingConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RankingConfigError {
    /// `max_in_flight` was zero, which would never schedule a call.
    #[error("max_in_flight must be at least 1")]
    ZeroMaxInFlight,
}

/// Configuration for [`RankingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    /// How tasks are scored.
    pub strategy: ScoringStrategy,
    /// What to record when the oracle fails.
    pub fallback: FallbackPolicy,
    /// Upper bound on concurrent oracle calls.
    pub max_in_flight: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::default(),
            fallback: FallbackPolicy::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl RankingConfig {
    /// Set the scoring strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: ScoringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the fallback policy.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the concurrency bound.
    #[must_use]
    pub const fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`RankingConfigError::ZeroMaxInFlight`] when `max_in_flight`
    /// is zero.
    pub const fn validate(&self) -> Result<(), RankingConfigError> {
        if self.max_in_flight == 0 {
            return Err(RankingConfigError::ZeroMaxInFlight);
        }
        Ok(())
    }
}

/// Errors returned by [`RankingEngine::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RankingError {
    /// The caller cancelled the request before every task was scored.
    #[error("ranking was cancelled")]
    Cancelled,
}

/// Ranks candidate tasks for a requester.
///
/// The engine is generic over the [`Similarity`] implementation so the
/// oracle can be swapped without touching ranking semantics.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use chrono::Utc;
/// use helpmatch_core::{CandidateTask, Requester, RequesterId, Similarity, SimilarityError};
/// use helpmatch_ranker::{RankingConfig, RankingEngine};
/// use tokio_util::sync::CancellationToken;
///
/// struct TitleLength;
///
/// #[async_trait]
/// impl Similarity for TitleLength {
///     async fn similarity(
///         &self,
///         _skills: &[String],
///         title: &str,
///         _description: &str,
///     ) -> Result<u8, SimilarityError> {
///         Ok(u8::try_from(title.len()).unwrap_or(100))
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let engine = RankingEngine::new(TitleLength, RankingConfig::default()).unwrap();
/// let requester = Requester::new(RequesterId::new("vol").unwrap());
/// let now = Utc::now();
/// let tasks = vec![
///     CandidateTask::new("a", "Cook", "", now),
///     CandidateTask::new("b", "Deliver groceries", "", now),
/// ];
///
/// let ranked = engine.rank(&requester, tasks, &CancellationToken::new()).await.unwrap();
/// assert_eq!(ranked.as_slice()[0].task().id.as_str(), "b");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RankingEngine<S> {
    similarity: S,
    config: RankingConfig,
}

impl<S> RankingEngine<S>
where
    S: Similarity,
{
    /// Create an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RankingConfigError`] when the configuration is invalid.
    pub fn new(similarity: S, config: RankingConfig) -> Result<Self, RankingConfigError> {
        config.validate()?;
        Ok(Self { similarity, config })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> RankingConfig {
        self.config
    }

    /// Rank `tasks` for `requester` using the current time for urgency.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::Cancelled`] if `cancel` fires before scoring
    /// completes; no partial list is returned.
    pub async fn rank(
        &self,
        requester: &Requester,
        tasks: Vec<CandidateTask>,
        cancel: &CancellationToken,
    ) -> Result<RankedList, RankingError> {
        self.rank_at(Utc::now(), requester, tasks, cancel).await
    }

    /// Rank `tasks` for `requester` relative to the instant `now`.
    ///
    /// Scoring failures never abort the batch: every input task appears in
    /// the output exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`RankingError::Cancelled`] if `cancel` fires before scoring
    /// completes. In-flight oracle calls are dropped.
    pub async fn rank_at(
        &self,
        now: DateTime<Utc>,
        requester: &Requester,
        tasks: Vec<CandidateTask>,
        cancel: &CancellationToken,
    ) -> Result<RankedList, RankingError> {
        let total = tasks.len();
        let skills = requester.skill_list();
        let scoring = stream::iter(tasks)
            .map(|task| self.score_one(now, requester, &skills, task))
            .buffered(self.config.max_in_flight)
            .collect::<Vec<_>>();

        let scored = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::debug!("ranking for requester {} cancelled", requester.id);
                return Err(RankingError::Cancelled);
            }
            scored = scoring => scored,
        };

        let unavailable = scored
            .iter()
            .filter(|entry| entry.source() != ScoreSource::Oracle)
            .count();
        if self.config.strategy == ScoringStrategy::Oracle && unavailable > 0 {
            log::info!(
                "oracle unavailable for {unavailable} of {total} tasks for requester {}",
                requester.id
            );
        }
        log::debug!("ranked {total} tasks for requester {}", requester.id);
        Ok(RankedList::from_scored(scored))
    }

    async fn score_one(
        &self,
        now: DateTime<Utc>,
        requester: &Requester,
        skills: &[String],
        task: CandidateTask,
    ) -> ScoredTask {
        if self.config.strategy == ScoringStrategy::Deterministic {
            let score = DeterministicScorer.score_task(requester, &task, now);
            return ScoredTask::new(task, score, ScoreSource::Deterministic);
        }

        match self
            .similarity
            .similarity(skills, &task.title, &task.description)
            .await
        {
            Ok(score) => ScoredTask::new(task, score, ScoreSource::Oracle),
            Err(err) => {
                log::warn!(
                    "similarity for task {} unavailable: {}",
                    task.id,
                    describe(&err)
                );
                self.fallback(now, requester, task)
            }
        }
    }

    fn fallback(&self, now: DateTime<Utc>, requester: &Requester, task: CandidateTask) -> ScoredTask {
        match self.config.fallback {
            FallbackPolicy::Zero => ScoredTask::new(task, 0, ScoreSource::OracleUnavailable),
            FallbackPolicy::Deterministic => {
                let score = DeterministicScorer.score_task(requester, &task, now);
                ScoredTask::new(task, score, ScoreSource::Deterministic)
            }
        }
    }
}

/// Render an error with its source chain on one line.
fn describe(err: &SimilarityError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
