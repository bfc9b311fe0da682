//! Test utilities for ranking.
//!
//! [`StubSimilarity`] returns scripted scores per task title, optionally after
//! a delay, and records how many calls were in flight at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use helpmatch_core::{Similarity, SimilarityError};

/// Scripted [`Similarity`] implementation.
///
/// Clones share their call counters, so a clone handed to an engine can be
/// inspected through the original.
#[derive(Debug, Clone)]
pub struct StubSimilarity {
    default: Result<u8, SimilarityError>,
    by_title: Vec<(String, Result<u8, SimilarityError>)>,
    delay: Option<Duration>,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubSimilarity {
    /// Score every task `score`.
    #[must_use]
    pub fn scoring(score: u8) -> Self {
        Self::with_default(Ok(score))
    }

    /// Fail every task with `error`.
    #[must_use]
    pub fn failing(error: SimilarityError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default: Result<u8, SimilarityError>) -> Self {
        Self {
            default,
            by_title: Vec::new(),
            delay: None,
            counters: Arc::default(),
        }
    }

    /// Score the task titled `title` with `score`.
    #[must_use]
    pub fn with_title_score(mut self, title: impl Into<String>, score: u8) -> Self {
        self.by_title.push((title.into(), Ok(score)));
        self
    }

    /// Fail the task titled `title` with `error`.
    #[must_use]
    pub fn with_title_error(mut self, title: impl Into<String>, error: SimilarityError) -> Self {
        self.by_title.push((title.into(), Err(error)));
        self
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls started so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    /// Largest number of calls observed running at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::SeqCst)
    }

    fn result_for(&self, title: &str) -> Result<u8, SimilarityError> {
        self.by_title
            .iter()
            .find(|(candidate, _)| candidate == title)
            .map_or_else(|| self.default.clone(), |(_, result)| result.clone())
    }
}

/// Decrements the in-flight counter when a call finishes or is dropped.
struct InFlight<'a>(&'a Counters);

impl<'a> InFlight<'a> {
    fn enter(counters: &'a Counters) -> Self {
        counters.calls.fetch_add(1, Ordering::SeqCst);
        let now = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Similarity for StubSimilarity {
    async fn similarity(
        &self,
        _skills: &[String],
        title: &str,
        _description: &str,
    ) -> Result<u8, SimilarityError> {
        let _guard = InFlight::enter(&self.counters);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result_for(title)
    }
}
