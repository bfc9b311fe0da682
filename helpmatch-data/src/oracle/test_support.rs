//! Test utilities for similarity oracles.
//!
//! This module provides [`ScriptedOracle`], a deterministic test double for
//! [`SimilarityOracle`] that returns pre-configured answers without making
//! network requests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use helpmatch_core::{OracleError, SimilarityOracle};

/// Scripted `SimilarityOracle` for testing.
///
/// Answers are chosen by matching the task title embedded in the prompt;
/// prompts for unknown titles receive the default answer. Every prompt is
/// recorded for later inspection.
///
/// # Example
///
/// ```
/// use helpmatch_core::SimilarityOracle;
/// use helpmatch_data::oracle::test_support::ScriptedOracle;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let oracle = ScriptedOracle::answering("10").with_title_answer("Walk dogs", "90");
/// let answer = oracle.generate("Task:\nTitle: Walk dogs\nDescription: Twice daily").await;
/// assert_eq!(answer.as_deref(), Ok("90"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    default: Result<String, OracleError>,
    by_title: Vec<(String, Result<String, OracleError>)>,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedOracle {
    /// Create an oracle that answers every prompt with `text`.
    #[must_use]
    pub fn answering(text: impl Into<String>) -> Self {
        Self::with_default(Ok(text.into()))
    }

    /// Create an oracle that fails every prompt with `error`.
    #[must_use]
    pub fn failing(error: OracleError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default: Result<String, OracleError>) -> Self {
        Self {
            default,
            by_title: Vec::new(),
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer prompts about the task titled `title` with `text`.
    #[must_use]
    pub fn with_title_answer(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.by_title.push((title.into(), Ok(text.into())));
        self
    }

    /// Fail prompts about the task titled `title` with `error`.
    #[must_use]
    pub fn with_title_error(mut self, title: impl Into<String>, error: OracleError) -> Self {
        self.by_title.push((title.into(), Err(error)));
        self
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in arrival order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn answer_for(&self, prompt: &str) -> Result<String, OracleError> {
        self.by_title
            .iter()
            .find(|(title, _)| {
                prompt
                    .lines()
                    .any(|line| line.strip_prefix("Title: ") == Some(title.as_str()))
            })
            .map_or_else(|| self.default.clone(), |(_, answer)| answer.clone())
    }
}

#[async_trait]
impl SimilarityOracle for ScriptedOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer_for(prompt)
    }
}
