//! Similarity scoring boundaries.
//!
//! Two traits split the oracle concern:
//!
//! - [`SimilarityOracle`] is the raw text boundary: one prompt in, one
//!   unstructured response out. Network implementations live in
//!   `helpmatch-data`.
//! - [`Similarity`] is the narrow interface the ranking engine depends on:
//!   skills and task text in, a score in `0..=100` out.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`SimilarityOracle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The oracle did not respond before the request deadline.
    #[error("oracle request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that timed out.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The request could not be delivered.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that failed.
        url: String,
        /// Error message from the transport layer.
        message: String,
    },
    /// The oracle answered with a non-success status.
    #[error("oracle at {url} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint that responded.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error message or response excerpt.
        message: String,
    },
    /// The response envelope could not be understood.
    #[error("malformed oracle response: {message}")]
    Envelope {
        /// Description of the decoding failure.
        message: String,
    },
}

/// Errors raised while turning an oracle response into a score.
///
/// Every variant is a soft failure from the ranking engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// The underlying oracle call failed.
    #[error("similarity oracle failed")]
    Oracle(#[source] OracleError),
    /// The oracle call exceeded the client's deadline.
    #[error("similarity oracle did not answer within {timeout:?}")]
    Timeout {
        /// Deadline that elapsed.
        timeout: Duration,
    },
    /// The response contained no integer token.
    #[error("no score found in oracle response {response:?}")]
    NoScore {
        /// Raw response text.
        response: String,
    },
    /// The response contained an integer outside `0..=100`.
    #[error("oracle score {value} is outside 0..=100")]
    OutOfRange {
        /// Parsed value; saturates at `u64::MAX`.
        value: u64,
    },
}

impl From<OracleError> for SimilarityError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}

/// Raw text-generation boundary consulted for similarity judgements.
///
/// Implementations must tolerate unstructured responses; interpretation of
/// the text is left to the caller.
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use helpmatch_core::{OracleError, SimilarityOracle};
///
/// struct Echo;
///
/// #[async_trait]
/// impl SimilarityOracle for Echo {
///     async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
///         Ok(prompt.to_owned())
///     }
/// }
/// ```
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Send `prompt` and return the oracle's textual answer.
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Score the compatibility between a requester's skills and a task.
///
/// Implementations return an integer in `0..=100` or a
/// [`SimilarityError`]. Callers treat errors as soft failures.
///
/// # Examples
/// ```
/// use async_trait::async_trait;
/// use helpmatch_core::{Similarity, SimilarityError};
///
/// struct SharedWords;
///
/// #[async_trait]
/// impl Similarity for SharedWords {
///     async fn similarity(
///         &self,
///         skills: &[String],
///         title: &str,
///         _description: &str,
///     ) -> Result<u8, SimilarityError> {
///         let hit = skills.iter().any(|skill| title.contains(skill.as_str()));
///         Ok(if hit { 100 } else { 0 })
///     }
/// }
/// ```
#[async_trait]
pub trait Similarity: Send + Sync {
    /// Return a score in `0..=100` for the given skills and task text.
    async fn similarity(
        &self,
        skills: &[String],
        title: &str,
        description: &str,
    ) -> Result<u8, SimilarityError>;
}

#[async_trait]
impl<T> Similarity for &T
where
    T: Similarity + ?Sized,
{
    async fn similarity(
        &self,
        skills: &[String],
        title: &str,
        description: &str,
    ) -> Result<u8, SimilarityError> {
        (**self).similarity(skills, title, description).await
    }
}

#[async_trait]
impl<T> Similarity for std::sync::Arc<T>
where
    T: Similarity + ?Sized,
{
    async fn similarity(
        &self,
        skills: &[String],
        title: &str,
        description: &str,
    ) -> Result<u8, SimilarityError> {
        (**self).similarity(skills, title, description).await
    }
}
