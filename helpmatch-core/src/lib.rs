//! Core domain types for the Helpmatch task relevance engine.
//!
//! The crate defines what gets ranked and how scores are produced, without
//! committing to any transport or storage:
//! - [`Requester`] and [`CandidateTask`] are read-only snapshots supplied by a
//!   [`ProfileSource`] and a [`TaskSource`].
//! - [`DeterministicScorer`] computes a rule-based score from skill overlap,
//!   distance, deadline urgency and priority.
//! - [`Similarity`] and [`SimilarityOracle`] are the seams through which an
//!   external semantic-similarity oracle is consulted.
//! - [`ScoredTask`] and [`RankedList`] carry the ranking result.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, Utc};
//! use helpmatch_core::{CandidateTask, DeterministicScorer, Priority, Requester, RequesterId};
//!
//! # fn main() -> Result<(), helpmatch_core::RequesterIdError> {
//! let now = Utc::now();
//! let requester = Requester::new(RequesterId::new("vol-1")?).with_skills(["cooking"]);
//! let task = CandidateTask::new("t-1", "Soup kitchen", "Help cook", now + Duration::days(5))
//!     .with_skills(["cooking"])
//!     .with_priority(Priority::Low);
//!
//! // 40 for skills, 8 for the deadline, 5 for priority; no location is known.
//! assert_eq!(DeterministicScorer.score_task(&requester, &task, now), 53);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod location;
mod ranked;
mod requester;
mod scorer;
mod similarity;
mod source;
mod task;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use location::{distance_km, lat_lon};
pub use ranked::{MAX_SCORE, RankedList, ScoreSource, ScoredTask};
pub use requester::{MAX_REQUESTER_ID_LEN, Requester, RequesterId, RequesterIdError};
pub use scorer::DeterministicScorer;
pub use similarity::{OracleError, Similarity, SimilarityError, SimilarityOracle};
pub use source::{ProfileSource, SourceError, TaskSource};
pub use task::{CandidateTask, ParseLabelError, Priority, TaskId, TaskStatus};
