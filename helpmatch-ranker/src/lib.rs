//! Relevance ranking for Helpmatch tasks.
//!
//! [`RankingEngine`] scores every candidate task for a requester, either by
//! asking a [`helpmatch_core::Similarity`] oracle (with bounded concurrency and
//! soft failures) or with the [`helpmatch_core::DeterministicScorer`], and
//! returns a best-first [`helpmatch_core::RankedList`].
//! [`RelevantTasksService`] wires the engine to task and profile sources and
//! exposes the `relevant-tasks-for` operation.
//!
//! Cancellation is cooperative: pass a
//! [`tokio_util::sync::CancellationToken`] and the engine returns
//! [`RankingError::Cancelled`] instead of a partial list.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod engine;
mod service;

#[doc(hidden)]
pub mod test_support;

pub use engine::{
    DEFAULT_MAX_IN_FLIGHT, FallbackPolicy, ParsePolicyError, RankingConfig, RankingConfigError,
    RankingEngine, RankingError, ScoringStrategy,
};
pub use service::{RelevantTasksError, RelevantTasksService};
