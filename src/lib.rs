//! Facade crate for the Helpmatch task relevance engine.
//!
//! This crate re-exports the core domain types and the ranking service, and
//! exposes the HTTP oracle and snapshot adapters behind the `oracle-http`
//! feature.

#![forbid(unsafe_code)]

pub use helpmatch_core::{
    CandidateTask, DeterministicScorer, MAX_SCORE, OracleError, Priority, ProfileSource,
    RankedList, Requester, RequesterId, RequesterIdError, ScoreSource, ScoredTask, Similarity,
    SimilarityError, SimilarityOracle, SourceError, TaskId, TaskSource, TaskStatus, distance_km,
};

pub use helpmatch_ranker::{
    FallbackPolicy, RankingConfig, RankingConfigError, RankingEngine, RankingError,
    RelevantTasksError, RelevantTasksService, ScoringStrategy,
};

#[cfg(feature = "oracle-http")]
pub use helpmatch_data::oracle::{
    HttpOracle, HttpOracleConfig, OracleBuildError, SimilarityClientConfig,
    SimilarityOracleClient,
};

#[cfg(feature = "oracle-http")]
pub use helpmatch_data::{SnapshotError, SnapshotSource};
