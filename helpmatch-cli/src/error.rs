//! Error types emitted by the Helpmatch CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use helpmatch_core::RequesterIdError;
use helpmatch_data::SnapshotError;
use helpmatch_data::oracle::OracleBuildError;
use helpmatch_ranker::{RankingConfigError, RelevantTasksError};
use thiserror::Error;

/// Errors emitted by the Helpmatch CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag or positional name.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// The requester id is malformed; nothing was loaded.
    #[error("invalid requester id: {0}")]
    InvalidRequesterId(#[from] RequesterIdError),
    /// The merged ranking options are inconsistent.
    #[error("invalid ranking options: {0}")]
    InvalidRankingConfig(#[from] RankingConfigError),
    /// Loading the task snapshot failed.
    #[error(transparent)]
    LoadSnapshot(#[from] SnapshotError),
    /// Constructing the HTTP oracle failed.
    #[error("failed to build similarity oracle for {base_url:?}: {source}")]
    BuildOracle {
        /// Configured oracle base URL.
        base_url: String,
        /// Underlying construction error.
        #[source]
        source: OracleBuildError,
    },
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Ranking the requester's tasks failed.
    #[error("ranking failed: {0}")]
    Rank(#[from] RelevantTasksError),
    /// Serialising the ranked list failed.
    #[error("failed to serialise ranked tasks: {0}")]
    SerialiseRanking(#[source] serde_json::Error),
    /// Writing the ranked list failed.
    #[error("failed to write ranked tasks: {0}")]
    WriteOutput(#[source] std::io::Error),
}
