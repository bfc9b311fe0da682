//! Rank command implementation for the Helpmatch CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use helpmatch_core::{RankedList, RequesterId, Similarity};
use helpmatch_data::SnapshotSource;
use helpmatch_data::oracle::{
    DEFAULT_SIMILARITY_TIMEOUT, HttpOracle, HttpOracleConfig, SimilarityClientConfig,
    SimilarityOracleClient,
};
use helpmatch_ranker::{
    DEFAULT_MAX_IN_FLIGHT, FallbackPolicy, RankingConfig, RankingEngine, RelevantTasksService,
    ScoringStrategy,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    ARG_FALLBACK, ARG_MAX_IN_FLIGHT, ARG_ORACLE_API_KEY, ARG_ORACLE_BASE_URL, ARG_ORACLE_MODEL,
    ARG_REQUESTER_ID, ARG_SNAPSHOT, ARG_STRATEGY, ARG_TIMEOUT_SECS, CliError, DEFAULT_SNAPSHOT,
    ENV_GEMINI_API_KEY, ENV_REQUESTER_ID,
};

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the open tasks in a JSON snapshot for one requester. \
                 Each task is scored by the similarity oracle, or by the \
                 deterministic rule set, and the list is printed best first.",
    about = "Rank open tasks for a requester"
)]
#[ortho_config(prefix = "HELPMATCH")]
pub(crate) struct RankArgs {
    /// Identifier of the requester to rank tasks for.
    #[arg(value_name = ARG_REQUESTER_ID)]
    #[serde(default)]
    pub(crate) requester_id: Option<String>,
    /// Path to the snapshot JSON document (default `snapshot.json`).
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Scoring strategy: `oracle` or `deterministic`.
    #[arg(long = ARG_STRATEGY, value_name = "strategy")]
    #[serde(default)]
    pub(crate) strategy: Option<ScoringStrategy>,
    /// Score for tasks the oracle cannot rate: `zero` or `deterministic`.
    #[arg(long = ARG_FALLBACK, value_name = "policy")]
    #[serde(default)]
    pub(crate) fallback: Option<FallbackPolicy>,
    /// Maximum concurrent oracle calls.
    #[arg(long = ARG_MAX_IN_FLIGHT, value_name = "count")]
    #[serde(default)]
    pub(crate) max_in_flight: Option<usize>,
    /// Per-call oracle deadline in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Base URL of the Gemini-compatible oracle API.
    #[arg(long = ARG_ORACLE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) oracle_base_url: Option<String>,
    /// Oracle model identifier.
    #[arg(long = ARG_ORACLE_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) oracle_model: Option<String>,
    /// Oracle API key.
    #[arg(long = ARG_ORACLE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) oracle_api_key: Option<String>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RankConfig {
    /// Validated requester identifier.
    pub(crate) requester_id: RequesterId,
    /// Snapshot document to load.
    pub(crate) snapshot: Utf8PathBuf,
    /// Engine options.
    pub(crate) ranking: RankingConfig,
    /// HTTP oracle options.
    pub(crate) oracle: HttpOracleConfig,
    /// Similarity client options.
    pub(crate) similarity: SimilarityClientConfig,
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let raw_requester_id = args.requester_id.ok_or(CliError::MissingArgument {
            field: ARG_REQUESTER_ID,
            env: ENV_REQUESTER_ID,
        })?;
        let requester_id = RequesterId::new(raw_requester_id)?;
        let snapshot = args
            .snapshot
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SNAPSHOT));

        let ranking = RankingConfig::default()
            .with_strategy(args.strategy.unwrap_or_default())
            .with_fallback(args.fallback.unwrap_or_default())
            .with_max_in_flight(args.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT));
        ranking.validate()?;

        let timeout = args
            .timeout_secs
            .map_or(DEFAULT_SIMILARITY_TIMEOUT, Duration::from_secs);
        let defaults = HttpOracleConfig::default();
        let mut oracle = HttpOracleConfig::new(args.oracle_base_url.unwrap_or(defaults.base_url))
            .with_model(args.oracle_model.unwrap_or(defaults.model))
            .with_timeout(timeout);
        if let Some(api_key) = args.oracle_api_key {
            oracle = oracle.with_api_key(api_key);
        }

        Ok(Self {
            requester_id,
            snapshot,
            ranking,
            oracle,
            similarity: SimilarityClientConfig::default().with_timeout(timeout),
        })
    }
}

/// Builds the similarity scorer for the current rank invocation.
pub(super) trait SimilarityBuilder {
    fn build(&self, config: &RankConfig) -> Result<Arc<dyn Similarity>, CliError>;
}

pub(super) struct DefaultSimilarityBuilder;

impl SimilarityBuilder for DefaultSimilarityBuilder {
    fn build(&self, config: &RankConfig) -> Result<Arc<dyn Similarity>, CliError> {
        let mut oracle_config = config.oracle.clone();
        if oracle_config.api_key.is_none()
            && let Ok(api_key) = std::env::var(ENV_GEMINI_API_KEY)
        {
            oracle_config = oracle_config.with_api_key(api_key);
        }
        let oracle = HttpOracle::with_config(oracle_config).map_err(|source| {
            CliError::BuildOracle {
                base_url: config.oracle.base_url.clone(),
                source,
            }
        })?;
        log::debug!("similarity oracle endpoint {}", oracle.endpoint());
        Ok(Arc::new(SimilarityOracleClient::with_config(
            oracle,
            config.similarity,
        )))
    }
}

pub(super) fn run_rank(args: RankArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSimilarityBuilder;
    run_rank_with(args, &builder, &mut stdout)
}

pub(super) fn run_rank_with(
    args: RankArgs,
    builder: &dyn SimilarityBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let ranked = execute_rank(args, builder)?;
    write_ranked(writer, &ranked)
}

fn execute_rank(args: RankArgs, builder: &dyn SimilarityBuilder) -> Result<RankedList, CliError> {
    let config = args.into_config()?;
    let snapshot = SnapshotSource::load(&config.snapshot)?;
    log::debug!(
        "loaded {} tasks from snapshot {}",
        snapshot.task_count(),
        config.snapshot
    );
    let similarity = builder.build(&config)?;
    let engine = RankingEngine::new(similarity, config.ranking)?;
    let service = RelevantTasksService::new(&snapshot, &snapshot, engine);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let ranked = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupt received; cancelling ranking");
                trigger.cancel();
            }
        });
        service
            .relevant_tasks_for(config.requester_id.as_str(), &cancel)
            .await
    })?;
    Ok(ranked)
}

fn write_ranked(writer: &mut dyn Write, ranked: &RankedList) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(ranked).map_err(CliError::SerialiseRanking)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RankConfig, CliError> {
    let merged = RankArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RankConfig::try_from(merged)
}
