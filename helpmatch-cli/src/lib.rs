//! Command-line interface for the Helpmatch ranking engine.
//!
//! `helpmatch rank <requester-id>` loads a JSON snapshot of requesters and
//! open tasks, scores every task for the requester, and prints the ranked
//! list as JSON. Options layer from configuration files, `HELPMATCH_*`
//! environment variables, and flags.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod rank;

pub use error::CliError;

use rank::RankArgs;

const ARG_REQUESTER_ID: &str = "requester-id";
const ARG_SNAPSHOT: &str = "snapshot";
const ARG_STRATEGY: &str = "strategy";
const ARG_FALLBACK: &str = "fallback";
const ARG_MAX_IN_FLIGHT: &str = "max-in-flight";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_ORACLE_BASE_URL: &str = "oracle-base-url";
const ARG_ORACLE_MODEL: &str = "oracle-model";
const ARG_ORACLE_API_KEY: &str = "oracle-api-key";
const ENV_REQUESTER_ID: &str = "HELPMATCH_CMDS_RANK_REQUESTER_ID";
/// Consulted when no oracle API key is configured.
const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Default snapshot path, relative to the working directory.
const DEFAULT_SNAPSHOT: &str = "snapshot.json";

/// Run the Helpmatch CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid, inputs cannot be loaded,
/// or ranking fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Rank(args) => rank::run_rank(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "helpmatch",
    about = "Rank open volunteer tasks by relevance to a requester",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the open tasks in a snapshot for one requester.
    Rank(RankArgs),
}

#[cfg(test)]
mod tests;
