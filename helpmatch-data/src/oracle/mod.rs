//! Similarity oracle adapters.
//!
//! This module provides [`SimilarityOracleClient`], the implementation of
//! [`helpmatch_core::Similarity`] that prompts a text oracle for a 0 to 100
//! compatibility number, and [`HttpOracle`], a
//! [`helpmatch_core::SimilarityOracle`] speaking the Gemini HTTP API.
//!
//! # Architecture
//!
//! The client owns prompt construction, the per-call deadline and response
//! sanitisation. The oracle only moves text. Swapping the oracle (for a
//! different provider or a test double) leaves scoring semantics untouched.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use helpmatch_data::oracle::{
//!     HttpOracle, HttpOracleConfig, SimilarityClientConfig, SimilarityOracleClient,
//! };
//!
//! let oracle = HttpOracle::with_config(
//!     HttpOracleConfig::default().with_api_key("secret"),
//! )?;
//! let client = SimilarityOracleClient::with_config(
//!     oracle,
//!     SimilarityClientConfig::default().with_timeout(Duration::from_secs(15)),
//! );
//! # let _ = client;
//! # Ok::<(), helpmatch_data::oracle::OracleBuildError>(())
//! ```

mod client;
mod gemini;
mod http;

#[doc(hidden)]
pub mod test_support;

pub use client::{
    DEFAULT_SIMILARITY_TIMEOUT, SimilarityClientConfig, SimilarityOracleClient, build_prompt,
    extract_score,
};
pub use http::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_USER_AGENT, HttpOracle, HttpOracleConfig,
    OracleBuildError,
};
