//! HTTP `SimilarityOracle` speaking the Gemini `generateContent` API.
//!
//! Each call posts a single user turn to
//! `{base_url}/v1beta/models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header, and returns the concatenated text of the
//! first candidate.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use helpmatch_core::SimilarityOracle;
//! use helpmatch_data::oracle::{HttpOracle, HttpOracleConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpOracleConfig::new("https://generativelanguage.googleapis.com")
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(10));
//! let oracle = HttpOracle::with_config(config)?;
//! let answer = oracle.generate("Return ONLY a number between 0 and 100.").await?;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use helpmatch_core::{OracleError, SimilarityOracle};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::gemini::{GenerateContentRequest, GenerateContentResponse};

/// Default user agent for oracle requests.
pub const DEFAULT_USER_AGENT: &str = "helpmatch-oracle/0.1";

/// Default model queried for similarity judgements.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Errors raised while constructing an [`HttpOracle`].
#[derive(Debug, Error)]
pub enum OracleBuildError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL is not an absolute HTTP(S) URL.
    #[error("invalid oracle base URL '{url}'")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
        /// Parse failure, when the URL did not parse at all.
        #[source]
        source: Option<url::ParseError>,
    },
    /// The model name was empty.
    #[error("oracle model name must not be empty")]
    EmptyModel,
}

/// Configuration for [`HttpOracle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOracleConfig {
    /// Base URL of the API, e.g. `"https://generativelanguage.googleapis.com"`.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// API key sent in the `x-goog-api-key` header, if any.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpOracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpOracleConfig {
    /// Create a configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// [`SimilarityOracle`] backed by the Gemini HTTP API.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: Client,
    config: HttpOracleConfig,
    endpoint: String,
}

impl HttpOracle {
    /// Create an oracle with default configuration at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, OracleBuildError> {
        Self::with_config(HttpOracleConfig::new(base_url))
    }

    /// Create an oracle with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, the model name is empty,
    /// or the HTTP client fails to build.
    pub fn with_config(config: HttpOracleConfig) -> Result<Self, OracleBuildError> {
        let endpoint = build_endpoint(&config.base_url, &config.model)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OracleBuildError::HttpClient)?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Fully-qualified `generateContent` URL this oracle posts to.
    #[must_use]
    pub const fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Convert a reqwest error to an `OracleError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> OracleError {
        if error.is_timeout() {
            return OracleError::Timeout {
                url: self.endpoint.clone(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OracleError::Http {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        OracleError::Network {
            url: self.endpoint.clone(),
            message: error.to_string(),
        }
    }
}

fn build_endpoint(base_url: &str, model: &str) -> Result<String, OracleBuildError> {
    let model_name = model.trim();
    if model_name.is_empty() {
        return Err(OracleBuildError::EmptyModel);
    }
    let parsed = Url::parse(base_url).map_err(|err| OracleBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source: Some(err),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(OracleBuildError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source: None,
        });
    }
    Ok(format!(
        "{}/v1beta/models/{model_name}:generateContent",
        base_url.trim_end_matches('/')
    ))
}

#[async_trait]
impl SimilarityOracle for HttpOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GenerateContentRequest::from_prompt(prompt));
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let body: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|err| OracleError::Envelope {
                    message: err.to_string(),
                })?;

        body.first_text().ok_or_else(|| {
            let reason = body
                .candidates
                .as_ref()
                .and_then(|candidates| candidates.first())
                .and_then(|candidate| candidate.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_owned());
            OracleError::Envelope {
                message: format!("response carried no text ({reason})"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoint_includes_model() {
        let oracle = HttpOracle::new("http://oracle.example.com").expect("oracle should build");

        assert_eq!(
            oracle.endpoint(),
            "http://oracle.example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[rstest]
    fn endpoint_strips_trailing_slash() {
        let config = HttpOracleConfig::new("http://oracle.example.com/").with_model("gemini-pro");
        let oracle = HttpOracle::with_config(config).expect("oracle should build");

        assert_eq!(
            oracle.endpoint(),
            "http://oracle.example.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://oracle.example.com")]
    #[case("mailto:someone@example.com")]
    fn rejects_invalid_base_urls(#[case] base_url: &str) {
        let err = HttpOracle::new(base_url).expect_err("base URL should be rejected");
        assert!(matches!(err, OracleBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    fn rejects_empty_model() {
        let config = HttpOracleConfig::new("http://oracle.example.com").with_model("  ");
        let err = HttpOracle::with_config(config).expect_err("model should be rejected");
        assert!(matches!(err, OracleBuildError::EmptyModel));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpOracleConfig::new("http://example.com")
            .with_model("gemini-pro")
            .with_api_key("key")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[rstest]
    fn defaults_match_documented_values() {
        let config = HttpOracleConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert!(config.api_key.is_none());
    }
}
