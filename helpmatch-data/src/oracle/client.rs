//! Turn a raw text oracle into a bounded, sanitised similarity scorer.

use std::time::Duration;

use async_trait::async_trait;
use helpmatch_core::{MAX_SCORE, Similarity, SimilarityError, SimilarityOracle};

/// Default deadline for a single similarity judgement.
pub const DEFAULT_SIMILARITY_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for [`SimilarityOracleClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityClientConfig {
    /// Deadline for one oracle call, measured by the client itself.
    pub timeout: Duration,
}

impl Default for SimilarityClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SIMILARITY_TIMEOUT,
        }
    }
}

impl SimilarityClientConfig {
    /// Set the per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`Similarity`] implementation that prompts a [`SimilarityOracle`].
///
/// Every call sends exactly one prompt, bounded by the configured timeout,
/// and reads the first integer in the answer. Answers without an integer or
/// with a value above 100 are reported as errors; there are no retries.
///
/// # Examples
///
/// ```
/// use helpmatch_core::Similarity;
/// use helpmatch_data::oracle::{SimilarityOracleClient, test_support::ScriptedOracle};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let client = SimilarityOracleClient::new(ScriptedOracle::answering("87 is the match"));
/// let score = client
///     .similarity(&["cooking".to_owned()], "Soup kitchen", "Help cook")
///     .await;
/// assert_eq!(score, Ok(87));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityOracleClient<O> {
    oracle: O,
    config: SimilarityClientConfig,
}

impl<O> SimilarityOracleClient<O> {
    /// Wrap `oracle` with the default configuration.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, SimilarityClientConfig::default())
    }

    /// Wrap `oracle` with an explicit configuration.
    #[must_use]
    pub const fn with_config(oracle: O, config: SimilarityClientConfig) -> Self {
        Self { oracle, config }
    }

    /// Borrow the wrapped oracle.
    #[must_use]
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> SimilarityClientConfig {
        self.config
    }
}

#[async_trait]
impl<O> Similarity for SimilarityOracleClient<O>
where
    O: SimilarityOracle,
{
    async fn similarity(
        &self,
        skills: &[String],
        title: &str,
        description: &str,
    ) -> Result<u8, SimilarityError> {
        let prompt = build_prompt(skills, title, description);
        let response = tokio::time::timeout(self.config.timeout, self.oracle.generate(&prompt))
            .await
            .map_err(|_| SimilarityError::Timeout {
                timeout: self.config.timeout,
            })??;
        extract_score(&response)
    }
}

/// Build the similarity prompt for a requester's skills and a task.
///
/// # Examples
///
/// ```
/// use helpmatch_data::oracle::build_prompt;
///
/// let prompt = build_prompt(&["a".to_owned(), "b".to_owned()], "T", "D");
/// assert!(prompt.starts_with("User skills:\na, b\n"));
/// assert!(prompt.ends_with("Return ONLY a number between 0 and 100."));
/// ```
#[must_use]
pub fn build_prompt(skills: &[String], title: &str, description: &str) -> String {
    format!(
        "User skills:\n{}\n\nTask:\nTitle: {title}\nDescription: {description}\n\n\
         Return ONLY a number between 0 and 100.",
        skills.join(", ")
    )
}

/// Read the first run of ASCII digits in `response` as a score.
///
/// Signs and decimal points are not interpreted: `"-5"` reads as 5 and
/// `"87.5"` as 87.
///
/// # Errors
///
/// Returns [`SimilarityError::NoScore`] when the response has no digits and
/// [`SimilarityError::OutOfRange`] when the number exceeds 100.
///
/// # Examples
///
/// ```
/// use helpmatch_core::SimilarityError;
/// use helpmatch_data::oracle::extract_score;
///
/// assert_eq!(extract_score("Score: 42/100"), Ok(42));
/// assert_eq!(extract_score("150"), Err(SimilarityError::OutOfRange { value: 150 }));
/// ```
pub fn extract_score(response: &str) -> Result<u8, SimilarityError> {
    let trimmed = response.trim();
    let digits: String = trimmed
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return Err(SimilarityError::NoScore {
            response: trimmed.to_owned(),
        });
    }
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    u8::try_from(value)
        .ok()
        .filter(|score| *score <= MAX_SCORE)
        .ok_or(SimilarityError::OutOfRange { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::test_support::ScriptedOracle;
    use helpmatch_core::OracleError;
    use rstest::rstest;

    fn skills(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| (*label).to_owned()).collect()
    }

    #[rstest]
    fn prompt_lists_skills_and_task() {
        let prompt = build_prompt(&skills(&["first aid", "driving"]), "Lift", "Drive to clinic");
        assert_eq!(
            prompt,
            "User skills:\nfirst aid, driving\n\nTask:\nTitle: Lift\nDescription: Drive to clinic\n\n\
             Return ONLY a number between 0 and 100."
        );
    }

    #[rstest]
    fn prompt_with_no_skills_has_empty_line() {
        let prompt = build_prompt(&[], "T", "D");
        assert!(prompt.starts_with("User skills:\n\n\nTask:"));
    }

    #[rstest]
    #[case("87", 87)]
    #[case("  87\n", 87)]
    #[case("87 is the match", 87)]
    #[case("I'd say 65.", 65)]
    #[case("87.5", 87)]
    #[case("-5", 5)]
    #[case("0", 0)]
    #[case("100", 100)]
    #[case("007", 7)]
    fn extracts_first_integer(#[case] response: &str, #[case] expected: u8) {
        assert_eq!(extract_score(response), Ok(expected));
    }

    #[rstest]
    #[case("I cannot determine a score")]
    #[case("")]
    #[case("   ")]
    fn reports_missing_score(#[case] response: &str) {
        assert!(matches!(
            extract_score(response),
            Err(SimilarityError::NoScore { .. })
        ));
    }

    #[rstest]
    #[case("150", 150)]
    #[case("101", 101)]
    #[case("99999999999999999999999", u64::MAX)]
    fn reports_out_of_range(#[case] response: &str, #[case] value: u64) {
        assert_eq!(
            extract_score(response),
            Err(SimilarityError::OutOfRange { value })
        );
    }

    #[tokio::test]
    async fn client_sends_one_prompt_per_call() {
        let oracle = ScriptedOracle::answering("55");
        let client = SimilarityOracleClient::new(oracle);

        let score = client
            .similarity(&skills(&["cooking"]), "Cook", "Meals")
            .await;

        assert_eq!(score, Ok(55));
        let prompts = client.oracle().prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Title: Cook"));
    }

    #[tokio::test]
    async fn client_propagates_oracle_errors() {
        let client = SimilarityOracleClient::new(ScriptedOracle::failing(OracleError::Network {
            url: "http://oracle".to_owned(),
            message: "connection refused".to_owned(),
        }));

        let err = client
            .similarity(&[], "T", "D")
            .await
            .expect_err("oracle failure should surface");

        assert!(matches!(err, SimilarityError::Oracle(OracleError::Network { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn client_times_out_slow_oracles() {
        let oracle = ScriptedOracle::answering("50").with_delay(Duration::from_secs(60));
        let config = SimilarityClientConfig::default().with_timeout(Duration::from_secs(1));
        let client = SimilarityOracleClient::with_config(oracle, config);

        let err = client
            .similarity(&[], "T", "D")
            .await
            .expect_err("slow oracle should time out");

        assert_eq!(
            err,
            SimilarityError::Timeout {
                timeout: Duration::from_secs(1)
            }
        );
    }
}
