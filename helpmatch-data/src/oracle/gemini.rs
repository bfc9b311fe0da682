//! Gemini `generateContent` request and response types.
//!
//! Only the fields the similarity oracle needs are modelled. Unknown fields
//! in responses are ignored.
//!
//! See: <https://ai.google.dev/api/generate-content>

use serde::{Deserialize, Serialize};

/// One piece of content; only text parts are produced or consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload, absent for non-text parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A turn in the conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Ordered content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Author of the turn, e.g. `"user"` or `"model"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation so far; a single user turn for similarity prompts.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Wrap a prompt as a single user turn.
    #[must_use]
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_owned()),
                }],
                role: Some("user".to_owned()),
            }],
        }
    }
}

/// A single generated candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content; missing when the candidate was blocked.
    #[serde(default)]
    pub content: Option<Content>,
    /// Reason generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates, absent when the prompt was blocked.
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    ///
    /// Returns `None` when there is no candidate or it carries no text.
    #[must_use]
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.as_ref()?.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialise_request_as_single_user_turn() {
        let request = GenerateContentRequest::from_prompt("hello");

        let value = serde_json::to_value(&request).expect("should serialise");

        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "hello" }], "role": "user" }]
            })
        );
    }

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "8" }, { "text": "7" }], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        }"#;

        let response: GenerateContentResponse =
            serde_json::from_str(json).expect("should deserialise");

        assert_eq!(response.first_text().as_deref(), Some("87"));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let json = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;

        let response: GenerateContentResponse =
            serde_json::from_str(json).expect("should deserialise");

        assert!(response.first_text().is_none());
    }

    #[test]
    fn candidate_without_content_has_no_text() {
        let json = r#"{ "candidates": [{ "finishReason": "SAFETY" }] }"#;

        let response: GenerateContentResponse =
            serde_json::from_str(json).expect("should deserialise");

        assert!(response.first_text().is_none());
    }
}
