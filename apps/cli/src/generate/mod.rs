//! Flashcard generation through the Gemini `generateContent` API.

use flashcard_core::GeneratedCard;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use tokio::sync::Mutex;

use crate::config::Config;

/// Batch sizes accepted for one request.
pub const MIN_CARDS: u32 = 1;
pub const MAX_CARDS: u32 = 20;
pub const DEFAULT_CARDS: u32 = 5;

/// Generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No API key configured - set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Generation service error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Could not read generated cards: {0}")]
    Parse(String),

    #[error("The generation service returned no cards")]
    NoCards,

    #[error("A generation request is already in progress")]
    AlreadyInProgress,
}

type Result<T> = std::result::Result<T, GenerateError>;

/// Anything that can turn a topic into card records.
pub trait CardGenerator {
    fn generate(
        &self,
        topic: &str,
        count: u32,
    ) -> impl Future<Output = Result<Vec<GeneratedCard>>> + Send;
}

/// Check a request before anything is sent.
pub fn validate_request(topic: &str, count: u32) -> Result<()> {
    if topic.trim().is_empty() {
        return Err(GenerateError::InvalidRequest("topic must not be empty".to_string()));
    }
    if !(MIN_CARDS..=MAX_CARDS).contains(&count) {
        return Err(GenerateError::InvalidRequest(format!(
            "card count must be between {MIN_CARDS} and {MAX_CARDS}, got {count}"
        )));
    }
    Ok(())
}

pub fn build_prompt(topic: &str, count: u32) -> String {
    format!(
        "Generate {count} flashcards for revision based on the following topic or content.\n\
         Make them challenging but concise.\n\
         If the question is about writing code, provide a clear prompt and set \"isCoding\" to true.\n\
         Include a detailed \"explanation\" for each card that breaks down the solution step-by-step.\n\
         Topic/Content: \"{topic}\""
    )
}

fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "front": {
                    "type": "STRING",
                    "description": "The prompt or question on the front of the card."
                },
                "back": {
                    "type": "STRING",
                    "description": "The concise answer or solution."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A detailed breakdown or step-by-step explanation of the answer."
                },
                "isCoding": {
                    "type": "BOOLEAN",
                    "description": "Whether this card requires a code input field."
                }
            },
            "required": ["front", "back", "explanation", "isCoding"]
        }
    })
}

// === API Request/Response Types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn new(topic: &str, count: u32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(topic, count)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

/// Parse the model's JSON text into card records.
///
/// A surrounding ```` ```json ```` fence is tolerated. Records may be
/// partial; an empty array is an error so no empty deck gets created.
pub fn parse_cards(text: &str) -> Result<Vec<GeneratedCard>> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.strip_suffix("```").unwrap_or(rest).trim();
    }

    let cards: Vec<GeneratedCard> =
        serde_json::from_str(body).map_err(|e| GenerateError::Parse(e.to_string()))?;
    if cards.is_empty() {
        return Err(GenerateError::NoCards);
    }
    Ok(cards)
}

/// Gemini-backed generator.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

impl CardGenerator for GeminiClient {
    async fn generate(&self, topic: &str, count: u32) -> Result<Vec<GeneratedCard>> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;
        let request = GenerateContentRequest::new(topic, count);

        tracing::debug!(model = %self.model, count, "requesting flashcards");
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Api { status, message });
        }

        let response: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::Parse(e.to_string()))?;

        let text = response
            .text()
            .ok_or_else(|| GenerateError::Parse("response has no candidates".to_string()))?;
        parse_cards(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GenerationStatus {
    Idle,
    Generating { topic: String },
}

/// Allows one outstanding generation request at a time.
pub struct GenerationGuard {
    status: Mutex<GenerationStatus>,
}

impl Default for GenerationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(GenerationStatus::Idle),
        }
    }

    /// Run `request` unless another one is in flight. The status returns to
    /// idle whether the request succeeds or fails.
    pub async fn run<F, T>(&self, topic: &str, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        {
            let mut current = self.status.lock().await;
            if let GenerationStatus::Generating { topic: active } = &*current {
                tracing::warn!(active = %active, rejected = %topic, "generation already in progress");
                return Err(GenerateError::AlreadyInProgress);
            }
            *current = GenerationStatus::Generating {
                topic: topic.to_string(),
            };
        }

        let result = request.await;

        *self.status.lock().await = GenerationStatus::Idle;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_body_matches_api_shape() {
        let body = serde_json::to_value(GenerateContentRequest::new("Rust", 3)).unwrap();

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.starts_with("Generate 3 flashcards"));
        assert!(prompt.ends_with("Topic/Content: \"Rust\""));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["items"]["required"],
            json!(["front", "back", "explanation", "isCoding"])
        );
    }

    #[test]
    fn response_text_from_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "[{\"front\":"}, {"text": "\"Q\"}]"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();

        let text = response.text().unwrap();
        assert_eq!(text, "[{\"front\":\"Q\"}]");
        assert_eq!(parse_cards(&text).unwrap()[0].front.as_deref(), Some("Q"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn parse_tolerates_partial_records() {
        let cards = parse_cards(r#"[{"front":"Q","isCoding":true},{"back":"A"}]"#).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].is_coding, Some(true));
        assert_eq!(cards[1].front, None);
    }

    #[test]
    fn parse_strips_code_fence() {
        let cards = parse_cards("```json\n[{\"front\":\"Q\",\"back\":\"A\"}]\n```").unwrap();
        assert_eq!(cards[0].back.as_deref(), Some("A"));
    }

    #[test]
    fn parse_rejects_bad_payloads() {
        assert!(matches!(parse_cards("not json"), Err(GenerateError::Parse(_))));
        assert!(matches!(parse_cards(r#"{"front":"Q"}"#), Err(GenerateError::Parse(_))));
        assert!(matches!(parse_cards("[]"), Err(GenerateError::NoCards)));
    }

    #[test]
    fn validate_request_bounds() {
        assert!(validate_request("Rust", 5).is_ok());
        assert!(matches!(validate_request("  ", 5), Err(GenerateError::InvalidRequest(_))));
        assert!(matches!(validate_request("Rust", 0), Err(GenerateError::InvalidRequest(_))));
        assert!(matches!(validate_request("Rust", 21), Err(GenerateError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let config = Config::from_lookup(|_| None);
        let client = GeminiClient::new(&config);
        let result = client.generate("Rust", 3).await;
        assert!(matches!(result, Err(GenerateError::MissingApiKey)));
    }

    #[tokio::test]
    async fn guard_rejects_second_request() {
        let guard = GenerationGuard::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let first = guard.run("first", async {
            rx.await.ok();
            Ok::<_, GenerateError>(1)
        });
        let second = async {
            let result = guard.run("second", async { Ok(2) }).await;
            tx.send(()).ok();
            result
        };

        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.unwrap(), 1);
        assert!(matches!(second, Err(GenerateError::AlreadyInProgress)));
        assert_eq!(*guard.status.lock().await, GenerationStatus::Idle);
    }

    #[tokio::test]
    async fn guard_resets_after_failure() {
        let guard = GenerationGuard::new();
        let result: Result<()> = guard
            .run("topic", async { Err(GenerateError::NoCards) })
            .await;
        assert!(result.is_err());
        assert_eq!(*guard.status.lock().await, GenerationStatus::Idle);
    }
}
