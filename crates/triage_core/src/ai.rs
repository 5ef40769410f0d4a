//! Inference fallback client.
//!
//! When no rule matches, a bounded sample of error lines goes to an
//! OpenAI-compatible chat-completions endpoint which answers with a
//! root cause, a fix suggestion and a confidence level. The response
//! is parsed strictly; anything unexpected (timeout, bad status,
//! malformed JSON, unknown confidence) makes the tier unavailable
//! rather than failing classification.

use crate::observer::Observer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat-completions endpoint (GitHub Models).
pub const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference/chat/completions";

/// Default model, fast and cheap enough for log analysis.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Hard budget for one inference round trip.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(10);

/// At most this many error lines go into the prompt.
pub const MAX_PROMPT_LINES: usize = 50;

const DEFAULT_MAX_TOKENS: u32 = 300;
const TEMPERATURE: f64 = 0.2;

// ============================================================================
// Response types
// ============================================================================

/// How sure the model says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// The model's diagnosis, already validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub root_cause: String,
    pub suggestion: String,
    pub confidence: Confidence,
}

/// Why an inference attempt produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("empty response from inference endpoint")]
    EmptyResponse,

    #[error("unrecognized response shape: {0}")]
    BadShape(String),

    #[error("suggestion was not valid JSON: {0}")]
    BadSuggestion(String),
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the chat-completions inference endpoint.
pub struct InferenceClient {
    endpoint: String,
    model: String,
    credential: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl InferenceClient {
    /// Create a client with the default endpoint, model and budget.
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            credential: credential.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: INFERENCE_TIMEOUT,
            client: reqwest::Client::builder()
                .timeout(INFERENCE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Point at a different OpenAI-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Ask for a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the round-trip budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    /// Cap the completion length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Ask the model to diagnose the given error lines.
    ///
    /// Returns `None` on any failure. The caller falls through to the
    /// generic record, so inference being down never breaks triage.
    pub async fn suggest(
        &self,
        error_lines: &[String],
        observer: &dyn Observer,
    ) -> Option<AiSuggestion> {
        observer.info("🤖 Requesting AI analysis of the error lines...");

        match self.request_suggestion(error_lines).await {
            Ok(suggestion) => {
                observer.info(&format!(
                    "🤖 AI analysis complete — confidence: {}",
                    suggestion.confidence.as_str()
                ));
                Some(suggestion)
            }
            Err(e) => {
                observer.warn(&format!("⚠️ AI fallback failed: {e}"));
                None
            }
        }
    }

    /// One inference round trip with the full error chain exposed.
    pub async fn request_suggestion(
        &self,
        error_lines: &[String],
    ) -> Result<AiSuggestion, AiError> {
        let prompt = build_prompt(error_lines);

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": TEMPERATURE
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.credential))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Http(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "".to_string());
            return Err(AiError::Status { status: status.as_u16(), body });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::Http(format!("Failed to read response: {}", e))
            }
        })?;

        let completion: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| AiError::BadShape(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        parse_suggestion(content)
    }
}

// ============================================================================
// Prompt and parsing
// ============================================================================

/// Build the fixed diagnosis prompt around a bounded log sample.
fn build_prompt(error_lines: &[String]) -> String {
    let log_sample = error_lines
        .iter()
        .take(MAX_PROMPT_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a CI/CD pipeline expert. Analyze the following pipeline failure log lines and provide:
1. A plain-English root cause (1 sentence, no jargon)
2. A specific, actionable fix suggestion (2-3 sentences max)
3. A confidence level: high, medium, or low

Respond ONLY in this JSON format, nothing else:
{{
  "rootCause": "...",
  "suggestion": "...",
  "confidence": "high|medium|low"
}}

Pipeline failure log:
```
{log_sample}
```"#
    )
}

/// Remove markdown code fences models often wrap JSON in.
fn strip_code_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the model's answer into a validated [`AiSuggestion`].
fn parse_suggestion(content: &str) -> Result<AiSuggestion, AiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let clean = strip_code_fences(trimmed);
    if clean.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    serde_json::from_str(&clean).map_err(|e| AiError::BadSuggestion(e.to_string()))
}
