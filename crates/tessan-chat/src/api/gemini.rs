//! Async HTTP client for the Gemini `generateContent` endpoint.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chat::{ChatModel, ReplyFuture};
use crate::{ChatError, ConfigError, GEMINI_API_BASE, Message, ModelReply, UsageInfo};

// ── Request types ──────────────────────────────────────────────────

/// Body of a `generateContent` call. Unused optional fields are omitted.
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Build a request from a system instruction and the full turn list.
    ///
    /// A blank instruction is left out entirely.
    pub fn new(
        system_instruction: &str,
        messages: &[Message],
        generation_config: Option<GenerationConfig>,
    ) -> Self {
        let system_instruction = if system_instruction.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part::text(system_instruction)],
            })
        };
        Self {
            system_instruction,
            contents: messages.iter().map(Content::from_message).collect(),
            generation_config,
        }
    }
}

/// A single turn (or the system instruction) on the wire.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn from_message(message: &Message) -> Self {
        Self {
            role: Some(message.role.gemini_role().to_string()),
            parts: vec![Part::text(&message.content)],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Sampling parameters.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawGenerateResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    prompt_feedback: Option<RawPromptFeedback>,
    usage_metadata: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawErrorEnvelope {
    error: RawApiError,
}

#[derive(Deserialize, Debug)]
struct RawApiError {
    message: String,
    status: Option<String>,
}

/// Turn an HTTP status and response body into a reply or a classified error.
pub fn parse_generate_response(status: StatusCode, body: &str) -> Result<ModelReply, ChatError> {
    if !status.is_success() {
        let detail = match serde_json::from_str::<RawErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(s) => format!("{s}: {}", envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) => body.to_string(),
        };
        return Err(ChatError::from_status(status, detail));
    }

    let parsed: RawGenerateResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::Rejected(format!("failed to parse response: {e}")))?;

    if let Some(ref usage) = parsed.usage_metadata {
        debug!(
            "Token usage: prompt={}, candidates={}, total={}",
            usage.prompt_token_count.unwrap_or(0),
            usage.candidates_token_count.unwrap_or(0),
            usage.total_token_count.unwrap_or(0),
        );
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ChatError::Rejected(format!("prompt blocked: {reason}")));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(ChatError::Rejected(format!(
            "empty reply (finish reason: {reason})"
        )));
    }

    debug!("LLM output: {} chars text", text.len());

    Ok(ModelReply {
        text,
        usage: parsed.usage_metadata,
        finish_reason: candidate.finish_reason,
    })
}

// ── Client ─────────────────────────────────────────────────────────

/// Model and sampling options for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// API root, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            model: crate::DEFAULT_MODEL.to_string(),
            temperature: Some(crate::DEFAULT_TEMPERATURE),
            max_output_tokens: None,
            base_url: GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiOptions {
    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

/// Async HTTP client for the Gemini chat API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    options: GeminiOptions,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, options: GeminiOptions) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tessan-chat/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            options,
        })
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.base_url, self.options.model
        )
    }

    /// Send one `generateContent` request.
    pub async fn generate_content(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<ModelReply, ChatError> {
        debug!(
            "LLM request: model={}, contents={}, system_instruction={}",
            self.options.model,
            body.contents.len(),
            body.system_instruction.is_some(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        parse_generate_response(status, &text)
    }
}

impl ChatModel for GeminiClient {
    fn name(&self) -> &str {
        self.model()
    }

    fn generate<'a>(&'a self, system_instruction: &'a str, messages: &'a [Message]) -> ReplyFuture<'a> {
        Box::pin(async move {
            let body = GenerateContentRequest::new(
                system_instruction,
                messages,
                self.options.generation_config(),
            );
            self.generate_content(&body).await
        })
    }
}
