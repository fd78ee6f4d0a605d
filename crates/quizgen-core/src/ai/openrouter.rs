use std::sync::{Arc, OnceLock};

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{JsonStage, QuizError, QuizResult};
use crate::state::{ChatMessage, QuizDraft};
use crate::transport::{HttpTransport, JsonPost};

pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Result of looking for a JSON array in free-form model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayScan<'a> {
    Found(&'a str),
    NotFound,
}

/// Greedy match from the first `[` to the last `]`, which strips prose and
/// markdown fences around the array.
pub fn scan_for_array(text: &str) -> ArrayScan<'_> {
    static ARRAY_SPAN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        ARRAY_SPAN.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("array span pattern is valid"));

    match pattern.find(text) {
        Some(span) => ArrayScan::Found(span.as_str()),
        None => ArrayScan::NotFound,
    }
}

/// Client for an OpenAI-compatible chat-completion endpoint (OpenRouter by default).
#[derive(Clone)]
pub struct OpenRouterClient {
    transport: Arc<dyn HttpTransport>,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: SecretString) -> Self {
        Self {
            transport,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send one user message and return the first choice's text, trimmed.
    pub async fn query(&self, prompt: &str) -> QuizResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
        };
        let body =
            serde_json::to_value(&request).map_err(|e| QuizError::Encode(e.to_string()))?;

        log::info!("Sending quiz prompt to {} ({})", self.endpoint, self.model);

        let reply = self
            .transport
            .post_json(
                JsonPost::new(&self.endpoint, body)
                    .with_bearer(self.api_key.expose_secret())
                    .with_header("Content-Type", "application/json"),
            )
            .await?;

        if !reply.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&reply.body)
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            log::warn!("Chat completion failed with status {}: {}", reply.status, message);
            return Err(QuizError::RemoteApi {
                status: reply.status,
                message,
            });
        }

        let response: ChatResponse = serde_json::from_str(&reply.body)
            .map_err(|e| QuizError::Network(format!("Unreadable chat completion response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(QuizError::MalformedAiOutput)
    }

    /// Ask the model for quiz JSON and return the array it produced.
    ///
    /// The array is only checked for being JSON, not for the question shape.
    /// When it does not parse, the error still carries the extracted text.
    pub async fn generate_quiz_json(&self, prompt: &str) -> QuizResult<QuizDraft> {
        let content = self.query(prompt).await?;

        let span = match scan_for_array(&content) {
            ArrayScan::Found(span) => span,
            ArrayScan::NotFound => return Err(QuizError::NoArrayFound),
        };
        log::debug!("Extracted {} bytes of quiz JSON", span.len());

        if let Err(e) = serde_json::from_str::<serde_json::Value>(span) {
            return Err(QuizError::invalid_json(
                JsonStage::Generate,
                &e,
                Some(span.to_string()),
            ));
        }

        Ok(QuizDraft::new(span))
    }
}
