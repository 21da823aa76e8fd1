//! Chat-completion client for quiz generation.

use serde::{Deserialize, Serialize};
use slidequiz_core::quiz::{parse_response, QuizPrompt};
use slidequiz_core::{Error, Quiz, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Settings for the completion API, handed to [`QuizClient::new`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token. Not checked here; a missing key shows up as the API's
    /// authentication error.
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API, without the endpoint path.
    pub base_url: String,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }
}

impl LlmConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Sends aggregated slide text to the completion API and parses the reply.
pub struct QuizClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl QuizClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// The request body for the given aggregated text.
    pub fn request_body(&self, text: &str) -> ChatRequest<'_> {
        let prompt = QuizPrompt::for_text(text);
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage::new("system", prompt.system),
                ChatMessage::new("user", prompt.user),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Make one completion request and split the reply into a [`Quiz`].
    ///
    /// Every failure (transport, HTTP status, body shape) comes back as
    /// [`Error::Generation`]. There are no retries.
    pub async fn generate(&self, text: &str) -> Result<Quiz> {
        let body = self.request_body(text);
        log::debug!(
            "Requesting quiz from {} ({} chars of slide text)",
            self.config.model,
            text.chars().count()
        );

        let mut request_builder = self.client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.config.api_key {
            request_builder = request_builder.bearer_auth(api_key);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Error::Generation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Generation(format!(
                "API returned {}: {}",
                status,
                response_text.trim()
            )));
        }

        let completion: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::Generation(format!("Malformed response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("Response contained no message".to_string()))?;

        let quiz = parse_response(&content);
        log::debug!(
            "Received {} question blocks, summary present: {}",
            quiz.questions.len(),
            quiz.has_summary()
        );

        Ok(quiz)
    }
}
