//! The text-generation service client.
//!
//! One synchronous structured-text request per generation: a system prompt
//! from the resolved config and a user prompt assembled by the handler.
//! The wire protocol is the common chat-completions shape; the transport
//! trait keeps handlers and tests independent of HTTP.

use std::time::Duration;

use log::debug;
use serde_json::{Value, json};

/// Failures of the generation protocol. Recoverable by design: the owning
/// handler logs and falls back, the build continues.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// A completion backend. Implemented by the HTTP transport and by test
/// doubles with scripted responses.
pub trait AiTransport: Send + Sync {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError>;
}

/// The client handed to handlers.
pub struct AiClient {
    transport: Box<dyn AiTransport>,
}

impl AiClient {
    pub fn new(transport: Box<dyn AiTransport>) -> Self {
        Self { transport }
    }

    /// Build a client from the environment, or `None` when no credentials
    /// are configured — in which case AI handlers uniformly fall back.
    pub fn from_env() -> Option<Self> {
        HttpAiTransport::from_env().map(|transport| Self::new(Box::new(transport)))
    }

    pub fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError> {
        self.transport.complete(system_prompt, user_prompt)
    }
}

/// Blocking chat-completions transport.
pub struct HttpAiTransport {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl HttpAiTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            // Long responses are permitted; give slow generations room.
            .timeout(Duration::from_secs(300))
            .build()
            .expect("default TLS backend available");
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Credentials from `H5FORGE_AI_KEY`, endpoint and model overridable
    /// via `H5FORGE_AI_URL` and `H5FORGE_AI_MODEL`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("H5FORGE_AI_KEY").ok().filter(|key| !key.is_empty())?;
        let endpoint =
            std::env::var("H5FORGE_AI_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model =
            std::env::var("H5FORGE_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(endpoint, api_key, model))
    }
}

impl AiTransport for HttpAiTransport {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": 0.7,
        });
        debug!("requesting generation from {}", self.endpoint);

        let response: Value = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| AiError::Unavailable(e.to_string()))?
            .json()
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AiError::MalformedResponse("response carries no content".to_string()))
    }
}
