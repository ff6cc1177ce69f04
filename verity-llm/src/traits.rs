use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use verity_common::VerityError;
use verity_http::HttpError;

/// Speaker of a chat message, serialized the way chat APIs expect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling knobs; `None` leaves the provider default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOpts {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Http(#[from] HttpError),

    #[error("API error: {0}")]
    Api(String),

    #[error("model returned no completion")]
    EmptyResponse,
}

impl From<LlmError> for VerityError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(e) => VerityError::Http(e.to_string()),
            other => VerityError::Llm(other.to_string()),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one chat exchange and return the model's reply.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: CompletionOpts,
    ) -> Result<LlmResponse, LlmError>;

    /// Model identifier sent with every request.
    fn model_name(&self) -> &str;

    /// Provider label shown in the UI.
    fn provider_name(&self) -> &str;
}
