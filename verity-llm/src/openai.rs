use crate::traits::{ChatMessage, CompletionOpts, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use verity_http::{Auth, HttpClient, RequestOpts};

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1/";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";

/// Client for OpenAI-compatible `chat/completions` endpoints (Groq, OpenAI,
/// and gateways that mimic them).
pub struct ChatCompletionsClient {
    client: HttpClient,
    provider: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl ChatCompletionsClient {
    /// Create a client for `base_url` (keep the trailing slash, e.g. `.../v1/`).
    ///
    /// An empty key is accepted here; the provider rejects it with a 401.
    pub fn new(
        client: HttpClient,
        provider: impl Into<String>,
        api_key: String,
        model: String,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            api_key,
            model,
        }
    }

    pub fn groq(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self::new(HttpClient::new(GROQ_API_BASE)?, "Groq", api_key, model))
    }

    pub fn openai(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self::new(
            HttpClient::new(OPENAI_API_BASE)?,
            "OpenAI",
            api_key,
            model,
        ))
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: CompletionOpts,
    ) -> Result<LlmResponse, LlmError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: opts.temperature,
            max_tokens: opts.max_tokens,
            stream: false,
        };

        let started = Instant::now();
        tracing::debug!(
            provider = %self.provider,
            model = %self.model,
            messages = messages.len(),
            "llm.chat_completions.start"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json(
                "chat/completions",
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    ..Default::default()
                },
            )
            .await?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(LlmError::EmptyResponse)?;

        let tokens_used = resp.usage.and_then(|u| u.total_tokens);
        tracing::info!(
            provider = %self.provider,
            model = %self.model,
            tokens_used = ?tokens_used,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "llm.chat_completions.done"
        );

        Ok(LlmResponse {
            text,
            model: resp.model.or_else(|| Some(self.model.clone())),
            tokens_used,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }
}
