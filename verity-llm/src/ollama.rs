use crate::traits::{ChatMessage, CompletionOpts, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use verity_http::{HttpClient, RequestOpts};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama) with
/// the model already pulled.
pub struct OllamaClient {
    client: HttpClient,
    model: String,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "OllamaOptions::is_empty")]
    options: OllamaOptions,
}

#[derive(Serialize, Default)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaClient {
    pub fn new(client: HttpClient, model: String) -> Self {
        Self { client, model }
    }

    pub fn local(model: String) -> Result<Self, LlmError> {
        Ok(Self::new(HttpClient::new(DEFAULT_OLLAMA_ENDPOINT)?, model))
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        opts: CompletionOpts,
    ) -> Result<LlmResponse, LlmError> {
        let req = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: opts.temperature,
                num_predict: opts.max_tokens,
            },
        };

        let resp: OllamaChatResponse = self
            .client
            .post_json("api/chat", &req, RequestOpts::default())
            .await?;

        if let Some(err) = resp.error {
            return Err(LlmError::Api(err));
        }
        let message = resp.message.ok_or(LlmError::EmptyResponse)?;
        tracing::debug!(model = %self.model, eval_count = ?resp.eval_count, "llm.ollama.done");

        Ok(LlmResponse {
            text: message.content,
            model: resp.model.or_else(|| Some(self.model.clone())),
            tokens_used: resp.eval_count,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }
}
