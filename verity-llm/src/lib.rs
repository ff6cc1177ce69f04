//! Provider-agnostic chat completion for Verity.
//!
//! This crate exposes the [`traits::LlmClient`] interface and two concrete
//! clients: [`openai::ChatCompletionsClient`] for OpenAI-compatible hosts
//! (Groq by default, OpenAI) and [`ollama::OllamaClient`] for a local server.
//!
//! # Examples
//! ```no_run
//! use verity_llm::openai::ChatCompletionsClient;
//! use verity_llm::traits::{ChatMessage, CompletionOpts, LlmClient};
//!
//! # async fn demo() -> Result<(), verity_llm::traits::LlmError> {
//! let client = ChatCompletionsClient::groq(
//!     std::env::var("GROQ_API_KEY").unwrap_or_default(),
//!     verity_llm::DEFAULT_GROQ_MODEL.to_string(),
//! )?;
//! let reply = client
//!     .complete(&[ChatMessage::user("Say OK")], CompletionOpts::default())
//!     .await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```
pub mod ollama;
pub mod openai;
pub mod traits;

pub use traits::{ChatMessage, CompletionOpts, LlmClient, LlmError, LlmResponse, Role};

/// Default model recommendations per provider.
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";
