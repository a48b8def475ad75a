//! Completion backend for OpenAI-compatible chat endpoints.
//!
//! Anything serving `POST {base}/chat/completions` works: OpenAI, Azure
//! OpenAI, Ollama's compatibility layer, vLLM, LM Studio.
//!
//! ```rust,no_run
//! use xpert_core::CompletionBackend;
//! use xpert_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! # async fn run() -> xpert_core::Result<()> {
//! let backend = OpenAIBackend::new(OpenAIConfig {
//!     base_url: "http://localhost:11434/v1".to_string(),
//!     api_key: None,
//!     timeout_seconds: 120,
//!     json_mode: true,
//! })?;
//! let reply = backend.complete("Return {\"ok\": true}", "llama3").await?;
//! println!("{} ({} tokens)", reply.content, reply.total_tokens);
//! # Ok(())
//! # }
//! ```

mod backend;
mod status;
mod wire;

pub use backend::{OpenAIBackend, OpenAIConfig, JSON_SYSTEM_PROMPT};
