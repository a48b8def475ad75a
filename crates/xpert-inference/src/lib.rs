//! # xpert-inference
//!
//! LLM access for xpert.
//!
//! This crate provides:
//! - OpenAI-compatible completion backend (feature `openai`, default)
//! - LLM gateway running prompt batches over a bounded worker pool
//! - Code-fence unwrapping and strict JSON parsing of model replies
//! - Prompt builders and typed results for each prompt kind
//! - Spend accounting for successful calls
//!
//! # Feature Flags
//!
//! - `openai` (default): Enable OpenAI-compatible backend
//! - `mock`: Expose the mock backend and spend recorder to other crates
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xpert_inference::{GatewayConfig, LlmGateway, LlmRequest, OpenAIBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let gateway = LlmGateway::new(Arc::new(backend), GatewayConfig::from_env());
//!     let responses = gateway
//!         .run_batch(vec![LlmRequest::new("q", "Reply with {\"ok\": true}", "gpt-4o-mini")])
//!         .await;
//! }
//! ```

pub mod config;
pub mod gateway;
pub mod pool;
pub mod prompts;
pub mod reply;
pub mod results;

#[cfg(feature = "openai")]
pub mod openai;

// Mock backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use xpert_core::*;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

pub use config::{GatewayConfig, InferenceSettings};
pub use gateway::{find_success, LlmGateway, LlmOutcome, LlmRequest, LlmResponse};
pub use pool::WorkerPool;
pub use reply::{parse_json_reply, strip_code_fence};
pub use results::{DisambiguationResult, SeniorityResult, TagListResult};
