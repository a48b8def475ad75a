//! Core traits for xpert collaborators.
//!
//! These traits define the external services the resolution pipeline talks
//! to, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// PERSISTENCE TRAITS
// =============================================================================

/// Backend persistence for experts, meta-experts and their tags.
///
/// `owner` is the caller key that scopes reads and writes (the sourcing
/// user); it is distinct from the organization scope stored on records.
#[async_trait]
pub trait MetaExpertStore: Send + Sync {
    /// List every meta-expert visible to the owner, in backend order.
    async fn list_meta_experts(&self, owner: &str) -> Result<Vec<MetaExpert>>;

    /// Create a new meta-expert (including its jobs).
    async fn create_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()>;

    /// Update an existing meta-expert (including its jobs).
    async fn update_meta_expert(&self, owner: &str, meta: &MetaExpert) -> Result<()>;

    /// Store a freshly generated tag set for a meta-expert.
    async fn create_tags(&self, meta_expert_id: Uuid, tags: &[Tag]) -> Result<()>;

    /// Persist the scraped expert row for audit.
    async fn create_expert(&self, owner: &str, expert: &Expert) -> Result<()>;
}

/// Sink for model cost accounting.
#[async_trait]
pub trait SpendRecorder: Send + Sync {
    async fn record_spend(&self, record: &SpendRecord) -> Result<()>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Raw reply from one model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Message content exactly as returned (may be fenced).
    pub content: String,
    /// Total tokens billed for the call.
    pub total_tokens: u32,
}

/// Backend for single-prompt, JSON-mode completions.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one prompt to the named model and return its raw reply.
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion>;
}

// =============================================================================
// PROFILE PHOTO
// =============================================================================

/// Lookup for a profile photo when the provider did not supply a usable one.
#[async_trait]
pub trait PhotoLookup: Send + Sync {
    async fn find_photo(
        &self,
        name: &str,
        company: Option<&str>,
        profile_link: Option<&str>,
    ) -> Result<Option<String>>;
}
