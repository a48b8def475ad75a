//! Centralized default constants for xpert.
//!
//! **This module is the single source of truth** for shared default values.
//! Config structs and the CLI reference these constants instead of defining
//! their own magic numbers.

// =============================================================================
// RESOLUTION
// =============================================================================

/// Normalized edit distance below which two names are considered the same.
pub const NAME_MATCH_THRESHOLD: f64 = 0.05;

/// Profession stored on a new meta-expert when the profile has none.
pub const MISSING_PROFESSION: &str = "Missing Job";

/// Company stored on a new meta-expert when the profile has none.
pub const MISSING_COMPANY: &str = "Missing Company";

/// Connection counts below this are recorded as a fraud-screening signal.
pub const LOW_CONNECTION_THRESHOLD: u32 = 50;

/// Host serving the provider's own profile pictures.
pub const PROVIDER_MEDIA_HOST: &str = "media.licdn.com";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default model for every prompt kind.
pub const GEN_MODEL: &str = "gpt-4o-mini";

/// Default HTTP timeout for model calls, in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 300;

/// Upper bound on concurrent model calls.
pub const LLM_MAX_WORKERS: usize = 20;

/// Batch width multiplier: a batch of N requests uses up to N × this many workers.
pub const LLM_WORKERS_PER_REQUEST: usize = 2;

/// Cost charged per 1000 tokens when recording spend.
pub const LLM_COST_PER_1K_TOKENS: f64 = 0.0025;

// =============================================================================
// STORAGE
// =============================================================================

/// Default backend persistence API base URL.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Default HTTP timeout for backend calls, in seconds.
pub const BACKEND_TIMEOUT_SECS: u64 = 30;
