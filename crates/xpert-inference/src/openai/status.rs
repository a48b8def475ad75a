//! Classification of non-success completion responses.

use reqwest::StatusCode;

use xpert_core::Error;

use super::wire::ErrorDetail;

/// Why the endpoint refused a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthorized,
    RateLimited,
    UnknownModel,
    PromptTooLong,
    Upstream,
    Other,
}

impl Rejection {
    /// Status first, then the provider's error code (or type) for 4xx bodies.
    pub fn classify(status: StatusCode, detail: &ErrorDetail) -> Self {
        let code = detail
            .code
            .as_deref()
            .or(detail.kind.as_deref())
            .unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::NOT_FOUND => Self::UnknownModel,
            s if s.is_server_error() => Self::Upstream,
            _ if code == "model_not_found" => Self::UnknownModel,
            _ if code.contains("context_length") => Self::PromptTooLong,
            _ => Self::Other,
        }
    }

    /// Whether re-running the same prompt later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Upstream)
    }

    /// Credentials and model names are configuration problems; the rest
    /// fail only the request at hand.
    pub fn into_error(self, status: StatusCode, message: &str) -> Error {
        let detail = format!("{} ({})", message, status);
        match self {
            Self::Unauthorized => Error::Config(format!("Credentials rejected: {}", detail)),
            Self::UnknownModel => Error::Config(format!("Unknown model: {}", detail)),
            Self::RateLimited => Error::Inference(format!("Rate limit exceeded: {}", detail)),
            Self::PromptTooLong => {
                Error::Inference(format!("Prompt exceeds context window: {}", detail))
            }
            Self::Upstream => Error::Inference(format!("Upstream failure: {}", detail)),
            Self::Other => Error::Inference(format!("Completion rejected: {}", detail)),
        }
    }
}
