//! LLM gateway: runs a batch of independent prompts concurrently.
//!
//! Every request in a batch yields exactly one [`LlmResponse`], tagged with
//! the request's id. A failure in one request (transport, HTTP status, a
//! reply that is not JSON, or a panic) becomes an error entry for that
//! request only. Responses come back in completion order, so callers
//! correlate by id with [`find_success`].
//!
//! Ids are not checked for uniqueness. With duplicate ids the caller cannot
//! tell which response belongs to which request; keep ids unique per batch.
//!
//! Spend records are written off the response path. Call
//! [`LlmGateway::flush`] before shutting the runtime down so none are lost.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use xpert_core::{CompletionBackend, Result, SpendRecord, SpendRecorder};

use crate::config::GatewayConfig;
use crate::pool::WorkerPool;
use crate::reply::parse_json_reply;

/// One prompt to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Caller-chosen correlation key.
    pub id: String,
    pub prompt: String,
    pub model: String,
}

impl LlmRequest {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// Result of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub id: String,
    #[serde(flatten)]
    pub outcome: LlmOutcome,
}

/// `{"status": "success", "data": ...}` or `{"status": "error", "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LlmOutcome {
    Success { data: JsonValue },
    Error { error: String },
}

impl LlmResponse {
    pub fn success(id: impl Into<String>, data: JsonValue) -> Self {
        Self {
            id: id.into(),
            outcome: LlmOutcome::Success { data },
        }
    }

    pub fn error(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: LlmOutcome::Error {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, LlmOutcome::Success { .. })
    }

    /// Parsed payload, if the request succeeded.
    pub fn data(&self) -> Option<&JsonValue> {
        match &self.outcome {
            LlmOutcome::Success { data } => Some(data),
            LlmOutcome::Error { .. } => None,
        }
    }
}

/// Payload of the first successful response with the given id.
pub fn find_success<'a>(responses: &'a [LlmResponse], id: &str) -> Option<&'a JsonValue> {
    responses
        .iter()
        .find(|r| r.id == id)
        .and_then(LlmResponse::data)
}

/// Concurrent, bounded, cost-accounted access to a completion backend.
#[derive(Clone)]
pub struct LlmGateway {
    backend: Arc<dyn CompletionBackend>,
    spend: Option<Arc<dyn SpendRecorder>>,
    config: Arc<GatewayConfig>,
    pool: WorkerPool,
    pending_spend: Arc<Mutex<JoinSet<()>>>,
}

impl LlmGateway {
    /// Create a gateway with its own worker pool.
    pub fn new(backend: Arc<dyn CompletionBackend>, config: GatewayConfig) -> Self {
        let pool = WorkerPool::new(config.max_workers, config.workers_per_request);
        info!(
            max_workers = pool.max_workers(),
            cost_per_1k_tokens = config.cost_per_1k_tokens,
            "Initializing LLM gateway"
        );
        Self {
            backend,
            spend: None,
            config: Arc::new(config),
            pool,
            pending_spend: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Record the cost of every successful call.
    pub fn with_spend_recorder(mut self, recorder: Arc<dyn SpendRecorder>) -> Self {
        self.spend = Some(recorder);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run every request and return one response per request.
    pub async fn run_batch(&self, requests: Vec<LlmRequest>) -> Vec<LlmResponse> {
        if requests.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let request_count = requests.len();

        let tasks = requests
            .into_iter()
            .map(|request| {
                let id = request.id.clone();
                let gateway = self.clone();
                (id, async move { gateway.execute(request).await })
            })
            .collect();

        let responses: Vec<LlmResponse> = self
            .pool
            .gather(tasks)
            .await
            .into_iter()
            .map(|(id, outcome)| match outcome {
                Ok(response) => response,
                Err(panic) => {
                    warn!(request_id = %id, error = %panic, "LLM request task failed");
                    LlmResponse::error(id, panic)
                }
            })
            .collect();

        let failed = responses.iter().filter(|r| !r.is_success()).count();
        info!(
            request_count,
            failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "LLM batch complete"
        );
        responses
    }

    /// Wait for every spend record started so far to be written.
    ///
    /// Shared by all clones of this gateway.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.pending_spend.lock().await);
        let count = pending.len();
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Spend recording task did not complete");
            }
        }
        if count > 0 {
            debug!(count, "Flushed pending spend records");
        }
    }

    /// Run a single request as a batch of one.
    pub async fn run_one(&self, request: LlmRequest) -> LlmResponse {
        let id = request.id.clone();
        self.run_batch(vec![request])
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| LlmResponse::error(id, "no response produced"))
    }

    async fn execute(&self, request: LlmRequest) -> LlmResponse {
        let start = Instant::now();
        match self.call(&request).await {
            Ok(data) => {
                debug!(
                    request_id = %request.id,
                    model = %request.model,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "LLM request succeeded"
                );
                LlmResponse::success(request.id, data)
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    model = %request.model,
                    bad_reply = e.is_model_output(),
                    error = %e,
                    "LLM request failed"
                );
                LlmResponse::error(request.id, e.to_string())
            }
        }
    }

    async fn call(&self, request: &LlmRequest) -> Result<JsonValue> {
        let completion = self
            .backend
            .complete(&request.prompt, &request.model)
            .await?;
        let data = parse_json_reply(&completion.content)?;
        self.record_spend(&request.model, completion.total_tokens).await;
        Ok(data)
    }

    /// Start a cost record in the background; never affects the response.
    async fn record_spend(&self, model: &str, total_tokens: u32) {
        let Some(recorder) = self.spend.clone() else {
            return;
        };

        let mut record = SpendRecord::new(model, self.config.spend_for(total_tokens));
        record.source_email_id = self.config.source_email_id.clone();
        record.test_id = self.config.test_id.clone();

        let mut pending = self.pending_spend.lock().await;
        // Drop writes that already finished.
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            if let Err(e) = recorder.record_spend(&record).await {
                warn!(
                    model = %record.model,
                    spend = record.spend,
                    error = %e,
                    "Failed to record LLM spend"
                );
            }
        });
    }
}
