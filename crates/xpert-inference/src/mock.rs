//! Mock completion backend and spend recorder for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xpert_inference::mock::MockCompletionBackend;
//!
//! let backend = MockCompletionBackend::new()
//!     .with_response_mapping("classifying the seniority", r#"{"seniority": "Senior"}"#)
//!     .with_failure_mapping("expert tag extractor", "simulated outage");
//! ```
//!
//! Mappings match when the prompt *contains* the key; the first matching
//! mapping wins, failures are checked before responses.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use xpert_core::{Completion, CompletionBackend, Error, Result, SpendRecord, SpendRecorder};

/// Mock completion backend for testing.
#[derive(Clone)]
pub struct MockCompletionBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    responses: Vec<(String, String)>,
    failures: Vec<(String, String)>,
    panics: Vec<String>,
    default_response: String,
    total_tokens: u32,
    latency_ms: u64,
}

/// One recorded `complete` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub model: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            responses: Vec::new(),
            failures: Vec::new(),
            panics: Vec::new(),
            default_response: "{}".to_string(),
            total_tokens: 100,
            latency_ms: 0,
        }
    }
}

impl MockCompletionBackend {
    /// Create a mock that answers `{}` to everything.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply used when no mapping matches.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Reply with `output` to prompts containing `needle`.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .responses
            .push((needle.into(), output.into()));
        self
    }

    /// Fail prompts containing `needle` with an inference error.
    pub fn with_failure_mapping(
        mut self,
        needle: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .failures
            .push((needle.into(), message.into()));
        self
    }

    /// Panic on prompts containing `needle`.
    pub fn with_panic_mapping(mut self, needle: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).panics.push(needle.into());
        self
    }

    /// Token count reported for every successful call.
    pub fn with_total_tokens(mut self, total_tokens: u32) -> Self {
        Arc::make_mut(&mut self.config).total_tokens = total_tokens;
        self
    }

    /// Simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of calls whose prompt contains `needle`.
    pub fn call_count_containing(&self, needle: &str) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }
}

impl Default for MockCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockCompletionBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion> {
        self.call_log.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            model: model.to_string(),
            timestamp: std::time::Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.panics.iter().any(|n| prompt.contains(n.as_str())) {
            panic!("mock backend asked to panic");
        }

        if let Some((_, message)) = self
            .config
            .failures
            .iter()
            .find(|(n, _)| prompt.contains(n.as_str()))
        {
            return Err(Error::Inference(message.clone()));
        }

        let content = self
            .config
            .responses
            .iter()
            .find(|(n, _)| prompt.contains(n.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| self.config.default_response.clone());

        Ok(Completion {
            content,
            total_tokens: self.config.total_tokens,
        })
    }
}

/// Spend recorder that keeps every record in memory.
#[derive(Clone, Default)]
pub struct MockSpendRecorder {
    records: Arc<Mutex<Vec<SpendRecord>>>,
    fail: bool,
    latency_ms: u64,
}

impl MockSpendRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder that rejects every record.
    pub fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail: true,
            latency_ms: 0,
        }
    }

    /// Simulated latency for every write.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn records(&self) -> Vec<SpendRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpendRecorder for MockSpendRecorder {
    async fn record_spend(&self, record: &SpendRecord) -> Result<()> {
        if self.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.latency_ms)).await;
        }
        if self.fail {
            return Err(Error::Storage("spend endpoint unavailable".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mapping_precedence() {
        let backend = MockCompletionBackend::new()
            .with_default_response("default")
            .with_response_mapping("alpha", "A")
            .with_failure_mapping("beta", "down");

        assert_eq!(backend.complete("x alpha y", "m").await.unwrap().content, "A");
        assert_eq!(backend.complete("other", "m").await.unwrap().content, "default");
        assert!(backend.complete("alpha beta", "m").await.is_err());
        assert_eq!(backend.get_calls().len(), 3);
        assert_eq!(backend.call_count_containing("alpha"), 2);
    }

    #[tokio::test]
    async fn test_spend_recorder() {
        let recorder = MockSpendRecorder::new();
        let record = SpendRecord::new("m", 0.5);
        recorder.record_spend(&record).await.unwrap();
        assert_eq!(recorder.records().len(), 1);

        assert!(MockSpendRecorder::failing()
            .record_spend(&record)
            .await
            .is_err());
    }
}
