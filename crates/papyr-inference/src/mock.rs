//! Mock generation backend for deterministic testing.
//!
//! ```rust,ignore
//! use papyr_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response(r#"{"summary": "S", "keywords": []}"#);
//! assert_eq!(backend.generate_call_count(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use papyr_core::{Error, GenerationBackend, Result};

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    response_mapping: HashMap<String, String>,
    default_response: String,
    latency_ms: u64,
    failing: bool,
}

/// One recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub system: String,
    pub prompt: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response_mapping: HashMap::new(),
            default_response: r#"{"summary": "Mock summary", "keywords": []}"#.to_string(),
            latency_ms: 0,
            failing: false,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `response` whenever the prompt contains `needle`.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .response_mapping
            .insert(needle.into(), response.into());
        self
    }

    /// Delay every call by `latency_ms`.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Make every call fail with `Inference`.
    pub fn failing(mut self) -> Self {
        Arc::make_mut(&mut self.config).failing = true;
        self
    }

    /// All calls recorded so far.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of generation calls recorded so far.
    pub fn generate_call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or(0)
    }

    async fn respond(&self, operation: &str, system: &str, prompt: &str) -> Result<String> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                operation: operation.to_string(),
                system: system.to_string(),
                prompt: prompt.to_string(),
            });
        }

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.failing {
            return Err(Error::Inference("Mock backend failure".to_string()));
        }

        let mapped = self
            .config
            .response_mapping
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone());

        Ok(mapped.unwrap_or_else(|| self.config.default_response.clone()))
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond("generate", "", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond("generate", system, prompt).await
    }

    async fn generate_json_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond("generate_json", system, prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
