//! Summary and keyword generation for uploaded papers.
//!
//! [`LlmDigester`] prompts a [`GenerationBackend`] for a JSON object
//! `{"summary": "...", "keywords": ["..."]}` and validates the answer before
//! anything is returned. The whole call runs under a hard deadline so a
//! stalled model surfaces as `UpstreamTimeout` instead of hanging a request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use papyr_core::defaults::{
    DIGEST_INPUT_MAX_CHARS, DIGEST_MAX_KEYWORDS, ENV_GEN_TIMEOUT_SECS, GEN_TIMEOUT_SECS,
};
use papyr_core::{normalize_keywords, Error, GenerationBackend, PaperDigest, PaperDigester, Result};

const SYSTEM_PROMPT: &str = "You summarize research papers. \
Respond with a single JSON object with exactly two fields: \
\"summary\" (a concise plain-text summary of the paper, at most three paragraphs) and \
\"keywords\" (an array of 3 to 10 short key phrases, most important first). \
Do not add any other text.";

/// Digester backed by an LLM generation backend.
pub struct LlmDigester {
    backend: Arc<dyn GenerationBackend>,
    timeout: Duration,
}

impl LlmDigester {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(GEN_TIMEOUT_SECS),
        }
    }

    /// Create with the deadline from `PAPYR_GEN_TIMEOUT_SECS`.
    pub fn from_env(backend: Arc<dyn GenerationBackend>) -> Self {
        let secs = std::env::var(ENV_GEN_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);
        Self::new(backend).with_timeout(Duration::from_secs(secs))
    }

    /// Override the generation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(title: &str, text: &str) -> String {
        let excerpt: String = text.chars().take(DIGEST_INPUT_MAX_CHARS).collect();
        format!("Title: {}\n\nPaper text:\n{}", title.trim(), excerpt.trim())
    }
}

#[async_trait]
impl PaperDigester for LlmDigester {
    async fn digest(&self, title: &str, text: &str) -> Result<PaperDigest> {
        let start = Instant::now();
        let prompt = Self::build_prompt(title, text);

        let raw = tokio::time::timeout(
            self.timeout,
            self.backend.generate_json_with_system(SYSTEM_PROMPT, &prompt),
        )
        .await
        .map_err(|_| {
            warn!(
                subsystem = "inference",
                component = "digester",
                model = %self.backend.model_name(),
                timeout_secs = self.timeout.as_secs(),
                "Generation timed out"
            );
            Error::UpstreamTimeout(format!(
                "Generation did not finish within {}s",
                self.timeout.as_secs()
            ))
        })??;

        let digest = parse_digest(&raw)?;
        debug!(
            subsystem = "inference",
            component = "digester",
            model = %self.backend.model_name(),
            keyword_count = digest.keywords.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Paper digested"
        );
        Ok(digest)
    }
}

/// Parse and validate a model answer.
///
/// Tolerates Markdown code fences and prose around the JSON object. Fails
/// with `Inference` when no object parses or the summary is blank.
pub fn parse_digest(raw: &str) -> Result<PaperDigest> {
    let body = extract_json_object(raw)
        .ok_or_else(|| Error::Inference("Model response contains no JSON object".to_string()))?;

    let digest: PaperDigest = serde_json::from_str(body)
        .map_err(|e| Error::Inference(format!("Malformed model response: {}", e)))?;

    let summary = digest.summary.trim().to_string();
    if summary.is_empty() {
        return Err(Error::Inference("Model returned an empty summary".to_string()));
    }

    let mut keywords = normalize_keywords(&digest.keywords);
    keywords.truncate(DIGEST_MAX_KEYWORDS);

    Ok(PaperDigest { summary, keywords })
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;

    #[test]
    fn test_parse_plain_json() {
        let digest = parse_digest(
            r#"{"summary": "We propose the Transformer.", "keywords": ["Transformer", "attention"]}"#,
        )
        .unwrap();
        assert_eq!(digest.summary, "We propose the Transformer.");
        assert_eq!(digest.keywords, vec!["Transformer", "attention"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Sure!\n```json\n{\"summary\": \" S \", \"keywords\": []}\n```";
        let digest = parse_digest(raw).unwrap();
        assert_eq!(digest.summary, "S");
        assert!(digest.keywords.is_empty());
    }

    #[test]
    fn test_parse_missing_keywords_defaults_empty() {
        let digest = parse_digest(r#"{"summary": "S"}"#).unwrap();
        assert!(digest.keywords.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_digest("no json here"), Err(Error::Inference(_))));
        assert!(matches!(parse_digest("{not json}"), Err(Error::Inference(_))));
    }

    #[test]
    fn test_parse_rejects_blank_summary() {
        let err = parse_digest(r#"{"summary": "   ", "keywords": ["a"]}"#).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_parse_dedupes_and_caps_keywords() {
        let many: Vec<String> = (0..30).map(|i| format!("\"k{i}\"")).collect();
        let raw = format!(
            r#"{{"summary": "S", "keywords": ["Graph", "graph", {}]}}"#,
            many.join(",")
        );
        let digest = parse_digest(&raw).unwrap();
        assert_eq!(digest.keywords.len(), DIGEST_MAX_KEYWORDS);
        assert_eq!(digest.keywords[0], "Graph");
        assert_eq!(digest.keywords[1], "k0");
    }

    #[test]
    fn test_prompt_truncates_long_text() {
        let text = "x".repeat(DIGEST_INPUT_MAX_CHARS * 2);
        let prompt = LlmDigester::build_prompt("T", &text);
        assert!(prompt.len() < DIGEST_INPUT_MAX_CHARS + 64);
    }

    #[tokio::test]
    async fn test_digest_uses_backend_response() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response(r#"{"summary": "A summary.", "keywords": ["Transformer"]}"#);
        let digester = LlmDigester::new(Arc::new(backend.clone()));

        let digest = digester.digest("Attention", "text").await.unwrap();
        assert_eq!(digest.summary, "A summary.");
        assert_eq!(backend.generate_call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_digest_times_out() {
        let backend = MockGenerationBackend::new().with_latency_ms(5_000);
        let digester =
            LlmDigester::new(Arc::new(backend)).with_timeout(Duration::from_millis(100));

        let err = digester.digest("T", "text").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamTimeout(_)));
    }

    #[tokio::test]
    async fn test_digest_propagates_backend_failure() {
        let backend = MockGenerationBackend::new().failing();
        let digester = LlmDigester::new(Arc::new(backend));

        let err = digester.digest("T", "text").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
