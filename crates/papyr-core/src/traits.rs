//! Core traits for papyr abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// PAPER REPOSITORY
// =============================================================================

/// Repository for paper records.
#[async_trait]
pub trait PaperRepository: Send + Sync {
    /// Insert a freshly uploaded paper in the `Uploaded` state.
    async fn insert(&self, paper: NewPaper) -> Result<Paper>;

    /// Fetch a paper by id. Fails with `PaperNotFound`.
    async fn fetch(&self, id: Uuid) -> Result<Paper>;

    /// List all papers, newest first.
    async fn list(&self) -> Result<Vec<Paper>>;

    /// Apply the one-time `Uploaded -> Finalized` transition.
    ///
    /// The status check and the write happen as one step: when two callers
    /// race, exactly one succeeds and the other gets `Conflict`.
    async fn finalize(&self, id: Uuid, input: FinalizePaper) -> Result<Paper>;

    /// Check whether a paper exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// LABEL REPOSITORY
// =============================================================================

/// Repository for the global label set.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Create a label, or return the existing one with the same name key.
    ///
    /// The name is normalized first; an empty or invalid name fails with
    /// `InvalidInput`.
    async fn create(&self, name: &str) -> Result<Label>;

    /// List all labels ordered by name key, then id.
    async fn list(&self) -> Result<Vec<Label>>;

    /// Get a label by id. Fails with `LabelNotFound`.
    async fn get(&self, id: Uuid) -> Result<Label>;

    /// Look up a label by name, case-insensitively.
    async fn get_by_name(&self, name: &str) -> Result<Option<Label>>;
}

// =============================================================================
// PAPER-LABEL ASSOCIATIONS
// =============================================================================

/// Repository for the paper-label relation.
#[async_trait]
pub trait PaperLabelRepository: Send + Sync {
    /// Attach a label to a paper.
    ///
    /// Idempotent. Returns `true` when a new association was written. Fails
    /// with `PaperNotFound` or `LabelNotFound` when either side is missing.
    async fn attach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool>;

    /// Detach a label from a paper.
    ///
    /// Idempotent: detaching a missing association is a no-op returning
    /// `false`.
    async fn detach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool>;

    /// Labels attached to a paper, ordered by name key.
    async fn labels_for_paper(&self, paper_id: Uuid) -> Result<Vec<Label>>;

    /// Attached labels for a batch of papers. Papers without labels are absent.
    async fn labels_for_papers(&self, paper_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Label>>>;
}

// =============================================================================
// EXTERNAL COLLABORATORS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate text constrained to a JSON object.
    ///
    /// Backends without a JSON mode fall back to plain generation.
    async fn generate_json_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_with_system(system, prompt).await
    }

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Produces a summary and keywords for a paper's text.
#[async_trait]
pub trait PaperDigester: Send + Sync {
    /// Digest a paper. Malformed model output fails with `Inference`.
    async fn digest(&self, title: &str, text: &str) -> Result<PaperDigest>;
}

/// Extracts plain text from an uploaded document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract text from raw document bytes.
    async fn extract(&self, data: &[u8], filename: &str) -> Result<String>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
