//! Core data models for papyr.
//!
//! These types are shared across all papyr crates and represent
//! the core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::suggest::LabelSuggestion;

// =============================================================================
// PAPER TYPES
// =============================================================================

/// Processing state of a paper.
///
/// A paper starts `Uploaded` (text extracted, summary and keywords empty) and
/// moves to `Finalized` exactly once. Labels can be attached in either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaperStatus {
    #[default]
    Uploaded,
    Finalized,
}

impl PaperStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(Self::Uploaded),
            "finalized" => Ok(Self::Finalized),
            _ => Err(format!("Invalid paper status: {}", s)),
        }
    }
}

/// A research paper record.
///
/// The label set is not a field: it is the derived paper-label relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub title: String,
    /// Text extracted from the uploaded PDF.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_text: String,
    pub summary: String,
    /// Ordered keyword cache produced at finalize time.
    pub keywords: Vec<String>,
    pub status: PaperStatus,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub finalized_at_utc: Option<DateTime<Utc>>,
}

impl Paper {
    pub fn is_finalized(&self) -> bool {
        self.status == PaperStatus::Finalized
    }
}

/// Input for inserting a freshly uploaded paper.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub title: String,
    pub raw_text: String,
}

/// Validated input for the one-time `Uploaded -> Finalized` transition.
///
/// Build with [`FinalizePaper::new`], which enforces non-blank title and
/// summary and normalizes the keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizePaper {
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
}

impl FinalizePaper {
    pub fn new(
        title: &str,
        summary: &str,
        keywords: &[String],
    ) -> std::result::Result<Self, String> {
        let title = title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        if title.chars().count() > crate::defaults::TITLE_MAX_CHARS {
            return Err(format!(
                "Title must be {} characters or less",
                crate::defaults::TITLE_MAX_CHARS
            ));
        }
        let summary = summary.trim();
        if summary.is_empty() {
            return Err("Summary is required".to_string());
        }
        Ok(Self {
            title: title.to_string(),
            summary: summary.to_string(),
            keywords: normalize_keywords(keywords),
        })
    }
}

/// Trim keywords, drop blanks and drop case-insensitive duplicates.
///
/// First occurrence wins, so the extractor's ordering is kept.
pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .iter()
        .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}

/// Response to an upload: the new paper id and its extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedPaper {
    pub paper_id: Uuid,
    pub text: String,
}

/// Paper list entry with its attached labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperListItem {
    pub id: Uuid,
    pub title: String,
    pub status: PaperStatus,
    pub labels: Vec<Label>,
}

// =============================================================================
// LABEL TYPES
// =============================================================================

/// A named tag attachable to papers, stored once and referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
}

impl Label {
    /// Case-insensitive uniqueness key for this label's name.
    pub fn name_key(&self) -> String {
        crate::labels::label_name_key(&self.name)
    }
}

// =============================================================================
// COMPOSITE VIEWS
// =============================================================================

/// The paper detail view.
///
/// `attached_labels` and `suggested_labels` are disjoint by construction:
/// suggestions only ever hold labels that matched a keyword and are not
/// attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperDetail {
    pub id: Uuid,
    pub title: String,
    pub status: PaperStatus,
    pub summary: String,
    pub keywords: Vec<String>,
    pub attached_labels: Vec<Label>,
    pub suggested_labels: Vec<LabelSuggestion>,
}

/// Summary and keywords produced by the generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperDigest {
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}
