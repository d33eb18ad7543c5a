//! Paper Record Service.
//!
//! Orchestrates the paper lifecycle (upload, finalize, generate) and the label
//! use cases on top of the three repositories. Suggestion state is never
//! stored: every read and every label mutation recomputes it from the current
//! keywords, label set and associations.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn, Span};
use uuid::Uuid;

use papyr_core::defaults::MAX_UPLOAD_BYTES;
use papyr_core::{
    logging, render_summary_document, sanitize_filename, split_attached, suggest,
    title_from_filename, validate_upload, Error, FinalizePaper, Label, LabelRepository,
    LabelSuggestion, NewPaper, Paper, PaperDetail, PaperDigester, PaperLabelRepository,
    PaperListItem, PaperRepository, Result, TextExtractor, UploadedPaper,
};
use papyr_db::{Database, MemoryStore};

/// A label created from a paper's page, with the recomputed suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSelection {
    pub label: Label,
    pub suggestions: Vec<LabelSuggestion>,
}

/// A rendered LaTeX document ready for download.
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    pub filename: String,
    pub body: String,
}

/// Service for paper records and their labels.
pub struct PaperService {
    papers: Arc<dyn PaperRepository>,
    labels: Arc<dyn LabelRepository>,
    paper_labels: Arc<dyn PaperLabelRepository>,
    extractor: Arc<dyn TextExtractor>,
    digester: Arc<dyn PaperDigester>,
    max_upload_bytes: usize,
}

impl PaperService {
    pub fn new(
        papers: Arc<dyn PaperRepository>,
        labels: Arc<dyn LabelRepository>,
        paper_labels: Arc<dyn PaperLabelRepository>,
        extractor: Arc<dyn TextExtractor>,
        digester: Arc<dyn PaperDigester>,
    ) -> Self {
        Self {
            papers,
            labels,
            paper_labels,
            extractor,
            digester,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Service backed by PostgreSQL repositories.
    pub fn with_database(
        db: &Database,
        extractor: Arc<dyn TextExtractor>,
        digester: Arc<dyn PaperDigester>,
    ) -> Self {
        Self::new(
            db.papers.clone(),
            db.labels.clone(),
            db.paper_labels.clone(),
            extractor,
            digester,
        )
    }

    /// Service backed by a single in-memory store.
    pub fn in_memory(
        store: Arc<MemoryStore>,
        extractor: Arc<dyn TextExtractor>,
        digester: Arc<dyn PaperDigester>,
    ) -> Self {
        Self::new(store.clone(), store.clone(), store, extractor, digester)
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    // =========================================================================
    // PAPER LIFECYCLE
    // =========================================================================

    /// Store an uploaded PDF as a new `Uploaded` paper.
    ///
    /// Nothing is written when validation or extraction fails.
    #[instrument(skip(self, data, title), fields(subsystem = "api", component = "paper_service", op = "upload", input_bytes = data.len()))]
    pub async fn upload(
        &self,
        filename: &str,
        data: &[u8],
        title: Option<&str>,
    ) -> Result<UploadedPaper> {
        let start = Instant::now();
        validate_upload(filename, data, self.max_upload_bytes)?;

        let text = self.extractor.extract(data, filename).await?;
        if text.is_empty() {
            warn!(
                extractor = self.extractor.name(),
                filename, "Extracted text is empty, storing paper without text"
            );
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| title_from_filename(filename));

        let paper = self
            .papers
            .insert(NewPaper {
                title,
                raw_text: text,
            })
            .await?;

        info!(
            paper_id = %paper.id,
            text_len = paper.raw_text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Paper uploaded"
        );
        Ok(UploadedPaper {
            paper_id: paper.id,
            text: paper.raw_text,
        })
    }

    /// Apply caller-supplied title, summary and keywords.
    #[instrument(skip(self, title, summary, keywords), fields(subsystem = "api", component = "paper_service", op = "finalize", paper_id = %paper_id))]
    pub async fn finalize_upload(
        &self,
        paper_id: Uuid,
        title: &str,
        summary: &str,
        keywords: &[String],
    ) -> Result<Paper> {
        let input = FinalizePaper::new(title, summary, keywords).map_err(Error::InvalidInput)?;
        let paper = self.papers.finalize(paper_id, input).await?;
        info!(keyword_count = paper.keywords.len(), "Paper finalized");
        Ok(paper)
    }

    /// Generate summary and keywords server-side, then finalize.
    ///
    /// On timeout or malformed output the paper stays `Uploaded`.
    #[instrument(skip(self, title), fields(subsystem = "api", component = "paper_service", op = "generate", paper_id = %paper_id))]
    pub async fn generate(&self, paper_id: Uuid, title: Option<&str>) -> Result<Paper> {
        let start = Instant::now();
        let paper = self.papers.fetch(paper_id).await?;
        if paper.is_finalized() {
            return Err(Error::Conflict(format!(
                "Paper {} is already finalized",
                paper_id
            )));
        }
        if paper.raw_text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Paper has no extracted text to summarize".to_string(),
            ));
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(paper.title.as_str())
            .to_string();

        let digest = self.digester.digest(&title, &paper.raw_text).await?;
        let input = FinalizePaper::new(&title, &digest.summary, &digest.keywords)
            .map_err(Error::Inference)?;
        let paper = self.papers.finalize(paper_id, input).await?;

        info!(
            keyword_count = paper.keywords.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Paper generated and finalized"
        );
        Ok(paper)
    }

    /// All papers, newest first, each with its attached labels.
    ///
    /// A failed label lookup degrades to empty label lists.
    #[instrument(skip(self), fields(subsystem = "api", component = "paper_service", op = "list_papers", result_count = tracing::field::Empty))]
    pub async fn list_papers(&self) -> Result<Vec<PaperListItem>> {
        let papers = self.papers.list().await?;
        let ids: Vec<Uuid> = papers.iter().map(|p| p.id).collect();

        let mut labels_by_paper = match self.paper_labels.labels_for_papers(&ids).await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Label lookup failed, listing papers without labels");
                Default::default()
            }
        };

        let items: Vec<PaperListItem> = papers
            .into_iter()
            .map(|paper| PaperListItem {
                labels: labels_by_paper.remove(&paper.id).unwrap_or_default(),
                id: paper.id,
                title: paper.title,
                status: paper.status,
            })
            .collect();

        Span::current().record(logging::RESULT_COUNT, items.len());
        Ok(items)
    }

    pub async fn get_summary(&self, paper_id: Uuid) -> Result<String> {
        Ok(self.papers.fetch(paper_id).await?.summary)
    }

    pub async fn get_keywords(&self, paper_id: Uuid) -> Result<Vec<String>> {
        Ok(self.papers.fetch(paper_id).await?.keywords)
    }

    pub async fn get_labels(&self, paper_id: Uuid) -> Result<Vec<Label>> {
        if !self.papers.exists(paper_id).await? {
            return Err(Error::PaperNotFound(paper_id));
        }
        self.paper_labels.labels_for_paper(paper_id).await
    }

    /// Render the summary as a standalone LaTeX document.
    pub async fn summary_latex(&self, paper_id: Uuid) -> Result<SummaryDocument> {
        let paper = self.papers.fetch(paper_id).await?;
        if !paper.is_finalized() || paper.summary.trim().is_empty() {
            return Err(Error::Conflict(format!(
                "Paper {} has no summary yet",
                paper_id
            )));
        }

        Ok(SummaryDocument {
            filename: format!("{}.tex", sanitize_filename(&paper.title)),
            body: render_summary_document(&paper.title, &paper.summary, &paper.keywords),
        })
    }

    // =========================================================================
    // DETAIL VIEW AND SUGGESTIONS
    // =========================================================================

    /// The composite paper detail view.
    ///
    /// The paper, the label set and the paper's associations are read
    /// concurrently. A missing paper fails the request; a failed label or
    /// association read degrades that facet to empty.
    #[instrument(skip(self), fields(subsystem = "api", component = "paper_service", op = "get_detail", paper_id = %paper_id, result_count = tracing::field::Empty))]
    pub async fn get_detail(&self, paper_id: Uuid) -> Result<PaperDetail> {
        let (paper, all_labels, attached) = self.read_facets(paper_id).await?;

        let attached_ids: HashSet<Uuid> = attached.iter().map(|l| l.id).collect();
        let (_, suggested) = split_attached(suggest(&paper.keywords, &all_labels, &attached_ids));
        Span::current().record(logging::RESULT_COUNT, suggested.len());

        Ok(PaperDetail {
            id: paper.id,
            title: paper.title,
            status: paper.status,
            summary: paper.summary,
            keywords: paper.keywords,
            attached_labels: attached,
            suggested_labels: suggested,
        })
    }

    /// Keyword-matched labels for a paper, each tagged attached or not.
    #[instrument(skip(self), fields(subsystem = "api", component = "paper_service", op = "related_labels", paper_id = %paper_id, result_count = tracing::field::Empty))]
    pub async fn related_labels(&self, paper_id: Uuid) -> Result<Vec<LabelSuggestion>> {
        let (paper, all_labels, attached) = self.read_facets(paper_id).await?;

        let attached_ids: HashSet<Uuid> = attached.iter().map(|l| l.id).collect();
        let suggestions = suggest(&paper.keywords, &all_labels, &attached_ids);
        Span::current().record(logging::RESULT_COUNT, suggestions.len());
        Ok(suggestions)
    }

    async fn read_facets(&self, paper_id: Uuid) -> Result<(Paper, Vec<Label>, Vec<Label>)> {
        let (paper, all_labels, attached) = tokio::join!(
            self.papers.fetch(paper_id),
            self.labels.list(),
            self.paper_labels.labels_for_paper(paper_id),
        );
        let paper = paper?;

        let all_labels = all_labels.unwrap_or_else(|e| {
            warn!(paper_id = %paper_id, error = %e, "Label set unavailable, returning no suggestions");
            Vec::new()
        });
        let attached = attached.unwrap_or_else(|e| {
            warn!(paper_id = %paper_id, error = %e, "Attached labels unavailable, returning none");
            Vec::new()
        });
        Ok((paper, all_labels, attached))
    }

    // =========================================================================
    // LABELS
    // =========================================================================

    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        self.labels.list().await
    }

    pub async fn get_label(&self, label_id: Uuid) -> Result<Label> {
        self.labels.get(label_id).await
    }

    /// Create a label, or return the existing one with the same name.
    #[instrument(skip(self, name), fields(subsystem = "api", component = "paper_service", op = "create_label", label_id = tracing::field::Empty))]
    pub async fn create_label(&self, name: &str) -> Result<Label> {
        let label = self.labels.create(name).await?;
        Span::current().record(logging::LABEL_ID, tracing::field::display(label.id));
        Ok(label)
    }

    /// Create a label from a paper's page without attaching it.
    ///
    /// The paper is checked first so an unknown id creates nothing.
    pub async fn create_label_and_select(&self, paper_id: Uuid, name: &str) -> Result<LabelSelection> {
        if !self.papers.exists(paper_id).await? {
            return Err(Error::PaperNotFound(paper_id));
        }
        let label = self.create_label(name).await?;
        let suggestions = self.related_labels(paper_id).await?;
        Ok(LabelSelection { label, suggestions })
    }

    /// Attach a label and return the recomputed detail view.
    #[instrument(skip(self), fields(subsystem = "api", component = "paper_service", op = "attach", paper_id = %paper_id, label_id = %label_id))]
    pub async fn attach_label(&self, paper_id: Uuid, label_id: Uuid) -> Result<PaperDetail> {
        let added = self.paper_labels.attach(paper_id, label_id).await?;
        if !added {
            info!("Label already attached");
        }
        self.get_detail(paper_id).await
    }

    /// Detach a label and return the recomputed detail view.
    #[instrument(skip(self), fields(subsystem = "api", component = "paper_service", op = "detach", paper_id = %paper_id, label_id = %label_id))]
    pub async fn detach_label(&self, paper_id: Uuid, label_id: Uuid) -> Result<PaperDetail> {
        let removed = self.paper_labels.detach(paper_id, label_id).await?;
        if !removed {
            info!("Label was not attached");
        }
        self.get_detail(paper_id).await
    }
}
