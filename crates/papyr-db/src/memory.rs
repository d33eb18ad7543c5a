//! In-memory implementation of the paper, label and association repositories.
//!
//! Backs the service and HTTP test suites and local runs without Postgres.
//! All three relations live behind one `tokio::sync::RwLock`, so every
//! operation observes and mutates a consistent snapshot, mirroring the
//! constraints the Postgres schema enforces (unique `name_key`, primary key
//! on `(paper_id, label_id)`, conditional finalize).

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use papyr_core::{
    label_name_key, normalize_label_name, Error, FinalizePaper, Label, LabelRepository, NewPaper,
    Paper, PaperLabelRepository, PaperRepository, PaperStatus, Result,
};

#[derive(Default)]
struct MemoryState {
    papers: HashMap<Uuid, Paper>,
    /// Insertion order, oldest first.
    paper_order: Vec<Uuid>,
    labels: HashMap<Uuid, Label>,
    label_keys: HashMap<String, Uuid>,
    associations: BTreeSet<(Uuid, Uuid)>,
}

impl MemoryState {
    fn sorted_labels<'a>(&self, labels: impl Iterator<Item = &'a Label>) -> Vec<Label> {
        let mut out: Vec<Label> = labels.cloned().collect();
        out.sort_by(|a, b| a.name_key().cmp(&b.name_key()).then(a.id.cmp(&b.id)));
        out
    }
}

/// In-memory store implementing all three repository traits.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored associations.
    pub async fn association_count(&self) -> usize {
        self.state.read().await.associations.len()
    }
}

#[async_trait]
impl PaperRepository for MemoryStore {
    async fn insert(&self, paper: NewPaper) -> Result<Paper> {
        let now = Utc::now();
        let record = Paper {
            id: Uuid::now_v7(),
            title: paper.title,
            raw_text: paper.raw_text,
            summary: String::new(),
            keywords: Vec::new(),
            status: PaperStatus::Uploaded,
            created_at_utc: now,
            updated_at_utc: now,
            finalized_at_utc: None,
        };

        let mut state = self.state.write().await;
        state.paper_order.push(record.id);
        state.papers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: Uuid) -> Result<Paper> {
        self.state
            .read()
            .await
            .papers
            .get(&id)
            .cloned()
            .ok_or(Error::PaperNotFound(id))
    }

    async fn list(&self) -> Result<Vec<Paper>> {
        let state = self.state.read().await;
        Ok(state
            .paper_order
            .iter()
            .rev()
            .filter_map(|id| state.papers.get(id).cloned())
            .collect())
    }

    async fn finalize(&self, id: Uuid, input: FinalizePaper) -> Result<Paper> {
        let mut state = self.state.write().await;
        let paper = state.papers.get_mut(&id).ok_or(Error::PaperNotFound(id))?;
        if paper.status != PaperStatus::Uploaded {
            return Err(Error::Conflict(format!(
                "Paper {} is already finalized",
                id
            )));
        }

        let now = Utc::now();
        paper.title = input.title;
        paper.summary = input.summary;
        paper.keywords = input.keywords;
        paper.status = PaperStatus::Finalized;
        paper.updated_at_utc = now;
        paper.finalized_at_utc = Some(now);
        Ok(paper.clone())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.read().await.papers.contains_key(&id))
    }
}

#[async_trait]
impl LabelRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<Label> {
        let name = normalize_label_name(name)?;
        let key = label_name_key(&name);

        let mut state = self.state.write().await;
        if let Some(existing) = state.label_keys.get(&key).and_then(|id| state.labels.get(id)) {
            return Ok(existing.clone());
        }

        let label = Label {
            id: Uuid::now_v7(),
            name,
        };
        state.label_keys.insert(key, label.id);
        state.labels.insert(label.id, label.clone());
        Ok(label)
    }

    async fn list(&self) -> Result<Vec<Label>> {
        let state = self.state.read().await;
        Ok(state.sorted_labels(state.labels.values()))
    }

    async fn get(&self, id: Uuid) -> Result<Label> {
        self.state
            .read()
            .await
            .labels
            .get(&id)
            .cloned()
            .ok_or(Error::LabelNotFound(id))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Label>> {
        let key = label_name_key(name);
        let state = self.state.read().await;
        Ok(state
            .label_keys
            .get(&key)
            .and_then(|id| state.labels.get(id))
            .cloned())
    }
}

#[async_trait]
impl PaperLabelRepository for MemoryStore {
    async fn attach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.papers.contains_key(&paper_id) {
            return Err(Error::PaperNotFound(paper_id));
        }
        if !state.labels.contains_key(&label_id) {
            return Err(Error::LabelNotFound(label_id));
        }
        Ok(state.associations.insert((paper_id, label_id)))
    }

    async fn detach(&self, paper_id: Uuid, label_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .write()
            .await
            .associations
            .remove(&(paper_id, label_id)))
    }

    async fn labels_for_paper(&self, paper_id: Uuid) -> Result<Vec<Label>> {
        let state = self.state.read().await;
        let attached = state
            .associations
            .range((paper_id, Uuid::nil())..=(paper_id, Uuid::from_u128(u128::MAX)))
            .filter_map(|(_, label_id)| state.labels.get(label_id));
        Ok(state.sorted_labels(attached))
    }

    async fn labels_for_papers(&self, paper_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Label>>> {
        let mut out = HashMap::new();
        for paper_id in paper_ids {
            let labels = self.labels_for_paper(*paper_id).await?;
            if !labels.is_empty() {
                out.insert(*paper_id, labels);
            }
        }
        Ok(out)
    }
}
