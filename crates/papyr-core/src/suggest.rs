//! Label suggestion engine.
//!
//! Ranks the global label set against a paper's keyword evidence. The engine
//! is a pure function of its three inputs (keywords, labels, attached ids)
//! and is recomputed on every read; nothing here is persisted or cached.
//!
//! # Matching
//!
//! Keywords and label names are compared on a normalized form: lowercase,
//! whitespace collapsed, punctuation stripped from word edges, and a light
//! plural stem (`transformers` -> `transformer`).
//!
//! | Kind | Rule |
//! |------|------|
//! | `Exact` | normalized forms are equal |
//! | `Partial` | one form contains the other (shorter side >= 3 chars) |
//! | `Partial` | a shorter form equals a whole word of the other |
//!
//! Words are split on whitespace and `-`, so `AI` matches `AI safety` and
//! `multi-agent RL` but never `paint`.
//!
//! # Ordering
//!
//! 1. Attached labels first
//! 2. `Exact` before `Partial`
//! 3. Label name key (case-insensitive), then label id

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::SUGGEST_MIN_PARTIAL_CHARS;
use crate::labels::label_name_key;
use crate::models::Label;

/// How strongly a label matched the paper's keywords.
///
/// Variant order is match strength: `Exact` sorts before `Partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Partial,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// One suggestion entry: a keyword-matched label and whether the paper
/// already carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSuggestion {
    #[serde(flatten)]
    pub label: Label,
    pub is_attached: bool,
    pub match_kind: MatchKind,
}

/// Compute the ranked, deduplicated candidate list for a paper.
///
/// Empty keywords or an empty label set yield an empty list. Blank keywords
/// and labels whose names normalize to nothing are skipped. A label listed
/// twice under the same id appears once, with its best match.
pub fn suggest(
    keywords: &[String],
    labels: &[Label],
    attached: &HashSet<Uuid>,
) -> Vec<LabelSuggestion> {
    let terms: Vec<String> = keywords
        .iter()
        .map(|k| normalize_term(k))
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() || labels.is_empty() {
        return Vec::new();
    }

    let mut best: HashMap<Uuid, (MatchKind, &Label)> = HashMap::new();
    for label in labels {
        let name = normalize_term(&label.name);
        if name.is_empty() {
            continue;
        }
        let Some(kind) = terms.iter().filter_map(|t| match_terms(t, &name)).min() else {
            continue;
        };
        best.entry(label.id)
            .and_modify(|slot| {
                if kind < slot.0 {
                    *slot = (kind, label);
                }
            })
            .or_insert((kind, label));
    }

    let mut ranked: Vec<(String, LabelSuggestion)> = best
        .into_values()
        .map(|(kind, label)| {
            (
                label_name_key(&label.name),
                LabelSuggestion {
                    label: label.clone(),
                    is_attached: attached.contains(&label.id),
                    match_kind: kind,
                },
            )
        })
        .collect();

    ranked.sort_by(|(a_key, a), (b_key, b)| {
        b.is_attached
            .cmp(&a.is_attached)
            .then(a.match_kind.cmp(&b.match_kind))
            .then_with(|| a_key.cmp(b_key))
            .then(a.label.id.cmp(&b.label.id))
    });

    ranked.into_iter().map(|(_, s)| s).collect()
}

/// Split a suggestion list into attached labels and the
/// suggested-but-not-attached remainder, preserving order.
pub fn split_attached(suggestions: Vec<LabelSuggestion>) -> (Vec<Label>, Vec<LabelSuggestion>) {
    let (attached, open): (Vec<_>, Vec<_>) =
        suggestions.into_iter().partition(|s| s.is_attached);
    (attached.into_iter().map(|s| s.label).collect(), open)
}

/// Normalize a keyword or label name for comparison.
pub fn normalize_term(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|word| stem(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn stem(word: &str) -> String {
    if word.chars().count() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn match_terms(keyword: &str, name: &str) -> Option<MatchKind> {
    if keyword == name {
        return Some(MatchKind::Exact);
    }
    let (shorter, longer) = if keyword.len() <= name.len() {
        (keyword, name)
    } else {
        (name, keyword)
    };
    let partial = if shorter.chars().count() >= SUGGEST_MIN_PARTIAL_CHARS {
        longer.contains(shorter)
    } else {
        longer
            .split(|c: char| c.is_whitespace() || c == '-')
            .any(|word| word == shorter)
    };
    partial.then_some(MatchKind::Partial)
}
