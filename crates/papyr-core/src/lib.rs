//! # papyr-core
//!
//! Core types, traits, and the label suggestion engine for papyr.
//!
//! This crate provides the domain model and trait definitions that the other
//! papyr crates depend on. Nothing here performs I/O.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod labels;
pub mod latex;
pub mod logging;
pub mod models;
pub mod suggest;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::{sanitize_filename, title_from_filename, validate_upload};
pub use labels::{label_name_key, normalize_label_name};
pub use latex::render_summary_document;
pub use models::*;
pub use suggest::{normalize_term, split_attached, suggest, LabelSuggestion, MatchKind};
pub use traits::*;
