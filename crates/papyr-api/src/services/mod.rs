//! Service layer for business logic.

pub mod paper_service;

pub use paper_service::{LabelSelection, PaperService, SummaryDocument};
