//! # papyr-inference
//!
//! External collaborators for papyr:
//! - Ollama generation backend (default, feature `ollama`)
//! - LLM-backed paper digester producing a summary and keywords
//! - `pdftotext` text extractor for uploaded PDFs
//! - Mock generation backend (tests, or feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use papyr_core::PaperDigester;
//! use papyr_inference::{LlmDigester, OllamaBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let digester = LlmDigester::new(Arc::new(OllamaBackend::from_env()));
//!     let digest = digester.digest("Attention Is All You Need", "...").await.unwrap();
//!     println!("{}", digest.summary);
//! }
//! ```

pub mod digester;
pub mod pdf_text;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use digester::{parse_digest, LlmDigester};
pub use pdf_text::PdfTextExtractor;

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerationBackend;

pub use papyr_core::{GenerationBackend, PaperDigester, TextExtractor};
