//! PDF text extraction via `pdftotext` (poppler-utils).

use std::io::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

use papyr_core::defaults::{ENV_EXTRACT_TIMEOUT_SECS, EXTRACTION_CMD_TIMEOUT_SECS};
use papyr_core::file_safety::PDF_MAGIC;
use papyr_core::{Error, Result, TextExtractor};

const PDFTOTEXT: &str = "pdftotext";

/// Extracts text from PDFs by shelling out to `pdftotext <file> -`.
///
/// Each invocation is bounded by `timeout_secs`; a hung process is killed
/// and reported as `UpstreamTimeout`.
pub struct PdfTextExtractor {
    program: String,
    timeout_secs: u64,
}

impl PdfTextExtractor {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            program: PDFTOTEXT.to_string(),
            timeout_secs,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var(ENV_EXTRACT_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(EXTRACTION_CMD_TIMEOUT_SECS);
        Self::new(timeout_secs)
    }

    /// Use a different executable with the same `<file> -` calling convention.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Check that the extraction binary is installed.
    ///
    /// `pdftotext -v` exits with 0 or 99 depending on the poppler version.
    pub async fn health_check(&self) -> bool {
        match Command::new(&self.program).arg("-v").output().await {
            Ok(output) => matches!(output.status.code(), Some(0) | Some(99)),
            Err(e) => {
                warn!(program = %self.program, error = %e, "Text extractor not available");
                false
            }
        }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new(EXTRACTION_CMD_TIMEOUT_SECS)
    }
}

/// Run a command with a timeout, returning stdout as a string.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    cmd.kill_on_drop(true);
    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| {
            Error::UpstreamTimeout(format!(
                "External command timed out after {}s",
                timeout_secs
            ))
        })?
        .map_err(|e| Error::Extraction(format!("Failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "Command failed ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: &[u8], filename: &str) -> Result<String> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(Error::InvalidInput(format!(
                "File '{}' is not a valid PDF (missing %PDF header)",
                filename
            )));
        }

        let start = Instant::now();
        let mut tmpfile = NamedTempFile::new()
            .map_err(|e| Error::Internal(format!("Failed to create temp file: {}", e)))?;
        tmpfile
            .write_all(data)
            .map_err(|e| Error::Internal(format!("Failed to write temp file: {}", e)))?;

        let text = run_cmd_with_timeout(
            Command::new(&self.program).arg(tmpfile.path()).arg("-"),
            self.timeout_secs,
        )
        .await?;

        let text = text.trim().to_string();
        if text.is_empty() {
            warn!(
                subsystem = "inference",
                component = "pdf_text",
                filename,
                "No text layer found in PDF"
            );
        }
        debug!(
            subsystem = "inference",
            component = "pdf_text",
            filename,
            input_bytes = data.len(),
            text_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Text extracted"
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        PDFTOTEXT
    }
}
