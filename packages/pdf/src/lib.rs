#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Payslip PDF text extraction and rubric pattern matching.
//!
//! Payslip documents are flattened into a single text buffer using
//! pure-Rust text extraction ([`pdf_extract`]). Each employee's share of
//! that buffer is delimited with [`section`], and the payroll values inside
//! it are located with the regex patterns held by [`rubrics::RubricRegistry`].

pub mod rubrics;
pub mod section;

use std::path::{Path, PathBuf};

/// Errors specific to payslip text extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The payslip document does not exist.
    #[error("PDF document not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// A rubric regex pattern failed to compile.
    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// A rubric regex pattern compiled but cannot capture a value.
    #[error("Pattern for rubric '{rubric}' has no capture group: {pattern}")]
    Pattern {
        /// Rubric the pattern was configured for.
        rubric: String,
        /// The offending pattern.
        pattern: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads the PDF at `path` and returns the text of every page, in page
/// order, concatenated without separators.
///
/// # Errors
///
/// * [`PdfError::NotFound`] if `path` does not exist
/// * [`PdfError::Io`] if the file cannot be read
/// * [`PdfError::Extraction`] if the document cannot be parsed
pub fn extract_text(path: &Path) -> Result<String, PdfError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PdfError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            PdfError::Io(e)
        }
    })?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    extract_text_from_mem(&bytes)
}

/// Extracts the text of an in-memory PDF document, pages concatenated in
/// order without separators.
///
/// # Errors
///
/// Returns [`PdfError::Extraction`] if the document cannot be parsed.
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String, PdfError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    let text = pages.concat();

    log::debug!(
        "Extracted {} characters of text from {} page(s)",
        text.chars().count(),
        pages.len()
    );

    Ok(text)
}
