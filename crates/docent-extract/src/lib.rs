//! PDF validation and text extraction.
//!
//! Implements the text-extractor side of the upload flow: validate the
//! uploaded bytes, pull the whole document's text out with [`pdf_extract`],
//! and build the additive metadata map the store keeps alongside the text.
//! Pages are recovered from the form-feed separators `pdf_extract` emits
//! between pages and rendered with `--- Page N ---` markers so downstream
//! prompts can reference page positions.

use serde_json::{Map, Value};
use thiserror::Error;

/// Magic bytes every PDF body must start with.
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("not a PDF: {0}")]
    NotPdf(String),
    #[error("empty upload")]
    Empty,
    #[error("PDF parse error: {0}")]
    Parse(String),
    #[error("no extractable text in document")]
    EmptyDocument,
}

impl ExtractError {
    /// Whether this failure is the uploader's fault (size/type checks) as
    /// opposed to a parse failure inside a plausible PDF.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExtractError::TooLarge { .. } | ExtractError::NotPdf(_) | ExtractError::Empty
        )
    }
}

/// Extracted document text plus the page count it was assembled from.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub pages: usize,
}

/// Validate an upload before attempting extraction.
///
/// Rejects empty bodies, bodies over `max_bytes`, filenames that don't end
/// in `.pdf` (case-insensitive), and bodies without the `%PDF-` magic.
pub fn validate(data: &[u8], filename: &str, max_bytes: usize) -> Result<(), ExtractError> {
    if data.is_empty() {
        return Err(ExtractError::Empty);
    }
    if data.len() > max_bytes {
        return Err(ExtractError::TooLarge {
            size: data.len(),
            limit: max_bytes,
        });
    }
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(ExtractError::NotPdf(format!(
            "{filename} does not have a .pdf extension"
        )));
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(ExtractError::NotPdf(format!(
            "{filename} does not start with the PDF magic bytes"
        )));
    }
    Ok(())
}

/// Extract the full document text.
///
/// The output joins pages as `\n--- Page N ---\n<page text>`; a document
/// that parses but yields no text at all is [`ExtractError::EmptyDocument`].
pub fn extract(data: &[u8]) -> Result<Extraction, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| ExtractError::Parse(e.to_string()))?;

    // pdf_extract separates pages with form feeds.
    let pages: Vec<&str> = raw
        .split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect();
    if pages.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    let text: String = pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("\n--- Page {} ---\n{page}", i + 1))
        .collect();

    tracing::info!(pages = pages.len(), chars = text.len(), "extracted PDF text");
    Ok(Extraction {
        text,
        pages: pages.len(),
    })
}

/// Additive metadata the store keeps for an upload.
pub fn metadata(filename: &str, size: usize, pages: usize) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("filename".into(), Value::String(filename.to_string()));
    map.insert("size".into(), Value::from(size));
    map.insert("pages".into(), Value::from(pages));
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 50 * 1024 * 1024;

    #[test]
    fn valid_header_and_name_pass() {
        assert!(validate(b"%PDF-1.7 rest of file", "paper.pdf", LIMIT).is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(validate(b"%PDF-1.7", "PAPER.PDF", LIMIT).is_ok());
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(matches!(
            validate(b"", "paper.pdf", LIMIT),
            Err(ExtractError::Empty)
        ));
    }

    #[test]
    fn oversized_body_is_rejected() {
        let err = validate(b"%PDF-1.7", "paper.pdf", 4).unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { size: 8, limit: 4 }));
    }

    #[test]
    fn wrong_extension_is_rejected() {
        assert!(matches!(
            validate(b"%PDF-1.7", "paper.docx", LIMIT),
            Err(ExtractError::NotPdf(_))
        ));
    }

    #[test]
    fn missing_magic_is_rejected() {
        assert!(matches!(
            validate(b"GIF89a...", "paper.pdf", LIMIT),
            Err(ExtractError::NotPdf(_))
        ));
    }

    #[test]
    fn validation_failures_are_flagged_as_such() {
        assert!(ExtractError::Empty.is_validation());
        assert!(ExtractError::NotPdf("x".into()).is_validation());
        assert!(ExtractError::TooLarge { size: 2, limit: 1 }.is_validation());
        assert!(!ExtractError::Parse("x".into()).is_validation());
        assert!(!ExtractError::EmptyDocument.is_validation());
    }

    #[test]
    fn garbage_bytes_fail_extraction_with_parse_error() {
        // Passes the magic check but is not a parsable PDF body.
        let err = extract(b"%PDF-1.7 this is not a real pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn metadata_carries_filename_size_pages() {
        let map = metadata("paper.pdf", 4096, 12);
        assert_eq!(map["filename"], "paper.pdf");
        assert_eq!(map["size"], 4096);
        assert_eq!(map["pages"], 12);
    }
}
