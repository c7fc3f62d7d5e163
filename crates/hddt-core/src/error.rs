//! Error types for the hddt-core library.

use thiserror::Error;

/// Main error type for the hddt library.
#[derive(Error, Debug)]
pub enum HddtError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Malformed pre-extracted document or config.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to invoice field extraction.
///
/// None of these abort an extraction: they are either raised after the fact
/// by [`crate::ExtractionResult::ensure_valid`] or swallowed at the boundary
/// of a single field.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A located block could not be split into the expected parts.
    #[error("malformed {field} block: {reason}")]
    MalformedCapture { field: String, reason: String },

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// No invoice data could be extracted.
    #[error("no invoice data found")]
    NoData,
}

/// Result type for the hddt library.
pub type Result<T> = std::result::Result<T, HddtError>;
