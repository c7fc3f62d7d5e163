//! Core library for Vietnamese VAT invoice field extraction.
//!
//! This crate provides:
//! - Document sources (embedded PDF text, pre-extracted JSON, plain text)
//! - Anchor-based field extraction for the e-invoice template
//!   (whole-text and line-by-line strategies)
//! - Line-item recovery from detected tables or from the raw text block
//! - The flat field map consumed by presentation layers

pub mod error;
pub mod models;
pub mod pdf;
pub mod invoice;

pub use error::{HddtError, Result};
pub use models::document::{RawDocument, RowTable};
pub use models::fields::{FieldKey, FieldMap, FieldValue, LineItem};
pub use models::config::{HddtConfig, ExtractionMode};
pub use pdf::{PdfExtractor, PdfProcessor, TextSource};
pub use invoice::{AnchorExtractor, ExtractionResult, ExtractionStrategy, InvoiceParser};
