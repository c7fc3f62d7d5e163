//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{AnchorExtractor, ExtractionResult, InvoiceParser};

use crate::error::ExtractionError;
use crate::models::fields::FieldMap;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A way of locating template anchors in document text.
pub trait ExtractionStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Record every field this strategy finds in `text`.
    ///
    /// Writes go through the map's guarded inserts, so keys already present
    /// are left alone. Keys whose anchor is not found stay absent.
    fn extract_fields(&self, text: &str, fields: &mut FieldMap);
}
