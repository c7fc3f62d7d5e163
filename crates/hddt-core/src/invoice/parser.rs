//! Anchor extractor combining the whole-text and line-scan strategies.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, ExtractionMode};
use crate::models::document::RawDocument;
use crate::models::fields::{FieldKey, FieldMap, FieldValue};

use super::rules::{
    check_totals, extract_line_items, invalid_invoice_date, parse_signing_date, LineScanStrategy,
    WholeTextStrategy,
};
use super::{ExtractionStrategy, Result};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: FieldMap,
    /// Consistency warnings. Never affect the fields.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Strategy selection used.
    pub mode: ExtractionMode,
}

impl ExtractionResult {
    /// Whether the validity gate passed.
    pub fn is_success(&self) -> bool {
        self.fields.is_valid()
    }

    /// The fields, or `MissingField` when the invoice number is absent.
    pub fn ensure_valid(&self) -> Result<&FieldMap> {
        if self.is_success() {
            Ok(&self.fields)
        } else {
            Err(ExtractionError::MissingField(
                FieldKey::InvoiceNumber.as_str().to_string(),
            ))
        }
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Extract fields from `doc` and report consistency warnings.
    fn parse(&self, doc: &RawDocument) -> ExtractionResult;
}

/// Anchor-based extractor for the e-invoice template.
#[derive(Debug, Clone)]
pub struct AnchorExtractor {
    /// Strategy selection.
    mode: ExtractionMode,
    /// Record absent nullable keys as null.
    fill_nulls: bool,
    /// Compute totals consistency warnings.
    check_totals: bool,
}

impl AnchorExtractor {
    /// Create an extractor with default settings (auto mode, nulls filled).
    pub fn new() -> Self {
        Self {
            mode: ExtractionMode::Auto,
            fill_nulls: true,
            check_totals: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_mode(config.mode)
            .with_null_fill(config.fill_nulls)
            .with_total_checks(config.check_totals)
    }

    /// Set the strategy selection.
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether absent keys are recorded as null.
    pub fn with_null_fill(mut self, fill: bool) -> Self {
        self.fill_nulls = fill;
        self
    }

    /// Set whether totals are cross-checked.
    pub fn with_total_checks(mut self, check: bool) -> Self {
        self.check_totals = check;
        self
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    fn run(strategy: &dyn ExtractionStrategy, text: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        strategy.extract_fields(text, &mut fields);
        debug!("{} strategy produced {} fields", strategy.name(), fields.len());
        fields
    }

    /// Extract the template fields from `doc`.
    ///
    /// Never fails: anything not found is absent or null. Use
    /// [`FieldMap::is_valid`] to tell whether the document was an invoice.
    pub fn extract(&self, doc: &RawDocument) -> FieldMap {
        let mut fields = match self.mode {
            ExtractionMode::WholeText => Self::run(&WholeTextStrategy::new(), &doc.text),
            ExtractionMode::LineScan => Self::run(&LineScanStrategy::new(), &doc.text),
            ExtractionMode::Auto => {
                let mut primary = Self::run(&WholeTextStrategy::new(), &doc.text);
                let mut secondary = Self::run(&LineScanStrategy::new(), &doc.text);
                // The strategies route the floor-marker address to opposite
                // parties, so addresses only come over as a pair.
                if primary.has_value(FieldKey::SellerAddress)
                    || primary.has_value(FieldKey::BuyerAddress)
                {
                    secondary.remove(FieldKey::SellerAddress);
                    secondary.remove(FieldKey::BuyerAddress);
                }
                let filled = primary.merge_missing(secondary);
                debug!("Line scan filled {} fields missed by whole-text scan", filled);
                primary
            }
        };

        fields.insert_if_absent(FieldKey::LineItems, extract_line_items(doc));

        if self.fill_nulls {
            fields.fill_missing_with_null(FieldKey::ALL);
        }

        fields
    }

    fn collect_warnings(&self, fields: &FieldMap) -> Vec<String> {
        let mut warnings = Vec::new();

        if !fields.is_valid() {
            warnings.push("Could not extract invoice number".to_string());
        }
        if !fields.has_value(FieldKey::SellerTaxCode) {
            warnings.push("Could not extract seller tax code".to_string());
        }
        if !matches!(fields.get(FieldKey::LineItems), Some(FieldValue::Items(_))) {
            warnings.push("Could not extract line items".to_string());
        }
        if invalid_invoice_date(fields) {
            warnings.push(format!(
                "Invoice date {}/{}/{} is not a valid date",
                fields.text(FieldKey::Day).unwrap_or_default(),
                fields.text(FieldKey::Month).unwrap_or_default(),
                fields.text(FieldKey::Year).unwrap_or_default(),
            ));
        }
        if let Some(signed) = fields.text(FieldKey::SigningDate) {
            if parse_signing_date(signed).is_none() {
                warnings.push(format!("Signing date {:?} is not a valid date", signed));
            }
        }
        if self.check_totals {
            warnings.extend(check_totals(fields));
        }

        warnings
    }
}

impl Default for AnchorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for AnchorExtractor {
    fn parse(&self, doc: &RawDocument) -> ExtractionResult {
        let start = Instant::now();

        info!(
            "Extracting invoice fields from {} characters of text and {} tables ({} mode)",
            doc.text.len(),
            doc.tables.len(),
            self.mode
        );

        if let Err(e) = doc.ensure_content() {
            warn!("{}", e);
        }

        let fields = self.extract(doc);
        let warnings = self.collect_warnings(&fields);

        for w in &warnings {
            warn!("{}", w);
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extraction finished in {}ms: {} fields, valid = {}",
            processing_time_ms,
            fields.iter().filter(|(_, v)| !v.is_null()).count(),
            fields.is_valid()
        );

        ExtractionResult {
            fields,
            warnings,
            processing_time_ms,
            mode: self.mode,
        }
    }
}
