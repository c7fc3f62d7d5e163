//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HddtError, Result};

/// Main configuration for hddt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HddtConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Rendering configuration.
    pub output: OutputConfig,
}

/// Which extraction strategy runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Patterns over the whole document text.
    WholeText,
    /// Line-by-line anchor scan.
    LineScan,
    /// Whole text first, line scan fills the gaps.
    #[default]
    Auto,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::WholeText => "whole_text",
            ExtractionMode::LineScan => "line_scan",
            ExtractionMode::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExtractionMode {
    type Err = HddtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "whole_text" => Ok(ExtractionMode::WholeText),
            "line_scan" => Ok(ExtractionMode::LineScan),
            "auto" => Ok(ExtractionMode::Auto),
            other => Err(HddtError::Config(format!(
                "unknown extraction mode '{}' (expected whole_text, line_scan or auto)",
                other
            ))),
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Strategy selection.
    pub mode: ExtractionMode,

    /// Record keys whose anchor was not found as null.
    pub fill_nulls: bool,

    /// Report totals and line-item inconsistencies as warnings.
    pub check_totals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Auto,
            fill_nulls: true,
            check_totals: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum embedded text length to consider the PDF text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Text shown for absent or null fields.
    pub placeholder: String,

    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            placeholder: "N/A".to_string(),
            pretty_json: true,
        }
    }
}

impl HddtConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
