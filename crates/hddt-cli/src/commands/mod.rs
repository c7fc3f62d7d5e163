//! CLI subcommands and the input handling they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use tracing::debug;

use hddt_core::{HddtConfig, PdfExtractor, PdfProcessor, RawDocument, TextSource};

/// Input extensions the extractor can read.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "json", "txt"];

/// Load the configuration: explicit path, else the default file if present,
/// else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<HddtConfig> {
    if let Some(path) = config_path {
        return Ok(HddtConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(HddtConfig::from_file(&default_path)?)
    } else {
        Ok(HddtConfig::default())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

/// Read a PDF, a pre-extracted JSON document or a plain-text dump.
pub fn read_document(path: &Path, config: &HddtConfig) -> anyhow::Result<RawDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let doc = match extension(path).as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor =
                PdfExtractor::new().with_min_text_length(config.pdf.min_text_length);
            extractor.load(&data)?;
            let pdf_type = extractor.analyze();
            debug!("PDF has {} pages, type {:?}", extractor.page_count(), pdf_type);
            if !pdf_type.has_text() {
                anyhow::bail!(
                    "{} has no usable text layer; scanned invoices are not supported",
                    path.display()
                );
            }
            extractor.read_document()?
        }
        "json" => RawDocument::from_json_str(&fs::read_to_string(path)?)?,
        "txt" => RawDocument::from_text(fs::read_to_string(path)?),
        other => anyhow::bail!("Unsupported file format: {}", other),
    };

    Ok(doc)
}
