//! Batch processing command for multiple invoice files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use hddt_core::{AnchorExtractor, ExtractionMode, ExtractionResult, FieldKey, HddtConfig, InvoiceParser};

use super::{is_supported, load_config, read_document};
use crate::presenter::{OutputFormat, Presenter};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction strategy: whole_text, line_scan or auto
    #[arg(short, long)]
    mode: Option<ExtractionMode>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match &self.extraction {
            Some(r) if r.is_success() => "success",
            Some(_) => "failed",
            None => "error",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(mode) = args.mode {
        config.extraction.mode = mode;
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = AnchorExtractor::from_config(&config.extraction);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = process_single_file(&path, &parser, &config);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(extraction) => results.push(ProcessResult {
                path,
                extraction: Some(extraction),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        extraction: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        let presenter = Presenter::new(config.output.placeholder.as_str())
            .with_pretty_json(config.output.pretty_json);

        let paths: Vec<&Path> = results.iter().map(|r| r.path.as_path()).collect();
        let names = output_names(&paths);

        for (result, output_name) in results.iter().zip(&names) {
            let Some(extraction) = &result.extraction else {
                continue;
            };
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let content = presenter.render(&extraction.fields, args.format)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.status() == "success").count();
    let failed: Vec<_> = results.iter().filter(|r| r.status() != "success").collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("invoice number not found")
            );
        }
    }

    Ok(())
}

/// Output file stems, one per input. Inputs sharing a stem keep their
/// source extension in the name (`a_pdf`, `a_txt`).
fn output_names(paths: &[&Path]) -> Vec<String> {
    let stem = |p: &Path| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("invoice")
            .to_string()
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *counts.entry(stem(path)).or_default() += 1;
    }

    paths
        .iter()
        .map(|path| {
            let name = stem(path);
            if counts[&name] > 1 {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                format!("{}_{}", name, ext)
            } else {
                name
            }
        })
        .collect()
}

fn process_single_file(
    path: &Path,
    parser: &AnchorExtractor,
    config: &HddtConfig,
) -> anyhow::Result<ExtractionResult> {
    let doc = read_document(path, config)?;
    Ok(parser.parse(&doc))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "issue_date",
        "seller_name",
        "total_amount",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    let presenter = Presenter::default();

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        match &result.extraction {
            Some(extraction) => {
                let fields = &extraction.fields;
                wtr.write_record([
                    filename,
                    result.status(),
                    fields.text(FieldKey::InvoiceNumber).unwrap_or_default(),
                    presenter.date(fields).as_str(),
                    fields.text(FieldKey::SellerName).unwrap_or_default(),
                    fields.text(FieldKey::TotalAmount).unwrap_or_default(),
                    extraction.warnings.join("; ").as_str(),
                    time.as_str(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    result.status(),
                    "",
                    "",
                    "",
                    "",
                    "",
                    time.as_str(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_names_disambiguate_shared_stems() {
        let paths = [
            Path::new("in/a.pdf"),
            Path::new("in/a.txt"),
            Path::new("in/b.json"),
        ];
        assert_eq!(output_names(&paths), vec!["a_pdf", "a_txt", "b"]);
    }
}
