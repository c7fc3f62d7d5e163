//! Process command - extract fields from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use hddt_core::{AnchorExtractor, ExtractionMode, InvoiceParser};

use super::{load_config, read_document};
use crate::presenter::{OutputFormat, Presenter};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, pre-extracted JSON document or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Extraction strategy: whole_text, line_scan or auto
    #[arg(short, long)]
    mode: Option<ExtractionMode>,

    /// Text shown for fields that were not found
    #[arg(long)]
    placeholder: Option<String>,

    /// Fail when the invoice number cannot be extracted
    #[arg(long)]
    strict: bool,

    /// Do not print consistency warnings
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if let Some(mode) = args.mode {
        config.extraction.mode = mode;
    }
    if let Some(placeholder) = &args.placeholder {
        config.output.placeholder = placeholder.clone();
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );

    pb.set_message("Reading document...");
    let doc = read_document(&args.input, &config)?;

    pb.set_message("Extracting invoice fields...");
    let parser = AnchorExtractor::from_config(&config.extraction);
    let result = parser.parse(&doc);

    pb.finish_and_clear();

    if !args.quiet && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    if args.strict {
        result.ensure_valid()?;
    }

    let presenter = Presenter::new(config.output.placeholder.as_str())
        .with_pretty_json(config.output.pretty_json);
    let output = presenter.render(&result.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    debug!(
        "Extraction took {}ms, total {:?}",
        result.processing_time_ms,
        start.elapsed()
    );

    Ok(())
}
