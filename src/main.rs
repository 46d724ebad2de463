// src/main.rs
mod extractors;
mod storage;
mod utils;

use std::fs;
use std::path::Path;

use clap::Parser;
use serde::Serialize;

use extractors::verdict;
use storage::{record_json, StorageManager};
use utils::error::ExtractError;
use utils::AppError;

/// Command Line Interface for the verdict charge/sentence extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing verdict text files
    #[arg(short, long)]
    input_dir: String,

    /// Output directory for extracted records (records always go to stdout)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Debug mode - save per-document metadata alongside records
    #[arg(short, long)]
    debug: bool,
}

/// Batch-level counters, reported once at the end of a run.
#[derive(Debug, Default, Serialize)]
struct BatchReport {
    documents: usize,
    accused_extraction_failures: usize,
    tables: usize,
    table_format_failures: usize,
    documents_output: usize,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage if an output directory was given
    let storage = match &args.output_dir {
        Some(dir) => Some(StorageManager::new(dir)?),
        None => None,
    };

    let input_dir = Path::new(&args.input_dir);
    if !input_dir.is_dir() {
        return Err(AppError::Config(format!(
            "{} is not a directory",
            args.input_dir
        )));
    }

    // 4. Enumerate documents: one directory level, dotfiles skipped
    let mut paths: Vec<_> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    // 5. Process each document
    let mut report = BatchReport::default();

    for path in paths {
        let filename = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if !name.starts_with('.') => name.to_string(),
            _ => continue,
        };

        report.documents += 1;

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        match verdict::extract_document_facts(&text) {
            Ok(facts) => {
                report.tables += facts.tables_processed;
                report.table_format_failures += facts.table_format_failures;
                if facts.table_format_failures > 0 {
                    tracing::info!(
                        "{}: {} table(s) had an unexpected format",
                        filename,
                        facts.table_format_failures
                    );
                }

                if !facts.has_output() {
                    tracing::debug!("{}: no charges matched, skipping output", filename);
                    continue;
                }

                let record = record_json(&filename, &facts);
                match serde_json::to_string_pretty(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        tracing::error!("Failed to serialize record for {}: {}", filename, e)
                    }
                }
                report.documents_output += 1;

                if let Some(storage) = &storage {
                    if let Err(e) = storage.save_document(&filename, &facts) {
                        tracing::error!("Failed to save record for {}: {}", filename, e);
                    }
                    if args.debug {
                        if let Err(e) = storage.save_document_metadata(&filename, &facts) {
                            tracing::error!("Failed to save metadata for {}: {}", filename, e);
                        }
                    }
                }
            }
            Err(e @ (ExtractError::HeadingNotFound(_) | ExtractError::NoAccusedFound)) => {
                tracing::warn!("{}: accused extraction failed: {}", filename, e);
                report.accused_extraction_failures += 1;
            }
            Err(e) => {
                tracing::error!("{}: extraction failed: {}", filename, e);
            }
        }
    }

    // 6. Report batch counters
    tracing::info!(
        "Processing finished. Documents: {}, output: {}",
        report.documents,
        report.documents_output
    );
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize batch report: {}", e),
    }

    Ok(())
}
