// Kennisnet JSON-LD - Command line enrichment
// Reads an expanded JSON-LD record, writes the enriched record to stdout

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use kennisnet_jsonld::{prepare_enrich, VocabularyTable, VERSION};

const USAGE: &str = "usage:
  kennisnet-enrich enrich <vocabulary.json|vocabulary.csv> <record.json> [date-modified]
  kennisnet-enrich info";

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("enrich") if args.len() >= 4 => {
            run_enrich(Path::new(&args[2]), Path::new(&args[3]), args.get(4).map(String::as_str))
        }
        Some("info") => run_info(),
        _ => bail!("{USAGE}"),
    }
}

fn run_enrich(vocabulary: &Path, record: &Path, date_modified: Option<&str>) -> Result<()> {
    tracing::info!(version = VERSION, vocabulary = %vocabulary.display(), "loading vocabulary");
    let table = Arc::new(VocabularyTable::from_file(vocabulary)?);
    tracing::info!(concepts = table.concept_count(), "vocabulary loaded");

    let content = fs::read_to_string(record)
        .with_context(|| format!("Failed to read record file: {}", record.display()))?;
    let input: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record JSON: {}", record.display()))?;

    let (enricher, _) = prepare_enrich(table.clone());
    let output = enricher
        .enrich_value(&input, date_modified)
        .with_context(|| format!("Failed to enrich {}", record.display()))?;

    let reports = table.take_reports();
    for (key, value) in &reports.not_found {
        tracing::warn!(key = %key, value = %value, "not found");
    }
    for (key, value) in &reports.invalid {
        tracing::warn!(key = %key, value = %value, "invalid");
    }
    tracing::info!(
        not_found = reports.not_found.len(),
        invalid = reports.invalid.len(),
        "record enriched"
    );

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_info() -> Result<()> {
    let (_, info) = prepare_enrich(Arc::new(VocabularyTable::new()));
    println!("{}", serde_json::to_string_pretty(&info.to_json())?);
    Ok(())
}
