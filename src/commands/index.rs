// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build and save the passage index

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use askdocs::output::print_json;

use super::Workspace;
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct IndexSummary {
    index_path: String,
    documents_dir: String,
    chunks: usize,
    sources: usize,
    terms: usize,
    vocabulary_version: String,
}

/// Run the index command
pub fn run(docs: Option<&str>, index: Option<&str>, format: OutputFormat, compact: bool) -> Result<()> {
    let workspace = Workspace::load()?;
    let docs_dir = workspace.documents_dir(docs);
    let index_path = workspace.index_path(index);

    let store = workspace.build_and_save(&docs_dir, &index_path, format)?;

    let summary = IndexSummary {
        index_path: index_path.display().to_string(),
        documents_dir: docs_dir.display().to_string(),
        chunks: store.len(),
        sources: store.source_count(),
        terms: store.vocabulary().len(),
        vocabulary_version: store.version().to_string(),
    };

    match format {
        OutputFormat::Json => print_json(&summary, compact)?,
        OutputFormat::Text => {
            println!(
                "{} Indexed {} passages from {} documents ({} terms)",
                "✓".green(),
                summary.chunks,
                summary.sources,
                summary.terms
            );
            println!("  index:   {}", summary.index_path.cyan());
            println!("  version: {}", summary.vocabulary_version.dimmed());
        }
    }
    Ok(())
}
