// SPDX-License-Identifier: MIT OR Apache-2.0

//! Show status of the saved index

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use askdocs::output::print_json;
use askdocs::retrieval::{IndexStore, INDEX_FORMAT, INDEX_FORMAT_VERSION};

use super::Workspace;
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct IndexStats {
    vocabulary_version: String,
    chunks: usize,
    sources: usize,
    terms: usize,
    size_bytes: u64,
}

#[derive(Debug, Serialize)]
struct IndexInfo {
    index_path: String,
    format: &'static str,
    format_version: u32,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<IndexStats>,
}

/// Run the info command
pub fn run(index: Option<&str>, format: OutputFormat, compact: bool) -> Result<()> {
    let workspace = Workspace::load()?;
    let index_path = workspace.index_path(index);

    let stats = if index_path.exists() {
        let store = IndexStore::open(&index_path, None)
            .with_context(|| format!("failed to load index {}", index_path.display()))?;
        Some(IndexStats {
            vocabulary_version: store.version().to_string(),
            chunks: store.len(),
            sources: store.source_count(),
            terms: store.vocabulary().len(),
            size_bytes: std::fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0),
        })
    } else {
        None
    };

    let info = IndexInfo {
        index_path: index_path.display().to_string(),
        format: INDEX_FORMAT,
        format_version: INDEX_FORMAT_VERSION,
        exists: stats.is_some(),
        stats,
    };

    match format {
        OutputFormat::Json => print_json(&info, compact)?,
        OutputFormat::Text => {
            println!("{}", "Index".bold());
            println!("  path:       {}", info.index_path.cyan());
            println!("  format:     {} v{}", info.format, info.format_version);
            match &info.stats {
                Some(stats) => {
                    println!("  version:    {}", stats.vocabulary_version);
                    println!("  passages:   {}", stats.chunks);
                    println!("  documents:  {}", stats.sources);
                    println!("  terms:      {}", stats.terms);
                    println!("  size:       {} bytes", stats.size_bytes);
                }
                None => {
                    println!("  status:     {} (run `askdocs index`)", "not built".yellow());
                }
            }
        }
    }
    Ok(())
}
