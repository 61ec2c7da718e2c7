// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer a question with the most similar passages

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use askdocs::documents::latest_modified;
use askdocs::output::{
    colorize_heading, colorize_passage, colorize_rank, colorize_score, colorize_source, print_json,
    use_colors,
};
use askdocs::retrieval::{IndexStore, Passage};

use super::Workspace;
use crate::cli::OutputFormat;

/// Query result for JSON output
#[derive(Debug, Serialize)]
struct QueryResult<'a> {
    question: &'a str,
    role: &'a str,
    passages: Vec<Passage>,
    sources: Vec<String>,
}

/// Source ids in rank order, without duplicates
fn unique_sources(passages: &[Passage]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for passage in passages {
        if !sources.contains(&passage.source_id) {
            sources.push(passage.source_id.clone());
        }
    }
    sources
}

/// Warn when a document changed after the index file was written
fn warn_if_stale(docs_dir: &Path, index_path: &Path) {
    let Ok(index_time) = std::fs::metadata(index_path).and_then(|m| m.modified()) else {
        return;
    };
    match latest_modified(docs_dir) {
        Ok(Some(doc_time)) if doc_time > index_time => warn!(
            "documents in {} changed after {} was built; run `askdocs verify` or pass --rebuild",
            docs_dir.display(),
            index_path.display()
        ),
        Ok(_) => {}
        Err(e) => debug!("skipping staleness check: {e}"),
    }
}

/// Run the query command
#[allow(clippy::too_many_arguments)]
pub fn run(
    question: &str,
    top_k: Option<usize>,
    docs: Option<&str>,
    index: Option<&str>,
    rebuild: bool,
    role: Option<&str>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let workspace = Workspace::load()?;
    let index_path = workspace.index_path(index);
    let docs_dir = workspace.documents_dir(docs);

    let store = if rebuild || !index_path.exists() {
        info!(index = %index_path.display(), rebuild, "building index before query");
        workspace.build_and_save(&docs_dir, &index_path, format)?
    } else {
        warn_if_stale(&docs_dir, &index_path);
        IndexStore::open(&index_path, None)
            .with_context(|| format!("failed to load index {}", index_path.display()))?
    };

    let retriever = &workspace.retriever;
    let role = role.unwrap_or_else(|| retriever.access().default_role());
    let k = top_k.unwrap_or_else(|| retriever.top_k_default());
    let passages: Vec<Passage> = retriever
        .retrieve_for_role(&store, question, k, role)?
        .iter()
        .map(|r| r.to_passage())
        .collect();
    let sources = unique_sources(&passages);

    match format {
        OutputFormat::Json => {
            let result = QueryResult {
                question,
                role,
                passages,
                sources,
            };
            print_json(&result, compact)?;
        }
        OutputFormat::Text => {
            let use_color = use_colors();
            if passages.is_empty() {
                if store.is_empty() {
                    println!("{} No passages in index", "✗".red());
                } else {
                    println!(
                        "{} No passages accessible to role {}",
                        "✗".red(),
                        role.yellow()
                    );
                }
                return Ok(());
            }

            println!("\n{} {}\n", "🔍".cyan(), question.yellow());
            for passage in &passages {
                println!(
                    "{} {} [{}:{}]",
                    colorize_rank(passage.rank, use_color),
                    colorize_score(passage.similarity_score, use_color),
                    colorize_source(&passage.source_id, use_color),
                    passage.chunk_index
                );
                for line in passage.chunk_text.lines() {
                    println!("    {}", colorize_passage(line, use_color));
                }
                println!();
            }

            println!("{}", colorize_heading("Sources:", use_color));
            for source in &sources {
                println!("  - {}", colorize_source(source, use_color));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(source: &str, rank: usize) -> Passage {
        Passage {
            chunk_text: String::new(),
            source_id: source.to_string(),
            chunk_index: 0,
            similarity_score: 0.0,
            rank,
        }
    }

    #[test]
    fn test_unique_sources_keeps_rank_order() {
        let passages = vec![passage("b.txt", 1), passage("a.txt", 2), passage("b.txt", 3)];
        assert_eq!(unique_sources(&passages), vec!["b.txt", "a.txt"]);
    }
}
