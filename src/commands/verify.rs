// SPDX-License-Identifier: MIT OR Apache-2.0

//! Check the saved index against the current documents

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;

use askdocs::documents::load_documents;
use askdocs::output::print_json;
use askdocs::retrieval::IndexStore;
use askdocs::RetrievalError;

use super::Workspace;
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct VerifyReport {
    index_path: String,
    status: &'static str,
    expected: String,
    found: String,
}

/// Run the verify command
///
/// Exits with an error when the index was built from a different vocabulary.
pub fn run(docs: Option<&str>, index: Option<&str>, format: OutputFormat, compact: bool) -> Result<()> {
    let workspace = Workspace::load()?;
    let docs_dir = workspace.documents_dir(docs);
    let index_path = workspace.index_path(index);

    let documents = load_documents(&docs_dir)?;
    let expected = workspace.retriever.vocabulary_version(&documents)?;

    let report = match IndexStore::open(&index_path, Some(&expected)) {
        Ok(store) => VerifyReport {
            index_path: index_path.display().to_string(),
            status: "ok",
            expected: expected.to_string(),
            found: store.version().to_string(),
        },
        Err(RetrievalError::VersionMismatch { expected, found }) => VerifyReport {
            index_path: index_path.display().to_string(),
            status: "stale",
            expected,
            found,
        },
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => print_json(&report, compact)?,
        OutputFormat::Text => {
            if report.status == "ok" {
                println!(
                    "{} {} matches current documents ({})",
                    "✓".green(),
                    report.index_path.cyan(),
                    report.found.dimmed()
                );
            } else {
                println!("{} {} is stale", "✗".red(), report.index_path.cyan());
                println!("  expected: {}", report.expected);
                println!("  found:    {}", report.found);
            }
        }
    }

    if report.status != "ok" {
        bail!("index version mismatch; run `askdocs index` to rebuild");
    }
    Ok(())
}
