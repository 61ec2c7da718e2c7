// SPDX-License-Identifier: MIT OR Apache-2.0

//! List indexable documents

use anyhow::Result;
use colored::Colorize;

use askdocs::documents::list_documents;
use askdocs::output::{colorize_source, print_json, use_colors};

use super::Workspace;
use crate::cli::OutputFormat;

/// Run the docs command
pub fn run(docs: Option<&str>, format: OutputFormat, compact: bool) -> Result<()> {
    let workspace = Workspace::load()?;
    let docs_dir = workspace.documents_dir(docs);
    let sources = list_documents(&docs_dir)?;

    match format {
        OutputFormat::Json => print_json(&sources, compact)?,
        OutputFormat::Text => {
            if sources.is_empty() {
                println!("{} No .txt documents in {}", "✗".red(), docs_dir.display());
                return Ok(());
            }
            let use_color = use_colors();
            for source in &sources {
                println!("{}", colorize_source(source, use_color));
            }
        }
    }
    Ok(())
}
