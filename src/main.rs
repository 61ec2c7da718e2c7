// SPDX-License-Identifier: MIT OR Apache-2.0

//! askdocs - Local passage retrieval over text documents
//!
//! Builds a TF-IDF index of overlapping passages and answers questions with
//! the most similar ones, ready to be handed to a language model.

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize tracing with ASKDOCS_LOG env var (e.g., ASKDOCS_LOG=debug askdocs query "...")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ASKDOCS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();
    let compact = cli.compact;

    match cli.command {
        Commands::Index { docs, index } => {
            commands::index::run(docs.as_deref(), index.as_deref(), format, compact)?;
        }
        Commands::Query {
            question,
            top_k,
            docs,
            index,
            rebuild,
            role,
        } => {
            commands::query::run(
                &question,
                top_k,
                docs.as_deref(),
                index.as_deref(),
                rebuild,
                role.as_deref(),
                format,
                compact,
            )?;
        }
        Commands::Verify { docs, index } => {
            commands::verify::run(docs.as_deref(), index.as_deref(), format, compact)?;
        }
        Commands::Info { index } => {
            commands::info::run(index.as_deref(), format, compact)?;
        }
        Commands::Docs { docs } => {
            commands::docs::run(docs.as_deref(), format, compact)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "askdocs", &mut std::io::stdout());
        }
    }

    Ok(())
}
