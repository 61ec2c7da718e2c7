// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// askdocs - Local passage retrieval over text documents
///
/// Splits `.txt` documents into overlapping passages, indexes them with
/// TF-IDF weights and returns the passages most similar to a question.
#[derive(Parser, Debug)]
#[command(name = "askdocs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index from the documents directory and save it
    #[command(alias = "i")]
    Index {
        /// Documents directory (defaults to config or ./documents)
        #[arg(short, long)]
        docs: Option<String>,

        /// Index file to write
        #[arg(long)]
        index: Option<String>,
    },

    /// Retrieve the passages most similar to a question
    #[command(alias = "q")]
    Query {
        /// Natural-language question
        question: String,

        /// Number of passages to return
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Documents directory used when the index must be built
        #[arg(short, long)]
        docs: Option<String>,

        /// Index file to load or create
        #[arg(long)]
        index: Option<String>,

        /// Rebuild the index even if one exists
        #[arg(long)]
        rebuild: bool,

        /// Role whose source restrictions apply (defaults to config or "public")
        #[arg(long)]
        role: Option<String>,
    },

    /// Check that the saved index matches the current documents
    Verify {
        /// Documents directory
        #[arg(short, long)]
        docs: Option<String>,

        /// Index file to check
        #[arg(long)]
        index: Option<String>,
    },

    /// Show statistics of the saved index
    Info {
        /// Index file to inspect
        #[arg(long)]
        index: Option<String>,
    },

    /// List documents that would be indexed
    Docs {
        /// Documents directory
        #[arg(short, long)]
        docs: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_flags() {
        let cli = Cli::try_parse_from([
            "askdocs", "--format", "json", "query", "what is rust", "-k", "2", "--rebuild",
            "--role", "manager",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Query {
                question,
                top_k,
                rebuild,
                role,
                ..
            } => {
                assert_eq!(question, "what is rust");
                assert_eq!(top_k, Some(2));
                assert!(rebuild);
                assert_eq!(role.as_deref(), Some("manager"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
