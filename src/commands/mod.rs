// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations

pub mod docs;
pub mod index;
pub mod info;
pub mod query;
pub mod verify;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use askdocs::config::Config;
use askdocs::documents::load_documents;
use askdocs::retrieval::{IndexStore, Retriever};

use crate::cli::OutputFormat;

/// Resolved configuration shared by every command
pub struct Workspace {
    pub config: Config,
    pub retriever: Retriever,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let config = Config::load();
        let retriever = Retriever::new(config.retrieval_config()?)?;
        Ok(Self { config, retriever })
    }

    pub fn documents_dir(&self, flag: Option<&str>) -> PathBuf {
        flag.map(PathBuf::from)
            .unwrap_or_else(|| self.config.documents_dir())
    }

    pub fn index_path(&self, flag: Option<&str>) -> PathBuf {
        flag.map(PathBuf::from)
            .unwrap_or_else(|| self.config.index_path())
    }

    /// Load documents, build a fresh index and save it to `index_path`
    pub fn build_and_save(
        &self,
        docs_dir: &Path,
        index_path: &Path,
        format: OutputFormat,
    ) -> Result<IndexStore> {
        let spinner = spinner(format);
        spinner.set_message(format!("Reading {}", docs_dir.display()));
        let documents = load_documents(docs_dir)?;

        spinner.set_message(format!("Indexing {} documents", documents.len()));
        let store = self.retriever.build_index(&documents)?;

        spinner.set_message(format!("Saving {}", index_path.display()));
        store
            .save(index_path)
            .with_context(|| format!("failed to save index to {}", index_path.display()))?;
        spinner.finish_and_clear();
        Ok(store)
    }
}

fn spinner(format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Text {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
