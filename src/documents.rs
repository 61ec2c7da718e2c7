// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loads plain-text documents from a directory tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{Result, RetrievalError};
use crate::retrieval::Document;

/// File extension of loadable documents.
pub const DOCUMENT_EXTENSION: &str = "txt";

/// Lists `.txt` files under `dir`, sorted by path.
fn list_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RetrievalError::DocumentsNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}

/// Source id of a file: its path relative to `dir`, with `/` separators.
fn source_id(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reads every `.txt` file under `dir` into a [`Document`], in path order.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn load_documents(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    let files = list_text_files(dir)?;

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let bytes = fs::read(&path).map_err(|e| RetrievalError::io(&path, e))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        documents.push(Document::new(source_id(dir, &path), text));
    }

    debug!(dir = %dir.display(), documents = documents.len(), "loaded documents");
    Ok(documents)
}

/// Source ids of the documents under `dir`, without reading them.
pub fn list_documents(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    Ok(list_text_files(dir)?
        .iter()
        .map(|path| source_id(dir, path))
        .collect())
}

/// Latest modification time among the documents under `dir`.
///
/// Returns `None` when there are no documents.
pub fn latest_modified(dir: impl AsRef<Path>) -> Result<Option<SystemTime>> {
    let mut latest = None;
    for path in list_text_files(dir.as_ref())? {
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| RetrievalError::io(&path, e))?;
        latest = latest.max(Some(modified));
    }
    Ok(latest)
}
