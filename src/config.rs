// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for askdocs
//!
//! Loads configuration from .askdocsrc.toml in current directory or ~/.config/askdocs/config.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::retrieval::chunker::{
    ChunkConfig, DEFAULT_BOUNDARY_SLACK_CHARS, DEFAULT_CHUNK_OVERLAP_CHARS, DEFAULT_MAX_CHUNK_CHARS,
};
use crate::retrieval::tokenizer::{Tokenizer, DEFAULT_MIN_TOKEN_LENGTH, DEFAULT_STOPWORDS};
use crate::retrieval::{AccessPolicy, RetrievalConfig, DEFAULT_ROLE, DEFAULT_TOP_K};

/// Name of the per-directory config file
pub const CONFIG_FILE: &str = ".askdocsrc.toml";

/// Default directory holding `.txt` documents
pub const DEFAULT_DOCUMENTS_DIR: &str = "documents";

/// Default location of the persisted index
pub const DEFAULT_INDEX_PATH: &str = ".askdocs/index.json";

/// Chunking configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    pub max_chunk_chars: Option<usize>,
    /// Characters shared by consecutive chunks
    pub chunk_overlap_chars: Option<usize>,
    /// Look-back window for sentence boundaries
    pub boundary_slack_chars: Option<usize>,
}

impl ChunkingConfig {
    /// Get max chunk chars (defaults to 500)
    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars.unwrap_or(DEFAULT_MAX_CHUNK_CHARS)
    }

    /// Get chunk overlap (defaults to 50)
    pub fn chunk_overlap_chars(&self) -> usize {
        self.chunk_overlap_chars.unwrap_or(DEFAULT_CHUNK_OVERLAP_CHARS)
    }

    /// Get boundary slack (defaults to 100, capped below max_chunk_chars)
    pub fn boundary_slack_chars(&self) -> usize {
        self.boundary_slack_chars.unwrap_or_else(|| {
            DEFAULT_BOUNDARY_SLACK_CHARS.min(self.max_chunk_chars().saturating_sub(1))
        })
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Minimum token length in characters
    pub min_token_length: Option<usize>,
    /// Replaces the built-in stopword list
    pub stopwords: Option<Vec<String>>,
    /// Added on top of the active stopword list
    pub extra_stopwords: Vec<String>,
}

impl TokenizerConfig {
    /// Get min token length (defaults to 2)
    pub fn min_token_length(&self) -> usize {
        self.min_token_length.unwrap_or(DEFAULT_MIN_TOKEN_LENGTH)
    }

    /// Get the effective stopword list
    pub fn stopwords(&self) -> Vec<String> {
        let mut words: Vec<String> = match &self.stopwords {
            Some(words) => words.clone(),
            None => DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        };
        words.extend(self.extra_stopwords.iter().cloned());
        words
    }
}

/// Search configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of passages returned when no -k is given
    pub top_k_default: Option<usize>,
}

impl SearchConfig {
    /// Get default top-k (defaults to 3)
    pub fn top_k_default(&self) -> usize {
        self.top_k_default.unwrap_or(DEFAULT_TOP_K)
    }
}

/// Role-based source restrictions
///
/// ```toml
/// [roles]
/// default_role = "public"
/// unrestricted = ["admin", "manager"]
///
/// [roles.restrictions]
/// "cybersecurity.txt" = ["admin", "manager"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// Role used when `--role` is absent or unknown
    pub default_role: Option<String>,
    /// Roles that see every source
    pub unrestricted: Vec<String>,
    /// Source id to the roles allowed to see it
    pub restrictions: BTreeMap<String, Vec<String>>,
}

impl RolesConfig {
    /// Get default role (defaults to "public")
    pub fn default_role(&self) -> &str {
        self.default_role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    /// Build the access policy described by this section
    pub fn access_policy(&self) -> AccessPolicy {
        let mut policy = AccessPolicy::new(self.default_role());
        for role in &self.unrestricted {
            policy = policy.with_unrestricted_role(role.as_str());
        }
        for (source, roles) in &self.restrictions {
            policy = policy.restrict(source.as_str(), roles.iter().map(String::as_str));
        }
        policy
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory containing `.txt` documents
    pub documents_dir: Option<String>,
    /// Persisted index file
    pub index_path: Option<String>,
}

impl PathsConfig {
    /// Get documents directory (defaults to "documents")
    pub fn documents_dir(&self) -> PathBuf {
        PathBuf::from(self.documents_dir.as_deref().unwrap_or(DEFAULT_DOCUMENTS_DIR))
    }

    /// Get index path (defaults to ".askdocs/index.json")
    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(self.index_path.as_deref().unwrap_or(DEFAULT_INDEX_PATH))
    }
}

/// Configuration loaded from .askdocsrc.toml or ~/.config/askdocs/config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chunking configuration
    pub chunking: ChunkingConfig,

    /// Tokenizer configuration
    pub tokenizer: TokenizerConfig,

    /// Search configuration
    pub search: SearchConfig,

    /// Path configuration
    pub paths: PathsConfig,

    /// Access restrictions
    pub roles: RolesConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .askdocsrc.toml in current directory
    /// 2. ~/.config/askdocs/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(CONFIG_FILE)) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("askdocs").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::from_toml_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Failed to parse {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid askdocs configuration")
    }

    /// Build a validated retrieval configuration
    pub fn retrieval_config(&self) -> Result<RetrievalConfig> {
        let chunking = ChunkConfig {
            max_chars: self.chunking.max_chunk_chars(),
            overlap_chars: self.chunking.chunk_overlap_chars(),
            boundary_slack_chars: self.chunking.boundary_slack_chars(),
        };
        chunking.validate().context("invalid [chunking] section")?;

        let top_k_default = self.search.top_k_default();
        if top_k_default == 0 {
            anyhow::bail!("[search] top_k_default must be at least 1");
        }
        if self.roles.default_role().trim().is_empty() {
            anyhow::bail!("[roles] default_role must not be empty");
        }

        Ok(RetrievalConfig {
            chunking,
            tokenizer: Tokenizer::new(self.tokenizer.min_token_length(), self.tokenizer.stopwords()),
            top_k_default,
            access: self.roles.access_policy(),
        })
    }

    /// Get the documents directory
    pub fn documents_dir(&self) -> PathBuf {
        self.paths.documents_dir()
    }

    /// Get the index path
    pub fn index_path(&self) -> PathBuf {
        self.paths.index_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let retrieval = config.retrieval_config().unwrap();
        assert_eq!(retrieval.chunking, ChunkConfig::default());
        assert_eq!(retrieval.top_k_default, 3);
        assert_eq!(retrieval.tokenizer.min_token_length(), 2);
        assert!(retrieval.tokenizer.is_stopword("the"));
        assert_eq!(config.index_path(), PathBuf::from(".askdocs/index.json"));
        assert_eq!(config.documents_dir(), PathBuf::from("documents"));
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_toml_str(
            r#"
[chunking]
max_chunk_chars = 200
chunk_overlap_chars = 20

[tokenizer]
min_token_length = 3
stopwords = ["foo"]
extra_stopwords = ["bar"]

[search]
top_k_default = 5

[paths]
documents_dir = "corpus"
index_path = "out/idx.json"
"#,
        )
        .unwrap();

        let retrieval = config.retrieval_config().unwrap();
        assert_eq!(retrieval.chunking.max_chars, 200);
        assert_eq!(retrieval.chunking.overlap_chars, 20);
        assert_eq!(retrieval.chunking.boundary_slack_chars, 100);
        assert_eq!(retrieval.top_k_default, 5);
        assert!(retrieval.tokenizer.is_stopword("foo"));
        assert!(retrieval.tokenizer.is_stopword("bar"));
        assert!(!retrieval.tokenizer.is_stopword("the"));
        assert_eq!(config.documents_dir(), PathBuf::from("corpus"));
        assert_eq!(config.index_path(), PathBuf::from("out/idx.json"));
    }

    #[test]
    fn test_roles_section() {
        let config = Config::from_toml_str(
            r#"
[roles]
unrestricted = ["admin"]

[roles.restrictions]
"cybersecurity.txt" = ["manager"]
"cloud_devops.txt" = ["manager", "employee"]
"#,
        )
        .unwrap();
        assert_eq!(config.roles.default_role(), "public");

        let access = config.retrieval_config().unwrap().access;
        assert!(access.is_restricted());
        assert!(access.allows("admin", "cybersecurity.txt"));
        assert!(access.allows("manager", "cybersecurity.txt"));
        assert!(!access.allows("employee", "cybersecurity.txt"));
        assert!(access.allows("employee", "cloud_devops.txt"));
        assert!(!access.allows("public", "cloud_devops.txt"));
        assert!(access.allows("public", "ai_basics.txt"));

        assert!(!Config::default().retrieval_config().unwrap().access.is_restricted());
        assert!(Config::from_toml_str("[roles]\ndefault_role = \" \"\n")
            .unwrap()
            .retrieval_config()
            .is_err());
    }

    #[test]
    fn test_slack_default_shrinks_for_small_chunks() {
        let config = Config::from_toml_str("[chunking]\nmax_chunk_chars = 40\nchunk_overlap_chars = 5\n").unwrap();
        let retrieval = config.retrieval_config().unwrap();
        assert_eq!(retrieval.chunking.boundary_slack_chars, 39);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config::from_toml_str("[chunking]\nmax_chunk_chars = 10\nchunk_overlap_chars = 10\n").unwrap();
        assert!(config.retrieval_config().is_err());

        let config = Config::from_toml_str("[search]\ntop_k_default = 0\n").unwrap();
        assert!(config.retrieval_config().is_err());

        assert!(Config::from_toml_str("[chunking]\nmax_chunk_chars = \"big\"\n").is_err());
    }
}
