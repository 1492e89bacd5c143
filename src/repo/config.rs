//! Repository configuration for the indexer

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-repository configuration file
pub const CONFIG_FILE: &str = ".repoindex.toml";

/// Configuration for a repository being indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// File name suffixes eligible for indexing
    #[serde(default = "default_include_suffixes")]
    pub include_suffixes: Vec<String>,

    /// File name suffixes excluded even when an include suffix matches
    #[serde(default = "default_exclude_suffixes")]
    pub exclude_suffixes: Vec<String>,

    /// Soft ceiling for chunk size in bytes
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Embedding model to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Number of chunks sent per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_include_suffixes() -> Vec<String> {
    [
        ".js", ".ts", ".tsx", ".sh", ".yaml", ".yml", ".md", ".css", ".json", ".toml", ".config",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_suffixes() -> Vec<String> {
    [
        ".min.js",
        ".min.css",
        "pnpm-lock.yaml",
        "package-lock.json",
        CONFIG_FILE,
        // The tool's own output; a re-run must not index the previous index.
        crate::index::DEFAULT_INDEX_FILE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_chunk_size() -> usize {
    150
}

fn default_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_batch_size() -> usize {
    16
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            include_suffixes: default_include_suffixes(),
            exclude_suffixes: default_exclude_suffixes(),
            max_chunk_size: default_max_chunk_size(),
            model: default_model(),
            batch_size: default_batch_size(),
        }
    }
}

impl IndexConfig {
    /// Path of the configuration file for a repository root
    pub fn path_for(repo_root: &Path) -> PathBuf {
        repo_root.join(CONFIG_FILE)
    }

    /// Load configuration from the repository or return defaults
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let config_path = Self::path_for(repo_root);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: IndexConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the repository
    pub fn save(&self, repo_root: &Path) -> Result<()> {
        let config_path = Self::path_for(repo_root);
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Check whether a file name is eligible for indexing.
    ///
    /// Exclusions win over inclusions, so `.min.js` stays out even though
    /// `.js` is included.
    pub fn is_eligible(&self, path: &str) -> bool {
        if self.exclude_suffixes.iter().any(|s| path.ends_with(s)) {
            return false;
        }
        self.include_suffixes.iter().any(|s| path.ends_with(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert!(!config.include_suffixes.is_empty());
        assert_eq!(config.max_chunk_size, 150);
        assert_eq!(config.model, "text-embedding-ada-002");
    }

    #[test]
    fn test_eligibility_by_suffix() {
        let config = IndexConfig::default();
        assert!(config.is_eligible("src/app.ts"));
        assert!(config.is_eligible("README.md"));
        assert!(config.is_eligible("webpack.config"));
        assert!(!config.is_eligible("src/main.rs"));
        assert!(!config.is_eligible("image.png"));
    }

    #[test]
    fn test_exclusions_win_over_inclusions() {
        let config = IndexConfig::default();
        assert!(config.is_eligible("dist/app.js"));
        assert!(!config.is_eligible("dist/app.min.js"));
        assert!(!config.is_eligible("styles.min.css"));
        assert!(!config.is_eligible("pnpm-lock.yaml"));
        assert!(!config.is_eligible("repository-index.json"));
        assert!(config.is_eligible("other-lock.yml"));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = IndexConfig::default();
        config.max_chunk_size = 42;
        config.include_suffixes.push(".rs".to_string());
        config.save(dir.path()).unwrap();

        let loaded = IndexConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.max_chunk_size, 42);
        assert!(loaded.is_eligible("src/main.rs"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let loaded = IndexConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.max_chunk_size, 150);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "max_chunk_size = 99\n").unwrap();

        let loaded = IndexConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.max_chunk_size, 99);
        assert_eq!(loaded.model, "text-embedding-ada-002");
        assert!(loaded.is_eligible("src/app.ts"));
    }
}
