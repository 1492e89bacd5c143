//! Repository enumeration module
//!
//! This module handles finding the files worth indexing:
//! - Git-tracked file listing (which inherently honors .gitignore)
//! - A plain directory walk for paths that are not Git repositories
//! - UTF-8 content reading with binary files skipped

mod config;

pub use config::{IndexConfig, CONFIG_FILE};

use anyhow::{bail, Context, Result};
use git2::Repository as GitRepo;
use std::path::{Path, PathBuf};

/// A repository (or plain directory) being indexed
pub struct Repository {
    /// The underlying git2 repository, when the root is one
    git: Option<GitRepo>,
    /// Path to the repository root
    root: PathBuf,
    /// Repository configuration
    config: IndexConfig,
}

impl Repository {
    /// Open the repository at the given path.
    ///
    /// The path itself must be the root; a plain directory that is not a
    /// Git repository still opens, with file listing done by walking.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            bail!("Not a directory: {:?}", path);
        }

        let git = match GitRepo::open(path) {
            Ok(repo) => Some(repo),
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open Git repository at {:?}", path))
            }
        };

        let root = path.to_path_buf();
        let config = IndexConfig::load_or_default(&root)?;

        Ok(Self { git, root, config })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the repository configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Whether the root is a Git repository
    pub fn is_git(&self) -> bool {
        self.git.is_some()
    }

    /// List the files considered for indexing, relative to the root and
    /// sorted by path.
    ///
    /// Inside a Git repository this is the tracked file set, so ignored and
    /// untracked files never make it in. Elsewhere it is a directory walk
    /// that skips hidden entries and common build output.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = match &self.git {
            Some(repo) => {
                tracing::debug!("Listing git-tracked files in {:?}", self.root);
                self.tracked_files(repo)?
            }
            None => {
                tracing::debug!("Not a git repository; walking {:?}", self.root);
                self.walk_files()?
            }
        };
        files.sort();
        Ok(files)
    }

    /// Files recorded in the Git index
    fn tracked_files(&self, repo: &GitRepo) -> Result<Vec<PathBuf>> {
        let index = repo.index().context("Failed to read the Git index")?;

        let mut files = Vec::new();
        for entry in index.iter() {
            let path = PathBuf::from(String::from_utf8_lossy(&entry.path).as_ref());
            // The index can still list files already deleted from the
            // working tree.
            if self.root.join(&path).is_file() {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Directory walk fallback for non-Git roots
    fn walk_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_str().unwrap_or("");
                !name.starts_with('.') && name != "target" && name != "node_modules"
            })
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                let path = entry.path().strip_prefix(&self.root)?.to_path_buf();
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Read a file's content relative to the root.
    ///
    /// Returns `None` for content that is not valid UTF-8, which covers
    /// binary files; those are skipped rather than failing the run.
    pub fn read_file(&self, path: &Path) -> Result<Option<String>> {
        let full_path = self.root.join(path);
        let bytes = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", full_path))?;

        match String::from_utf8(bytes) {
            Ok(content) => Ok(Some(content)),
            Err(_) => {
                tracing::debug!("Skipping non-UTF-8 file: {}", path.display());
                Ok(None)
            }
        }
    }
}
