//! API key storage and lookup
//!
//! Keys are resolved from the command line first, then the environment,
//! then a credentials file under the user config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPEN_AI_API_KEY";

/// Stored credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// OpenAI API key
    pub api_key: Option<String>,
}

/// Path of the credentials file
pub fn credentials_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(base.join("repoindex").join("credentials.toml"))
}

impl Credentials {
    /// Load stored credentials, or empty ones when none are stored
    pub fn load() -> Result<Self> {
        Self::load_from(&credentials_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {:?}", path))?;
        let credentials = toml::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {:?}", path))?;
        Ok(credentials)
    }

    /// Save credentials to the user config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&credentials_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize credentials")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write credentials file: {:?}", path))?;

        // The file holds a secret; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Delete stored credentials; returns whether anything was removed
    pub fn clear() -> Result<bool> {
        let path = credentials_path()?;
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove credentials file: {:?}", path))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Resolve the API key: explicit flag, then environment, then stored
/// credentials. Returns `None` when nothing is configured anywhere.
pub fn resolve_api_key(flag: Option<&str>) -> Result<Option<String>> {
    if let Some(key) = flag {
        return Ok(Some(key.to_string()));
    }

    // clap maps the environment variable onto the flag already; this covers
    // callers that go through the library instead.
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(Credentials::load()?.api_key)
}

/// Mask a key for display, keeping only the edges visible
pub fn mask_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "*".repeat(key.chars().count());
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdef1234567890"), "sk-a...7890");
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key(""), "");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");

        let credentials = Credentials {
            api_key: Some("sk-test-key".to_string()),
        };
        credentials.save_to(&path).unwrap();

        let loaded = Credentials::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("sk-test-key"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let loaded = Credentials::load_from(&path).unwrap();
        assert!(loaded.api_key.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let credentials = Credentials {
            api_key: Some("sk-test-key".to_string()),
        };
        credentials.save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_flag_wins_resolution() {
        let key = resolve_api_key(Some("sk-from-flag")).unwrap();
        assert_eq!(key.as_deref(), Some("sk-from-flag"));
    }
}
