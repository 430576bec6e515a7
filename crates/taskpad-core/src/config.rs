//! Configuration management for taskpad.
//!
//! Loads configuration from ${TASKPAD_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Backend endpoints and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the identity service.
    pub auth_url: String,
    /// Base URL of the document store.
    pub store_url: String,
    /// Project API key, appended as a `key` query parameter when present.
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            auth_url: Config::DEFAULT_AUTH_URL.to_string(),
            store_url: Config::DEFAULT_STORE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend endpoints and credentials.
    pub backend: BackendConfig,
}

impl Config {
    const DEFAULT_AUTH_URL: &str = "https://identity.taskpad.dev";
    const DEFAULT_STORE_URL: &str = "https://store.taskpad.dev";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };

        config.backend.auth_url = resolve_base_url(
            &config.backend.auth_url,
            "TASKPAD_AUTH_URL",
            "identity service",
        )?;
        config.backend.store_url = resolve_base_url(
            &config.backend.store_url,
            "TASKPAD_STORE_URL",
            "document store",
        )?;
        Ok(config)
    }
}

/// Resolves a base URL with precedence: env > config value.
///
/// # Errors
/// Returns an error if the chosen URL is not well-formed.
fn resolve_base_url(config_url: &str, env_var: &str, service_name: &str) -> Result<String> {
    let chosen = match std::env::var(env_var) {
        Ok(env_url) if !env_url.trim().is_empty() => env_url.trim().to_string(),
        _ => config_url.trim().to_string(),
    };
    url::Url::parse(&chosen)
        .with_context(|| format!("Invalid {service_name} base URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}

pub mod paths {
    //! Path resolution for taskpad configuration and data directories.
    //!
    //! TASKPAD_HOME resolution order:
    //! 1. TASKPAD_HOME environment variable (if set)
    //! 2. ~/.taskpad (default)

    use std::path::PathBuf;

    /// Returns the user's home directory.
    pub fn home_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(PathBuf::from)
    }

    /// Returns the taskpad home directory.
    ///
    /// Checks TASKPAD_HOME env var first, falls back to ~/.taskpad.
    pub fn taskpad_home() -> PathBuf {
        if let Ok(home) = std::env::var("TASKPAD_HOME") {
            return PathBuf::from(home);
        }

        home_dir()
            .map(|h| h.join(".taskpad"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        taskpad_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        taskpad_home().join("session.json")
    }

    /// Returns the log directory.
    pub fn logs_dir() -> PathBuf {
        taskpad_home().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend.auth_url, Config::DEFAULT_AUTH_URL);
        assert_eq!(config.backend.store_url, Config::DEFAULT_STORE_URL);
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn parses_backend_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[backend]
auth_url = "https://id.example.com/"
store_url = "https://docs.example.com"
api_key = "k-123"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        // Trailing slash is normalized away.
        assert_eq!(config.backend.auth_url, "https://id.example.com");
        assert_eq!(config.backend.store_url, "https://docs.example.com");
        assert_eq!(config.backend.api_key.as_deref(), Some("k-123"));
    }

    #[test]
    fn rejects_malformed_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\nauth_url = \"not a url\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
