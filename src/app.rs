use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001/chat";
pub const ENDPOINT_ENV: &str = "RECON_ASSISTANT_ENDPOINT";
const CONFIG_FILE: &str = "recon-assistant.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat backend URL that receives `{"query": ...}` POSTs.
    pub endpoint: String,
    pub request_timeout_secs: Option<u64>,
    /// Mirror the conversation to the local SQLite store.
    pub persist_history: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: Some(60),
            persist_history: true,
        }
    }
}

impl AppConfig {
    pub fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join(CONFIG_FILE))
    }

    /// Loads the user config, falling back to defaults, then applies the
    /// environment override for the endpoint.
    pub fn load() -> Self {
        Self::load_file().with_env_override(|key| std::env::var(key).ok())
    }

    /// The config as stored on disk, without environment overrides. This is
    /// what settings editors should start from and save back.
    pub fn load_file() -> Self {
        match Self::toml_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not read {}: {e}", path.display());
                }
                return Self::default();
            }
        };
        match toml::from_str::<AppConfig>(&text) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn with_env_override<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("Endpoint overridden by {ENDPOINT_ENV}");
            self.endpoint = endpoint;
        }
        self
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::toml_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let normalized = normalize_url(&self.endpoint);
        Url::parse(&normalized).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Adds a scheme to bare `host:port/path` input. Local hosts get `http`,
/// everything else `https`.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        format!("http://{}", trimmed)
    } else {
        format!("https://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "endpoint = \"http://recon-bot:5001/chat\"\n").unwrap();

        let cfg = AppConfig::load_from(&path);
        assert_eq!(cfg.endpoint, "http://recon-bot:5001/chat");
        assert!(cfg.persist_history);
        assert_eq!(cfg.request_timeout_secs, Some(60));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "endpoint = [not toml").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cfg.toml");
        let cfg = AppConfig {
            endpoint: "https://assistant.example/chat".into(),
            request_timeout_secs: Some(15),
            persist_history: false,
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path), cfg);
    }

    #[test]
    fn env_override_replaces_endpoint_only_when_set() {
        let cfg = AppConfig::default().with_env_override(|_| None);
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);

        let cfg = AppConfig::default().with_env_override(|key| {
            (key == ENDPOINT_ENV).then(|| "http://10.0.0.5:5001/chat".to_string())
        });
        assert_eq!(cfg.endpoint, "http://10.0.0.5:5001/chat");

        let cfg = AppConfig::default().with_env_override(|_| Some("  ".to_string()));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn saving_edited_file_config_keeps_env_endpoint_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        fs::write(&path, "endpoint = \"http://recon-bot:5001/chat\"\n").unwrap();
        let lookup = |_: &str| Some("http://override:5001/chat".to_string());

        let on_disk = AppConfig::load_from(&path);
        let effective = on_disk.clone().with_env_override(lookup);
        assert_eq!(effective.endpoint, "http://override:5001/chat");

        let edited = AppConfig {
            persist_history: false,
            ..on_disk
        };
        edited.save_to(&path).unwrap();

        let reloaded = AppConfig::load_from(&path);
        assert_eq!(reloaded.endpoint, "http://recon-bot:5001/chat");
        assert!(!reloaded.persist_history);
    }

    #[test]
    fn endpoint_url_normalizes_scheme() {
        let cfg = AppConfig {
            endpoint: "localhost:5001/chat".into(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.endpoint_url().unwrap().as_str(), "http://localhost:5001/chat");

        let cfg = AppConfig {
            endpoint: "bot.example.com/chat".into(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.endpoint_url().unwrap().as_str(), "https://bot.example.com/chat");
    }

    #[test]
    fn endpoint_url_rejects_garbage() {
        let cfg = AppConfig {
            endpoint: "http://".into(),
            ..AppConfig::default()
        };
        assert!(matches!(
            cfg.endpoint_url(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn zero_timeout_means_none() {
        let cfg = AppConfig {
            request_timeout_secs: Some(0),
            ..AppConfig::default()
        };
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(
            AppConfig::default().request_timeout(),
            Some(Duration::from_secs(60))
        );
    }
}
