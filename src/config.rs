use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Backend used when neither the environment nor the config file names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Base URL of the assistant backend (the client appends `/api/chat`).
    pub endpoint: Option<String>,
    /// Log filter directive, e.g. "info" or "educhat=debug".
    pub log_filter: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file, writing a default one on first run so users
    /// have something to edit.
    pub fn load_or_init() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::new();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Resolve the backend base URL: env var first, then config, then the
    /// compiled-in default.
    pub fn endpoint(&self) -> String {
        std::env::var("EDUCHAT_ENDPOINT")
            .ok()
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("educhat").join("config.json"))
    }
}

/// Where transcript exports land.
pub fn transcript_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not determine data directory"))?;
    Ok(data_dir.join("educhat").join("transcript.html"))
}

/// Where the diagnostic log lands.
pub fn log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| anyhow!("Could not determine data directory"))?;
    Ok(data_dir.join("educhat").join("educhat.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("empty config parses");
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn configured_endpoint_is_used() {
        let config = Config {
            endpoint: Some("http://assistant.internal:8080".to_string()),
            log_filter: None,
        };
        // Env override is absent in tests unless set by the environment.
        if std::env::var("EDUCHAT_ENDPOINT").is_err() {
            assert_eq!(config.endpoint(), "http://assistant.internal:8080");
        }
    }
}
