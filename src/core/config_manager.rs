// src/core/config_manager.rs
//! Loads `config.yaml` and the API credential

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::core::FsOps;
use crate::error::ConfigError;

const API_KEY_FIELD: &str = "api-key";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub generator: GeneratorConfig,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "api-key")]
    api_key: Option<String>,
}

impl ConfigManager {
    /// Load configuration; a missing file means built-in defaults
    pub fn load(config_path: &Path) -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current directory")?;

        let (generator, source) = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let generator = Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            info!("Loaded configuration from {}", config_path.display());
            (generator, Some(config_path.to_path_buf()))
        } else {
            info!(
                "No configuration at {}, using defaults",
                config_path.display()
            );
            (GeneratorConfig::default(), None)
        };

        Ok(Self {
            generator: generator.resolve_paths(&root),
            source,
        })
    }

    fn parse(content: &str) -> Result<GeneratorConfig> {
        // An empty YAML document deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(GeneratorConfig::default());
        }
        let config: GeneratorConfig = serde_yaml::from_str(content)?;
        if config.retry_budget == 0 {
            anyhow::bail!("retry_budget must be at least 1");
        }
        Ok(config)
    }

    /// Read the credential from the secrets file.
    ///
    /// A missing file, unparsable JSON or absent/empty key all mean generation
    /// cannot proceed.
    pub fn load_api_key(&self) -> Result<String, ConfigError> {
        let path = self.generator.secrets_path();
        let missing = || ConfigError::MissingCredential { path: path.clone() };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            warn!("Cannot read secrets file {}: {}", path.display(), e);
            missing()
        })?;
        let secrets: SecretsFile = serde_json::from_str(&content).map_err(|e| {
            warn!("Secrets file {} is not valid JSON: {}", path.display(), e);
            missing()
        })?;

        match secrets.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => {
                warn!("Secrets file has no '{}' entry", API_KEY_FIELD);
                Err(missing())
            }
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.generator.output_dir).await
    }
}
