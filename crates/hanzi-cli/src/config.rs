//! Configuration management for Hanzi CLI
//!
//! Stores the server URL and generative API settings in
//! ~/.config/hanzi/config.toml

use anyhow::{Context, Result};
use hanzi::services::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR: &str = "hanzi";
const CONFIG_FILE: &str = "config.toml";

/// Generative API settings used by `generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

/// CLI Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub llm: LlmSettings,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            llm: LlmSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = url.trim_end_matches('/').to_string();
    }

    /// Update only the settings that were given
    pub fn set_llm(
        &mut self,
        api_base: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
    ) {
        if let Some(api_base) = api_base {
            self.llm.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = api_key {
            self.llm.api_key = Some(api_key);
        }
        if let Some(model) = model {
            self.llm.model = model;
        }
    }
}

/// Show the first and last few characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.llm.model, "deepseek-v3");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_partial_llm_section() {
        let config = Config::parse(
            r#"
            base_url = "https://hanzi.example.com"

            [llm]
            api_key = "sk-123"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://hanzi.example.com");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-123"));
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_set_llm_keeps_unset_fields() {
        let mut config = Config::default();
        config.set_llm(Some("https://api.deepseek.com/v1/".to_string()), None, None);
        assert_eq!(config.llm.api_base, "https://api.deepseek.com/v1");
        assert_eq!(config.llm.model, "deepseek-v3");

        let saved = toml::to_string_pretty(&config).unwrap();
        let reloaded = Config::parse(&saved).unwrap();
        assert_eq!(reloaded.llm.api_base, "https://api.deepseek.com/v1");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-abcdefghijkl"), "sk-a...ijkl");
        assert_eq!(mask_secret("short"), "*****");
    }
}
