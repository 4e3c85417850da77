//! Server configuration
//!
//! Read from the process environment (after `.env` is loaded by dotenvy).

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use hanzi::services::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use hanzi::BackfillConfig;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub backfill: BackfillConfig,
    /// Seed file imported at startup
    pub seed_file: Option<PathBuf>,
}

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub schema: String,
    pub max_connections: u32,
    /// Production deployments require TLS
    pub production: bool,
    pub connect_attempts: u32,
    pub connect_retry_delay: Duration,
}

/// Generative API settings
#[derive(Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database = DatabaseConfig {
            host: or_default(&lookup, "DB_HOST", "localhost"),
            port: parse_or(&lookup, "DB_PORT", 5432)?,
            user: or_default(&lookup, "DB_USER", "postgres"),
            password: or_default(&lookup, "DB_PASSWORD", ""),
            name: or_default(&lookup, "DB_NAME", "hanzi"),
            schema: or_default(&lookup, "SCHEMA", "public"),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            production,
            connect_attempts: 3,
            connect_retry_delay: Duration::from_secs(5),
        };

        let llm = LlmConfig {
            api_base: or_default(&lookup, "OPENAI_API_BASE", DEFAULT_API_BASE),
            api_key: lookup("OPENAI_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set"))?,
            model: or_default(&lookup, "MODEL_NAME", DEFAULT_MODEL),
        };

        let defaults = BackfillConfig::default();
        let backfill = BackfillConfig {
            max_attempts: parse_or(&lookup, "BACKFILL_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_delay: Duration::from_millis(parse_or(
                &lookup,
                "BACKFILL_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )?),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "BACKFILL_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            batch_size: defaults.batch_size,
        };
        if backfill.max_attempts == 0 {
            return Err(anyhow!("BACKFILL_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database,
            llm,
            backfill,
            seed_file: lookup("HANZI_SEED_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

impl DatabaseConfig {
    /// Connection options for the pool
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.production {
            PgSslMode::Require
        } else {
            PgSslMode::Disable
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode)
            .options([("search_path", self.schema.as_str())])
    }
}

// Keep secrets out of logs
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("max_connections", &self.max_connections)
            .field("production", &self.production)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        tracing::debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Invalid {key} value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.schema, "public");
        assert!(!config.database.production);
        assert_eq!(config.llm.model, "deepseek-v3");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
        assert_eq!(config.backfill.max_attempts, 3);
        assert_eq!(config.backfill.retry_delay, Duration::from_millis(500));
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "https://api.deepseek.com/v1"),
            ("MODEL_NAME", "deepseek-chat"),
            ("PORT", "8080"),
            ("DB_PORT", "6543"),
            ("SCHEMA", "hanzi"),
            ("APP_ENV", "Production"),
            ("BACKFILL_RETRY_DELAY_MS", "100"),
            ("HANZI_SEED_FILE", "data/characters.json"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.schema, "hanzi");
        assert!(config.database.production);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.backfill.retry_delay, Duration::from_millis(100));
        assert_eq!(
            config.seed_file,
            Some(PathBuf::from("data/characters.json"))
        );
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        assert!(config(&[]).is_err());
        assert!(config(&[("OPENAI_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = config(&[("OPENAI_API_KEY", "k"), ("DB_PORT", "five")]).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
        assert!(config(&[("OPENAI_API_KEY", "k"), ("BACKFILL_MAX_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = config(&[("OPENAI_API_KEY", "sk-secret"), ("DB_PASSWORD", "hunter2")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
