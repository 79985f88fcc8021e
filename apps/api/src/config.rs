use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};

/// Which `SessionStore` backend to open at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    File { dir: PathBuf },
    Postgres { database_url: String },
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub store: StoreBackend,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("anthropic_api_key", &"[REDACTED]")
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("store", &self.store)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("llm_max_attempts", &self.llm_max_attempts)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing is testable without
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("file") {
            "file" => StoreBackend::File {
                dir: PathBuf::from(lookup("STORE_DIR").unwrap_or_else(|| "./data".to_string())),
            },
            "postgres" => StoreBackend::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be one of file, postgres, memory (got '{other}')"),
        };

        let llm_max_attempts = parse_or(&lookup, "LLM_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1 (it counts the first request)");
        }

        Ok(Config {
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            store,
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            llm_max_attempts,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
