//! Runtime configuration loaded from environment variables.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::fleet::ExecutionStrategy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Language model settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    /// Upper bound for a single model call
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

/// Settings handed to every fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetSettings {
    pub llm_timeout: Duration,
    pub strategy: ExecutionStrategy,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            strategy: ExecutionStrategy::Sequential,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub fleet: FleetSettings,
    pub log: LogConfig,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a specific env file. Values in the file win over the
    /// process environment; the process environment is not modified.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to open env file {}", path.display()))?
        {
            let (key, value) =
                item.with_context(|| format!("malformed line in {}", path.display()))?;
            vars.insert(key, value);
        }
        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match non_empty("COUNSEL_LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("COUNSEL_LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("COUNSEL_LLM_TIMEOUT_SECS must be greater than zero"));
        }
        let timeout = Duration::from_secs(timeout_secs);

        let temperature = match non_empty("COUNSEL_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .context("COUNSEL_TEMPERATURE must be a number")?,
            None => DEFAULT_TEMPERATURE,
        };

        let max_output_tokens = non_empty("COUNSEL_MAX_OUTPUT_TOKENS")
            .map(|raw| raw.trim().parse::<u32>())
            .transpose()
            .context("COUNSEL_MAX_OUTPUT_TOKENS must be a positive integer")?;

        let strategy = match non_empty("COUNSEL_EXECUTION_STRATEGY") {
            Some(raw) => raw.parse::<ExecutionStrategy>().map_err(|e| anyhow!(e))?,
            None => ExecutionStrategy::Sequential,
        };

        Ok(Config {
            llm: LlmConfig {
                api_key: non_empty("GOOGLE_API_KEY"),
                model: non_empty("COUNSEL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                max_output_tokens,
                timeout,
            },
            fleet: FleetSettings {
                llm_timeout: timeout,
                strategy,
            },
            log: LogConfig {
                level: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            },
        })
    }
}

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            config.level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
