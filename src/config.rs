use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::llm::openai::DEFAULT_BASE_URL;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that manages the user's to-do list. \
Use the provided functions to create, list, search, and delete to-dos. \
Refer to to-dos by their numeric id when deleting. Keep answers short.";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TodoChatConfig {
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable that holds the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    /// How many times a single prompt may run function calls before giving up.
    pub max_tool_rounds: usize,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            max_tokens: 1024,
            max_tool_rounds: 1,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("todos.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        // Quiet by default so log lines don't interleave with the chat transcript.
        Self {
            level: "warn".into(),
        }
    }
}

/// Returns `~/.todo-chat/`, or `./.todo-chat/` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".todo-chat")
}

/// Returns the default config file path: `~/.todo-chat/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl TodoChatConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a path the user named explicitly. Unlike [`Self::load_from`],
    /// a missing file is an error.
    pub fn load_required(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        Self::load_from(path)
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            TodoChatConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (TODO_CHAT_DB, TODO_CHAT_MODEL, TODO_CHAT_BASE_URL, TODO_CHAT_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TODO_CHAT_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TODO_CHAT_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("TODO_CHAT_BASE_URL") {
            self.llm.base_url = val;
        }
        if let Ok(val) = std::env::var("TODO_CHAT_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env).with_context(|| {
            format!(
                "environment variable {} is not set (put it in the environment or a .env file)",
                self.llm.api_key_env
            )
        })
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
