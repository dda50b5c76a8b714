use anyhow::{Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::errors::AppError;
use crate::input::DEFAULT_CHARACTER_LIMIT;
use crate::options::SummarizerOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Which host provides summarization and how to reach it
    #[serde(default)]
    pub capability: CapabilityConfig,

    /// Selector values used until the user changes them
    #[serde(default)]
    pub summarizer: SummarizerOptions,

    /// Debounce and input feedback settings
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Summarization host type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityProvider {
    // @provider: Local Ollama server
    #[default]
    Ollama,
    // @provider: In-process scripted host
    Mock,
}

impl CapabilityProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for CapabilityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for CapabilityProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Summarization host configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CapabilityConfig {
    /// Host to use
    #[serde(default)]
    pub provider: CapabilityProvider,

    /// Model name (e.g., "llama3.2:3b")
    #[serde(default = "default_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whether a missing model may be pulled on first use.
    /// When false, a missing model makes the host report the `no` tier.
    #[serde(default = "default_true")]
    pub allow_download: bool,

    /// Request timeout in seconds for summarize calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            provider: CapabilityProvider::default(),
            model: default_model(),
            endpoint: default_endpoint(),
            allow_download: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Settings of the summarization controller
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Quiet period after the last event before a summary is generated
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Character count above which the input is flagged as too long
    #[serde(default = "default_character_limit")]
    pub character_limit: usize,
}

impl ControllerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            character_limit: default_character_limit(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_character_limit() -> usize {
    DEFAULT_CHARACTER_LIMIT
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self, AppError> {
        if path.exists() {
            let file = File::open(path).map_err(|e| {
                AppError::File(format!("Failed to open config file {}: {}", path.display(), e))
            })?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader).map_err(|e| {
                AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
            })?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let config_json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, config_json).map_err(|e| {
            AppError::File(format!("Failed to write config to file {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.controller.debounce_ms == 0 {
            return Err(AppError::Config("Debounce period must be greater than zero".to_string()));
        }

        if self.controller.character_limit == 0 {
            return Err(AppError::Config("Character limit must be greater than zero".to_string()));
        }

        if self.capability.provider == CapabilityProvider::Ollama {
            if self.capability.model.trim().is_empty() {
                return Err(AppError::Config(
                    "A model name is required for the Ollama provider".to_string(),
                ));
            }
            url::Url::parse(&self.capability.endpoint).map_err(|e| {
                AppError::Config(format!("Invalid Ollama endpoint {}: {}", self.capability.endpoint, e))
            })?;
        }

        Ok(())
    }
}
