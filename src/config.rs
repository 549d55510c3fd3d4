//! Configuration management for tripwise
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripwiseError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const API_KEY_FALLBACK_VAR: &str = "GROQ_API_KEY";

/// Root configuration structure for the tripwise service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripwiseConfig {
    /// Generative capability configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Budget gates and plan checking
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative capability settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier used for every call
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Timeout for each semantic check in seconds
    #[serde(default = "default_validation_timeout")]
    pub validation_timeout_seconds: u64,
    /// Timeout for plan generation in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_seconds: u64,
    #[serde(default = "default_validation_temperature")]
    pub validation_temperature: f64,
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f64,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// PEM certificate chain, enables HTTPS together with `tls_key_path`
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key
    pub tls_key_path: Option<PathBuf>,
}

/// Budget gate ratios and plan consistency policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Requests below `minimum_required * floor_ratio` are rejected before generation
    #[serde(default = "default_floor_ratio")]
    pub floor_ratio: f64,
    /// Plans above `budget * ceiling_ratio` are rejected after generation
    #[serde(default = "default_ceiling_ratio")]
    pub ceiling_ratio: f64,
    /// Treat plan consistency findings as fatal
    #[serde(default)]
    pub strict_consistency: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint, span export is off when unset
    pub otlp_endpoint: Option<String>,
    /// Service name reported to the collector
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_validation_timeout() -> u64 {
    30
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_validation_temperature() -> f64 {
    0.1
}

fn default_generation_temperature() -> f64 {
    0.2
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_floor_ratio() -> f64 {
    0.5
}

fn default_ceiling_ratio() -> f64 {
    1.5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "tripwise".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            validation_timeout_seconds: default_validation_timeout(),
            generation_timeout_seconds: default_generation_timeout(),
            validation_temperature: default_validation_temperature(),
            generation_temperature: default_generation_temperature(),
        }
    }
}

// Keeps the credential out of logs and `--check-config` output
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("validation_timeout_seconds", &self.validation_timeout_seconds)
            .field("generation_timeout_seconds", &self.generation_timeout_seconds)
            .field("validation_temperature", &self.validation_temperature)
            .field("generation_temperature", &self.generation_temperature)
            .finish()
    }
}

impl LlmConfig {
    #[must_use]
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_seconds)
    }

    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_bytes: default_max_body_bytes(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            floor_ratio: default_floor_ratio(),
            ceiling_ratio: default_ceiling_ratio(),
            strict_consistency: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

impl TripwiseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPWISE_LLM__MODEL
        builder = builder.add_source(
            Environment::with_prefix("TRIPWISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripwiseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(API_KEY_FALLBACK_VAR).ok();
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripwise").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            self.llm.api_key = None;
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.validation_timeout_seconds == 0 {
            self.llm.validation_timeout_seconds = default_validation_timeout();
        }
        if self.llm.generation_timeout_seconds == 0 {
            self.llm.generation_timeout_seconds = default_generation_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.service_name.is_empty() {
            self.logging.service_name = default_service_name();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.llm.api_key {
            if api_key.len() < 8 {
                return Err(TripwiseError::config(
                    "LLM API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 200 {
                return Err(TripwiseError::config(
                    "LLM API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Fail unless a credential is available; needed before serving
    pub fn require_api_key(&self) -> Result<()> {
        if self.llm.api_key.is_none() {
            return Err(TripwiseError::config(format!(
                "No LLM API key configured. Set llm.api_key, TRIPWISE_LLM__API_KEY or {API_KEY_FALLBACK_VAR}."
            ))
            .into());
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.llm.validation_timeout_seconds > 300 {
            return Err(TripwiseError::config(
                "Validation timeout cannot exceed 300 seconds",
            )
            .into());
        }

        if self.llm.generation_timeout_seconds > 300 {
            return Err(TripwiseError::config(
                "Generation timeout cannot exceed 300 seconds",
            )
            .into());
        }

        for (name, value) in [
            ("Validation temperature", self.llm.validation_temperature),
            ("Generation temperature", self.llm.generation_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(TripwiseError::config(format!(
                    "{name} must be between 0 and 2, got {value}"
                ))
                .into());
            }
        }

        let planner = &self.planner;
        if !(planner.floor_ratio > 0.0 && planner.floor_ratio <= 1.0) {
            return Err(TripwiseError::config(format!(
                "Budget floor ratio must be in (0, 1], got {}",
                planner.floor_ratio
            ))
            .into());
        }

        if !(planner.ceiling_ratio >= 1.0 && planner.ceiling_ratio.is_finite()) {
            return Err(TripwiseError::config(format!(
                "Budget ceiling ratio must be at least 1, got {}",
                planner.ceiling_ratio
            ))
            .into());
        }

        if self.server.max_body_bytes > 16 * 1024 * 1024 {
            return Err(TripwiseError::config(
                "Request body limit cannot exceed 16 MiB",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripwiseError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripwiseError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.llm.base_url) {
            return Err(TripwiseError::config(
                "LLM base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(TripwiseError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(TripwiseError::config(
                "TLS needs both tls_cert_path and tls_key_path",
            )
            .into());
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
