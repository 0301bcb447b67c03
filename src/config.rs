//! Configuration management for the TripFlow backend
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `TRIPFLOW_`-prefixed environment variables, and finally the conventional
//! `WEATHER_API_KEY` / `OPENROUTER_API_KEY` credential variables. A `.env` file in
//! the working directory is loaded into the process environment first; variables
//! already set take precedence over it. The resulting
//! [`TripflowConfig`] is built once in `main` and handed to the upstream clients.

use crate::ProxyError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// File read when `TRIPFLOW_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "tripflow.toml";

/// Local environment file holding credentials for development
pub const ENV_FILE: &str = ".env";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripflowConfig {
    /// Listener settings
    pub server: ServerConfig,
    /// Weather provider settings
    pub weather: WeatherConfig,
    /// LLM completion provider settings
    pub llm: LlmConfig,
    /// Cross-origin policy for `/api/*`
    pub cors: CorsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for inbound request bodies
    pub max_body_bytes: usize,
    /// PEM certificate chain, only used with the `tls` feature
    pub tls_cert: Option<PathBuf>,
    /// PEM private key, only used with the `tls` feature
    pub tls_key: Option<PathBuf>,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// WeatherAPI.com key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries on transient failures; 0 means every call is attempted exactly once
    pub max_retries: u32,
}

/// LLM completion API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenRouter key
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API
    pub base_url: String,
    /// Model used for day analysis
    pub analysis_model: String,
    /// Model used for day autofill
    pub autofill_model: String,
    /// Sent as `HTTP-Referer` on autofill requests
    pub referer: String,
    /// Sent as `X-Title` on autofill requests
    pub app_title: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries on transient failures; 0 means every call is attempted exactly once
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Browser origins allowed to call `/api/*`
    pub allowed_origins: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace); `RUST_LOG` takes precedence
    pub level: String,
    /// Log format (pretty, compact or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_analysis_model() -> String {
    "arcee-ai/trinity-mini:free".to_string()
}

fn default_autofill_model() -> String {
    "nvidia/nemotron-3-nano-30b-a3b:free".to_string()
}

fn default_referer() -> String {
    "http://localhost:4200".to_string()
}

fn default_app_title() -> String {
    "TripFlow".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:4200".to_string(),
        "https://tripflow-app-d3e2c.web.app".to_string(),
        "https://tripflow-app-d3e2c.firebaseapp.com".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            analysis_model: default_analysis_model(),
            autofill_model: default_autofill_model(),
            referer: default_referer(),
            app_title: default_app_title(),
            timeout_seconds: default_llm_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    /// The configured key, treating an empty string as unset
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

impl LlmConfig {
    /// The configured key, treating an empty string as unset
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

impl TripflowConfig {
    /// Load configuration from `$TRIPFLOW_CONFIG` (or `./tripflow.toml`) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(env::var_os("TRIPFLOW_CONFIG").map(PathBuf::from))
    }

    /// Load configuration from the specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        load_env_file(Path::new(ENV_FILE))?;

        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("TRIPFLOW")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("weather.api_key", env::var("WEATHER_API_KEY").ok())
            .with_context(|| "Failed to apply WEATHER_API_KEY")?
            .set_override_option("llm.api_key", env::var("OPENROUTER_API_KEY").ok())
            .with_context(|| "Failed to apply OPENROUTER_API_KEY")?;

        let settings = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {}", config_file.display()))?;

        let mut config: TripflowConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to fields that were set but left empty
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.analysis_model.is_empty() {
            self.llm.analysis_model = default_analysis_model();
        }
        if self.llm.autofill_model.is_empty() {
            self.llm.autofill_model = default_autofill_model();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    ///
    /// Missing API keys are not an error here; handlers report them per request.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Weather", self.weather.timeout_seconds),
            ("LLM", self.llm.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(ProxyError::configuration(format!(
                    "{name} API timeout must be between 1 and 300 seconds, got {timeout}"
                ))
                .into());
            }
        }

        for (name, retries) in [
            ("Weather", self.weather.max_retries),
            ("LLM", self.llm.max_retries),
        ] {
            if retries > 5 {
                return Err(ProxyError::configuration(format!(
                    "{name} API max retries cannot exceed 5, got {retries}"
                ))
                .into());
            }
        }

        if self.server.max_body_bytes == 0 {
            return Err(ProxyError::configuration("Maximum body size must be positive").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ProxyError::configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ProxyError::configuration(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("LLM", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProxyError::configuration(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(ProxyError::configuration(
                "TLS needs both server.tls_cert and server.tls_key",
            )
            .into());
        }
        Ok(())
    }
}

/// Load `path` into the process environment without overriding existing variables.
/// Returns `false` when the file does not exist.
fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TripflowConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.weather.base_url, "https://api.weatherapi.com/v1");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.weather.max_retries, 0);
        assert_eq!(config.llm.analysis_model, "arcee-ai/trinity-mini:free");
        assert_eq!(config.llm.autofill_model, "nvidia/nemotron-3-nano-30b-a3b:free");
        assert_eq!(config.cors.allowed_origins.len(), 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_counts_as_unset() {
        let mut config = TripflowConfig::default();
        config.llm.api_key = Some("   ".to_string());
        assert!(config.llm.api_key().is_none());

        config.llm.api_key = Some("sk-or-test".to_string());
        assert_eq!(config.llm.api_key(), Some("sk-or-test"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripflowConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripflowConfig::default();
        config.llm.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("between 1 and 300"));

        let mut config = TripflowConfig::default();
        config.weather.max_retries = 9;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("cannot exceed 5"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = TripflowConfig::default();
        config.weather.base_url = "api.weatherapi.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_half_tls_pair() {
        let mut config = TripflowConfig::default();
        config.server.tls_cert = Some(PathBuf::from("cert.pem"));
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("tls_key"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_strings() {
        let mut config = TripflowConfig::default();
        config.llm.base_url.clear();
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = env::temp_dir().join(format!("tripflow-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[llm]
autofill_model = "test/model"

[cors]
allowed_origins = ["https://example.test"]
"#,
        )
        .unwrap();

        let config = TripflowConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.autofill_model, "test/model");
        assert_eq!(config.llm.analysis_model, "arcee-ai/trinity-mini:free");
        assert_eq!(config.cors.allowed_origins, vec!["https://example.test"]);
    }

    #[test]
    fn test_env_file_populates_process_environment() {
        let key = format!("TRIPFLOW_TEST_DOTENV_{}", std::process::id());
        let path = env::temp_dir().join(format!("tripflow-{}.env", std::process::id()));
        std::fs::write(&path, format!("# local credentials\n{key}=from-dotenv\n")).unwrap();

        let loaded = load_env_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(loaded);
        assert_eq!(env::var(&key).unwrap(), "from-dotenv");
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let path = env::temp_dir().join("tripflow-does-not-exist.env");
        assert!(!load_env_file(&path).unwrap());
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let path = env::temp_dir().join(format!("tripflow-bad-{}.env", std::process::id()));
        std::fs::write(&path, "NOT VALID LINE 'unterminated\n").unwrap();

        let result = load_env_file(&path);
        std::fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let path = env::temp_dir().join("tripflow-config-does-not-exist.toml");
        let config = TripflowConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.weather.timeout_seconds, 30);
    }
}
