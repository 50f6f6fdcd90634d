use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_STORAGE_BACKEND: &str = "database";
const DEFAULT_UPC_BASE_URL: &str = "https://api.upcitemdb.com/prod/trial";
const DEFAULT_UPC_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOOKUP_ALLOWED_ORIGINS: &str =
    "https://lager-tesla.vercel.app,https://lager-tesla.netlify.app,http://localhost:5173";
const DEFAULT_LOOKUP_FALLBACK_ORIGIN: &str = "https://lager-tesla.vercel.app";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[validate(custom = "validate_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Item storage backend selection ("memory" or "database")
    #[serde(default = "default_storage_backend")]
    #[validate(custom = "validate_storage_backend")]
    pub storage_backend: String,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Insert the bundled starter items when the store is empty
    #[serde(default = "default_true_bool")]
    pub seed_on_empty: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default = "default_false_bool")]
    pub cors_allow_any_origin: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Base URL of the upstream UPC database
    #[serde(default = "default_upc_base_url")]
    pub upc_base_url: String,

    /// Timeout (seconds) for upstream UPC lookups
    #[serde(default = "default_upc_timeout_secs")]
    pub upc_timeout_secs: u64,

    /// Lookup proxy: comma-separated allow-list of caller origins
    #[serde(default = "default_lookup_allowed_origins")]
    pub lookup_allowed_origins: String,

    /// Lookup proxy: canonical origin used when the caller is not allow-listed
    #[serde(default = "default_lookup_fallback_origin")]
    pub lookup_fallback_origin: String,
}

impl AppConfig {
    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Creates a new configuration
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            storage_backend: default_storage_backend(),
            auto_migrate: false,
            seed_on_empty: default_true_bool(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            upc_base_url: default_upc_base_url(),
            upc_timeout_secs: default_upc_timeout_secs(),
            lookup_allowed_origins: default_lookup_allowed_origins(),
            lookup_fallback_origin: default_lookup_fallback_origin(),
        }
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Whether items are kept in the relational store
    pub fn uses_database_store(&self) -> bool {
        self.storage_backend.eq_ignore_ascii_case("database")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Parsed allow-list for the lookup proxy
    pub fn lookup_origins(&self) -> Vec<String> {
        self.lookup_allowed_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if Url::parse(&self.upc_base_url).is_err() {
            let mut err = ValidationError::new("upc_base_url_invalid");
            err.message = Some("upc_base_url must be an absolute URL".into());
            errors.add("upc_base_url", err);
        }

        if Url::parse(&self.lookup_fallback_origin).is_err() {
            let mut err = ValidationError::new("lookup_fallback_origin_invalid");
            err.message = Some("lookup_fallback_origin must be an absolute URL".into());
            errors.add("lookup_fallback_origin", err);
        }

        if self.lookup_origins().is_empty() {
            let mut err = ValidationError::new("lookup_allowed_origins_empty");
            err.message =
                Some("lookup_allowed_origins must list at least one caller origin".into());
            errors.add("lookup_allowed_origins", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_storage_backend() -> String {
    DEFAULT_STORAGE_BACKEND.to_string()
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_false_bool() -> bool {
    false
}
fn default_true_bool() -> bool {
    true
}

fn default_event_channel_capacity() -> usize {
    1024
}

fn default_upc_base_url() -> String {
    DEFAULT_UPC_BASE_URL.to_string()
}

fn default_upc_timeout_secs() -> u64 {
    DEFAULT_UPC_TIMEOUT_SECS
}

fn default_lookup_allowed_origins() -> String {
    DEFAULT_LOOKUP_ALLOWED_ORIGINS.to_string()
}

fn default_lookup_fallback_origin() -> String {
    DEFAULT_LOOKUP_FALLBACK_ORIGIN.to_string()
}

fn validate_storage_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "memory" | "database" => Ok(()),
        _ => {
            let mut err = ValidationError::new("storage_backend");
            err.message = Some("Must be one of: memory, database".into());
            Err(err)
        }
    }
}

fn validate_environment(value: &str) -> Result<(), ValidationError> {
    let valid = ["development", "test", "staging", "production"];
    if valid.contains(&value.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("environment");
        err.message = Some("Must be one of: development, test, staging, production".into());
        Err(err)
    }
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_event_channel_capacity(capacity: &usize) -> Result<(), ValidationError> {
    if *capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("lager_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting the config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://lager.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}


#[cfg(test)]
mod backend_validation_tests {
    use super::*;

    fn dev_config() -> AppConfig {
        AppConfig::new(
            "sqlite://lager.db?mode=memory".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[test]
    fn default_backend_is_database() {
        let cfg = dev_config();
        assert!(cfg.uses_database_store());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn memory_backend_accepted() {
        let mut cfg = dev_config();
        cfg.storage_backend = "memory".into();
        assert!(!cfg.uses_database_store());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut cfg = dev_config();
        cfg.storage_backend = "filesystem".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("storage_backend"));
    }

    #[test]
    fn lookup_origins_are_trimmed_and_split() {
        let mut cfg = dev_config();
        cfg.lookup_allowed_origins = " https://a.example , https://b.example ,".into();
        assert_eq!(
            cfg.lookup_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn malformed_upstream_url_rejected() {
        let mut cfg = dev_config();
        cfg.upc_base_url = "not a url".into();
        assert!(cfg.validate_additional_constraints().is_err());
    }
}
