use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://vendor_management.db?mode=rwc";
const CONFIG_DIR: &str = "config";

const POOL_MAX_CONNECTIONS: u32 = 16;
const POOL_MIN_CONNECTIONS: u32 = 2;
const POOL_CONNECT_TIMEOUT_SECS: u64 = 30;
const POOL_IDLE_TIMEOUT_SECS: u64 = 600;
const POOL_ACQUIRE_TIMEOUT_SECS: u64 = 8;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Settings for the vendor management service.
///
/// Keys match `config/default.toml`; every key can be overridden with an
/// `APP__<KEY>` environment variable.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where vendors and purchase orders are stored (`sqlite://` or `postgres://`).
    #[validate(length(min = 1))]
    pub database_url: String,

    pub host: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Deployment name, e.g. `development` or `production`.
    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Apply the embedded vendor/purchase-order migrations at boot.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,

    /// Comma-separated origins for browser clients of the vendor API.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Accept any origin outside development.
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    // Pool timeouts, in seconds.
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Builds a config from the four required settings; the rest take their defaults.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: default_auto_migrate(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: POOL_MAX_CONNECTIONS,
            db_min_connections: POOL_MIN_CONNECTIONS,
            db_connect_timeout_secs: POOL_CONNECT_TIMEOUT_SECS,
            db_idle_timeout_secs: POOL_IDLE_TIMEOUT_SECS,
            db_acquire_timeout_secs: POOL_ACQUIRE_TIMEOUT_SECS,
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEFAULT_ENV)
    }

    /// Trimmed, non-empty entries of `cors_allowed_origins`.
    pub fn cors_origins(&self) -> Vec<&str> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        !self.cors_origins().is_empty()
    }

    /// Any origin is accepted in development or when the operator opts in.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Cross-field rules the derive cannot express.
    fn check_deployment_rules(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                format!(
                    "the vendor API in `{}` needs APP__CORS_ALLOWED_ORIGINS, or APP__CORS_ALLOW_ANY_ORIGIN=true to accept every origin",
                    self.environment
                )
                .into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.db_min_connections > self.db_max_connections {
            let mut err = ValidationError::new("db_min_connections");
            err.message = Some(
                format!(
                    "pool minimum ({}) is above the pool maximum ({})",
                    self.db_min_connections, self.db_max_connections
                )
                .into(),
            );
            errors.add("db_min_connections", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("could not read vendor service settings: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid vendor service settings: {0}")]
    Validation(#[from] ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_auto_migrate() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    POOL_MAX_CONNECTIONS
}

fn default_db_min_connections() -> u32 {
    POOL_MIN_CONNECTIONS
}

fn default_db_connect_timeout_secs() -> u64 {
    POOL_CONNECT_TIMEOUT_SECS
}

fn default_db_idle_timeout_secs() -> u64 {
    POOL_IDLE_TIMEOUT_SECS
}

fn default_db_acquire_timeout_secs() -> u64 {
    POOL_ACQUIRE_TIMEOUT_SECS
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Ok(());
    }
    let mut err = ValidationError::new("log_level");
    err.message = Some(format!("`{}` is not one of {}", level, LOG_LEVELS.join(", ")).into());
    Err(err)
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the
/// `vendor_management_api=<level>` default.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("vendor_management_api={},tower_http=debug", level));

    let filter = EnvFilter::new(directive);
    let builder = fmt().with_env_filter(filter);
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Reads the service settings.
///
/// Later sources win: built-in defaults, `config/default.toml`,
/// `config/{RUN_ENV}.toml`, then `APP__*` variables. `RUN_ENV` (or `APP_ENV`)
/// picks the environment file and defaults to `development`.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!(environment = %run_env, "reading vendor service settings");

    if !Path::new(CONFIG_DIR).exists() {
        warn!(dir = CONFIG_DIR, "no config directory; using defaults and APP__* variables");
    }

    let settings = Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;

    if let Err(errors) = app_config
        .validate()
        .and_then(|()| app_config.check_deployment_rules())
    {
        error!(?errors, "rejected vendor service settings");
        return Err(errors.into());
    }

    info!(
        environment = %app_config.environment,
        port = app_config.port,
        "vendor service settings ready"
    );
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        )
    }

    #[test]
    fn production_without_origins_is_rejected() {
        let errors = production().check_deployment_rules().unwrap_err();
        assert!(errors.field_errors().contains_key("cors_allowed_origins"));
    }

    #[test]
    fn any_origin_opt_in_satisfies_production() {
        let mut cfg = production();
        cfg.cors_allow_any_origin = true;
        assert!(cfg.check_deployment_rules().is_ok());
    }

    #[test]
    fn listed_origins_satisfy_production() {
        let mut cfg = production();
        cfg.cors_allowed_origins = Some("https://procurement.example.com".into());
        assert!(cfg.check_deployment_rules().is_ok());
    }

    #[test]
    fn origin_list_is_trimmed_and_blank_entries_dropped() {
        let mut cfg = production();
        cfg.cors_allowed_origins = Some(" , ".into());
        assert!(!cfg.has_cors_allowed_origins());

        cfg.cors_allowed_origins = Some(" https://a.example , ,https://b.example".into());
        assert_eq!(cfg.cors_origins(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn pool_minimum_cannot_exceed_maximum() {
        let mut cfg = production();
        cfg.environment = "development".into();
        cfg.db_min_connections = 5;
        cfg.db_max_connections = 1;
        let errors = cfg.check_deployment_rules().unwrap_err();
        assert!(errors.field_errors().contains_key("db_min_connections"));
    }

    #[test]
    fn log_level_is_case_insensitive_but_checked() {
        let mut cfg = production();
        cfg.log_level = "verbose".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));

        cfg.log_level = "DEBUG".into();
        assert!(cfg.validate().is_ok());
    }
}
