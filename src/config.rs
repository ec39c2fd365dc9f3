use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::auth::Role;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_MINIMUM_PERCENT: u32 = 30;
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_UNIT: &str = "pcs";
const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

/// Workflow policy and logging settings.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Role granted when an access request is approved without one.
    #[serde(default = "Role::least_privileged")]
    pub default_access_role: Role,

    /// Refuse access approvals that do not name a role.
    #[serde(default)]
    pub require_explicit_role: bool,

    /// Minimum threshold of an item created by purchase approval, as a
    /// percentage of the purchased quantity.
    #[serde(default = "default_minimum_percent")]
    #[validate(range(max = 100))]
    pub new_item_minimum_percent: u32,

    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 50))]
    pub new_item_category: String,

    #[serde(default = "default_unit")]
    #[validate(length(min = 1, max = 20))]
    pub new_item_unit: String,

    /// Estimated cost per unit used when reordering low stock.
    #[serde(default = "default_reorder_unit_cost")]
    #[validate(custom = "validate_non_negative")]
    pub reorder_unit_cost: Decimal,

    /// Maximum number of events the notification relay keeps loaded.
    #[serde(default = "default_notification_limit")]
    #[validate(range(min = 1))]
    pub notification_limit: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            default_access_role: Role::least_privileged(),
            require_explicit_role: false,
            new_item_minimum_percent: default_minimum_percent(),
            new_item_category: default_category(),
            new_item_unit: default_unit(),
            reorder_unit_cost: default_reorder_unit_cost(),
            notification_limit: default_notification_limit(),
        }
    }
}

impl WorkflowConfig {
    /// Minimum threshold for a new item created with `quantity` units,
    /// rounded down.
    pub fn minimum_for_new_item(&self, quantity: u32) -> u32 {
        let scaled = u64::from(quantity) * u64::from(self.new_item_minimum_percent);
        u32::try_from(scaled / 100).unwrap_or(u32::MAX)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_minimum_percent() -> u32 {
    DEFAULT_MINIMUM_PERCENT
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_reorder_unit_cost() -> Decimal {
    dec!(10)
}

fn default_notification_limit() -> usize {
    DEFAULT_NOTIFICATION_LIMIT
}

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

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("reorder_unit_cost");
        err.message = Some("Must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Installs the global tracing subscriber. `RUST_LOG`, when set, replaces the
/// configured level.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("school_assets={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt().with_env_filter(EnvFilter::new(filter_directive));
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads configuration from `./config`.
///
/// Sources, later ones winning:
/// 1. Built-in defaults
/// 2. `config/default.*`
/// 3. `config/{RUN_ENV or APP_ENV}.*`
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<WorkflowConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

pub fn load_config_from(dir: &Path, run_env: &str) -> Result<WorkflowConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let workflow_config: WorkflowConfig = config.try_deserialize()?;

    workflow_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(workflow_config)
}
