use crate::infrastructure::error::InfraError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const APP_JSON: &str = "app.json";
const SUPPORTED_SCHEMA: u64 = 1;

pub const ENV_STORE_URL: &str = "FOCUSBOARD_STORE_URL";
pub const ENV_USERNAME: &str = "FOCUSBOARD_USERNAME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelConfig {
    pub steps: u32,
    pub step_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote collection endpoint. `None` keeps every record in memory.
    pub store_url: Option<Url>,
    pub username: String,
    pub upload_timeout: Duration,
    pub fetch_timeout: Duration,
    pub tick_interval: Duration,
    pub wheel: WheelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            username: String::new(),
            upload_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(10),
            tick_interval: Duration::from_secs(1),
            wheel: WheelConfig {
                steps: 15,
                step_delay: Duration::from_millis(100),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppConfigFile {
    #[serde(default)]
    store_url: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    upload_timeout_seconds: u64,
    #[serde(default = "default_timeout_seconds")]
    fetch_timeout_seconds: u64,
    #[serde(default = "default_tick_millis")]
    tick_millis: u64,
    #[serde(default)]
    wheel: WheelConfigFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WheelConfigFile {
    #[serde(default = "default_wheel_steps")]
    steps: u32,
    #[serde(default = "default_wheel_step_delay_millis")]
    step_delay_millis: u64,
}

impl Default for WheelConfigFile {
    fn default() -> Self {
        Self {
            steps: default_wheel_steps(),
            step_delay_millis: default_wheel_step_delay_millis(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_tick_millis() -> u64 {
    1_000
}

fn default_wheel_steps() -> u32 {
    15
}

fn default_wheel_step_delay_millis() -> u64 {
    100
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([(
        APP_JSON,
        serde_json::json!({
            "schema": 1,
            "storeUrl": "",
            "username": "",
            "uploadTimeoutSeconds": default_timeout_seconds(),
            "fetchTimeoutSeconds": default_timeout_seconds(),
            "tickMillis": default_tick_millis(),
            "wheel": {
                "steps": default_wheel_steps(),
                "stepDelayMillis": default_wheel_step_delay_millis()
            }
        }),
    )])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    load_app_config_from_lookup(config_dir, |key| std::env::var(key).ok())
}

/// Reads `app.json` and applies overrides resolved through `lookup`.
pub fn load_app_config_from_lookup<F>(config_dir: &Path, lookup: F) -> Result<AppConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = config_dir.join(APP_JSON);
    let file: AppConfigFile = serde_json::from_value(read_config(&path)?)?;

    let store_url = optional_lookup_value(&lookup, ENV_STORE_URL)
        .or_else(|| non_empty(file.store_url))
        .map(|raw| parse_store_url(&raw))
        .transpose()?;
    let username = optional_lookup_value(&lookup, ENV_USERNAME)
        .or_else(|| non_empty(file.username))
        .unwrap_or_default();

    let config = AppConfig {
        store_url,
        username,
        upload_timeout: Duration::from_secs(file.upload_timeout_seconds),
        fetch_timeout: Duration::from_secs(file.fetch_timeout_seconds),
        tick_interval: Duration::from_millis(file.tick_millis),
        wheel: WheelConfig {
            steps: file.wheel.steps,
            step_delay: Duration::from_millis(file.wheel.step_delay_millis),
        },
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), InfraError> {
    if config.upload_timeout.is_zero() {
        return Err(InfraError::InvalidConfig(
            "uploadTimeoutSeconds must be > 0".to_string(),
        ));
    }
    if config.fetch_timeout.is_zero() {
        return Err(InfraError::InvalidConfig(
            "fetchTimeoutSeconds must be > 0".to_string(),
        ));
    }
    if config.tick_interval.is_zero() {
        return Err(InfraError::InvalidConfig("tickMillis must be > 0".to_string()));
    }
    if config.wheel.steps == 0 {
        return Err(InfraError::InvalidConfig("wheel.steps must be > 0".to_string()));
    }
    Ok(())
}

fn parse_store_url(raw: &str) -> Result<Url, InfraError> {
    let url = Url::parse(raw)
        .map_err(|error| InfraError::InvalidConfig(format!("storeUrl is not a valid URL: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(InfraError::InvalidConfig(format!(
            "storeUrl must be http or https, got {}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn optional_lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
