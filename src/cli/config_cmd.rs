//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, NetworkConfig, NetworkMode};
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS, VALID_LOG_LEVELS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(read_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, read_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Split a comma separated list of durations
fn parse_delay_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Store a validated value in the config
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value_string = Some(value.to_string());

    match key {
        "server_url" => config.server_url = value_string,
        "endpoint" => config.endpoint = value_string,
        "auth_token" => config.auth_token = value_string,
        "recordings_dir" => config.recordings_dir = value_string,
        "metadata_file" => config.metadata_file = value_string,
        "max_retries" => {
            config.max_retries = Some(
                value
                    .parse()
                    .map_err(|_| invalid(key, "Value must be a positive integer"))?,
            )
        }
        "retry_delays" => config.retry_delays = Some(parse_delay_list(value)),
        "upload_timeout" => config.upload_timeout = value_string,
        "rescan_interval" => config.rescan_interval = value_string,
        "log_level" => config.log_level = Some(value.to_lowercase()),
        "network.mode" | "network.poll_interval" => {
            let network = config.network.get_or_insert_with(NetworkConfig::default);
            if key == "network.mode" {
                network.mode = Some(value.to_lowercase());
            } else {
                network.poll_interval = value_string;
            }
        }
        _ => return Err(invalid(key, "Unknown key")),
    }

    Ok(())
}

/// Read a value for display; secrets are masked
fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "server_url" => config.server_url.clone(),
        "endpoint" => config.endpoint.clone(),
        "auth_token" => config.auth_token.as_deref().map(mask_token),
        "recordings_dir" => config.recordings_dir.clone(),
        "metadata_file" => config.metadata_file.clone(),
        "max_retries" => config.max_retries.map(|n| n.to_string()),
        "retry_delays" => config.retry_delays.as_ref().map(|d| d.join(", ")),
        "upload_timeout" => config.upload_timeout.clone(),
        "rescan_interval" => config.rescan_interval.clone(),
        "log_level" => config.log_level.clone(),
        "network.mode" => config.network.as_ref().and_then(|n| n.mode.clone()),
        "network.poll_interval" => config.network.as_ref().and_then(|n| n.poll_interval.clone()),
        _ => None,
    }
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "server_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(key, "Value must start with http:// or https://"));
            }
        }
        "endpoint" => {
            if !value.starts_with('/') {
                return Err(invalid(key, "Value must start with '/'"));
            }
        }
        "max_retries" => match value.parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => return Err(invalid(key, "Value must be a positive integer")),
        },
        "retry_delays" => {
            let delays = parse_delay_list(value);
            if delays.is_empty() {
                return Err(invalid(key, "Value must list at least one duration, e.g. 5s,10s,30s"));
            }
            for delay in delays {
                delay
                    .parse::<Duration>()
                    .map_err(|e| invalid(key, e.to_string()))?;
            }
        }
        "upload_timeout" | "rescan_interval" | "network.poll_interval" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "log_level" => {
            let lower = value.to_lowercase();
            if !VALID_LOG_LEVELS.contains(&lower.as_str()) {
                return Err(invalid(
                    key,
                    format!(
                        "Invalid value '{}'. Valid options: {}",
                        value,
                        VALID_LOG_LEVELS.join(", ")
                    ),
                ));
            }
        }
        "network.mode" => {
            value.parse::<NetworkMode>().map_err(|e| invalid(key, e))?;
        }
        _ => {} // auth_token and paths accept any string
    }
    Ok(())
}

/// Mask a credential for display (show first 4 and last 4 chars)
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
