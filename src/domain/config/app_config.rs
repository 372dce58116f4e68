//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::duration::Duration;
use crate::domain::sync::{RetryPolicy, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_RETRIES};

/// Default upload server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default upload endpoint path
pub const DEFAULT_ENDPOINT: &str = "/api/recordings";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How the engine decides it is on the preferred network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkMode {
    /// Probe for an active wireless interface
    #[default]
    Wifi,
    /// Treat any connectivity as preferred
    Always,
    /// Never upload automatically
    Never,
}

impl NetworkMode {
    pub const ALL: [NetworkMode; 3] = [NetworkMode::Wifi, NetworkMode::Always, NetworkMode::Never];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

impl std::str::FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wifi" => Ok(Self::Wifi),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(format!(
                "Invalid network mode \"{}\". Valid modes are: wifi, always, never",
                s
            )),
        }
    }
}

/// Network detection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mode: Option<String>,
    pub poll_interval: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: Option<String>,
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
    pub recordings_dir: Option<String>,
    pub metadata_file: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delays: Option<Vec<String>>,
    pub upload_timeout: Option<String>,
    pub rescan_interval: Option<String>,
    pub log_level: Option<String>,
    pub network: Option<NetworkConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            auth_token: None,
            recordings_dir: None,
            metadata_file: None,
            max_retries: Some(DEFAULT_MAX_RETRIES),
            retry_delays: Some(
                DEFAULT_BACKOFF_SECS
                    .iter()
                    .map(|s| Duration::from_secs(*s).to_string())
                    .collect(),
            ),
            upload_timeout: Some(Duration::default_upload_timeout().to_string()),
            rescan_interval: Some(Duration::default_rescan_interval().to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            network: Some(NetworkConfig {
                mode: Some(NetworkMode::default().as_str().to_string()),
                poll_interval: Some(Duration::default_poll_interval().to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            server_url: other.server_url.or(self.server_url),
            endpoint: other.endpoint.or(self.endpoint),
            auth_token: other.auth_token.or(self.auth_token),
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
            metadata_file: other.metadata_file.or(self.metadata_file),
            max_retries: other.max_retries.or(self.max_retries),
            retry_delays: other.retry_delays.or(self.retry_delays),
            upload_timeout: other.upload_timeout.or(self.upload_timeout),
            rescan_interval: other.rescan_interval.or(self.rescan_interval),
            log_level: other.log_level.or(self.log_level),
            network: Self::merge_network_config(self.network, other.network),
        }
    }

    fn merge_network_config(
        base: Option<NetworkConfig>,
        other: Option<NetworkConfig>,
    ) -> Option<NetworkConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(NetworkConfig {
                mode: o.mode.or(b.mode),
                poll_interval: o.poll_interval.or(b.poll_interval),
            }),
        }
    }

    /// Get server URL, or the local development server
    pub fn server_url_or_default(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Get endpoint path, or `/api/recordings`
    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Get the bearer credential, treating an empty token as absent
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Get recordings directory, or `<data dir>/voice-sync/recordings`
    pub fn recordings_dir_or_default(&self) -> PathBuf {
        self.recordings_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("recordings"))
    }

    /// Get metadata file, or `<data dir>/voice-sync/sync_metadata.json`
    pub fn metadata_file_or_default(&self) -> PathBuf {
        self.metadata_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_data_dir().join("sync_metadata.json"))
    }

    /// Build the retry policy, falling back per field on invalid values
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();

        let max_retries = self
            .max_retries
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_retries());

        let backoff = self
            .retry_delays
            .as_ref()
            .and_then(|delays| {
                delays
                    .iter()
                    .map(|d| d.parse::<Duration>())
                    .collect::<Result<Vec<_>, _>>()
                    .ok()
            })
            .unwrap_or_else(|| defaults.backoff().to_vec());

        RetryPolicy::new(max_retries, backoff)
    }

    /// Get upload timeout, or default if not set/invalid
    pub fn upload_timeout_or_default(&self) -> Duration {
        self.upload_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_upload_timeout)
    }

    /// Get rescan interval, or default if not set/invalid
    pub fn rescan_interval_or_default(&self) -> Duration {
        self.rescan_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_rescan_interval)
    }

    /// Get log level, or "info"
    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Get network mode, or "wifi" if not set/invalid
    pub fn network_mode_or_default(&self) -> NetworkMode {
        self.network
            .as_ref()
            .and_then(|n| n.mode.as_ref())
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    /// Get network probe interval, or default if not set/invalid
    pub fn poll_interval_or_default(&self) -> Duration {
        self.network
            .as_ref()
            .and_then(|n| n.poll_interval.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_poll_interval)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("voice-sync")
}
