//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::config::NetworkMode;

/// voice-sync - upload recordings when on WiFi
#[derive(Parser, Debug)]
#[command(name = "voice-sync")]
#[command(version)]
#[command(about = "Offline-first recording uploader: syncs audio files when on the preferred network")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding the recordings (.wav, .m4a)
    #[arg(long, value_name = "DIR", global = true)]
    pub recordings_dir: Option<String>,

    /// Upload server base URL
    #[arg(long, value_name = "URL", global = true)]
    pub server_url: Option<String>,

    /// When to treat the network as preferred
    #[arg(long, value_name = "MODE", global = true)]
    pub network: Option<NetworkArg>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Run as daemon (control via: voice-sync daemon sync/status/rescan)
    #[arg(long)]
    pub daemon: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show sync status of all recordings, or of one
    Status {
        /// Recording file name
        id: Option<String>,
    },
    /// Upload pending recordings now, or only one
    Sync {
        /// Recording file name
        id: Option<String>,
    },
    /// Register an existing recording and try to upload it
    Register {
        /// Recording file name
        id: String,
    },
    /// Reset a recording's retry count and try again
    Retry {
        /// Recording file name
        id: String,
    },
    /// Delete a recording and its sync record
    Delete {
        /// Recording file name
        id: String,
    },
}

/// Daemon control actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum DaemonAction {
    /// Start a sync pass now
    Sync,
    /// Show daemon status
    Status,
    /// Rescan the recordings directory for new files
    Rescan,
}

impl DaemonAction {
    /// Command word sent over the control socket
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Status => "status",
            Self::Rescan => "rescan",
        }
    }
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Network mode argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum NetworkArg {
    Wifi,
    Always,
    Never,
}

impl From<NetworkArg> for NetworkMode {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Wifi => NetworkMode::Wifi,
            NetworkArg::Always => NetworkMode::Always,
            NetworkArg::Never => NetworkMode::Never,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server_url",
    "endpoint",
    "auth_token",
    "recordings_dir",
    "metadata_file",
    "max_retries",
    "retry_delays",
    "upload_timeout",
    "rescan_interval",
    "log_level",
    "network.mode",
    "network.poll_interval",
];

/// Valid log levels
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["voice-sync"]);
        assert!(cli.recordings_dir.is_none());
        assert!(cli.server_url.is_none());
        assert!(cli.network.is_none());
        assert!(!cli.verbose);
        assert!(!cli.daemon);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "voice-sync",
            "status",
            "--recordings-dir",
            "/tmp/rec",
            "--network",
            "always",
            "-v",
        ]);
        assert_eq!(cli.recordings_dir.as_deref(), Some("/tmp/rec"));
        assert_eq!(cli.network, Some(NetworkArg::Always));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Status { id: None })));
    }

    #[test]
    fn cli_parses_daemon() {
        let cli = Cli::parse_from(["voice-sync", "--daemon"]);
        assert!(cli.daemon);
    }

    #[test]
    fn cli_parses_sync_with_id() {
        let cli = Cli::parse_from(["voice-sync", "sync", "a.m4a"]);
        if let Some(Commands::Sync { id }) = cli.command {
            assert_eq!(id.as_deref(), Some("a.m4a"));
        } else {
            panic!("Expected Sync command");
        }
    }

    #[test]
    fn cli_requires_id_for_retry() {
        assert!(Cli::try_parse_from(["voice-sync", "retry"]).is_err());
    }

    #[test]
    fn cli_parses_daemon_actions() {
        let cli = Cli::parse_from(["voice-sync", "daemon", "rescan"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Daemon {
                action: DaemonAction::Rescan
            })
        ));
        assert_eq!(DaemonAction::Status.as_str(), "status");
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-sync", "config", "set", "network.mode", "always"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "network.mode");
            assert_eq!(value, "always");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn network_arg_converts_to_mode() {
        assert_eq!(NetworkMode::from(NetworkArg::Wifi), NetworkMode::Wifi);
        assert_eq!(NetworkMode::from(NetworkArg::Never), NetworkMode::Never);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("server_url"));
        assert!(is_valid_config_key("network.poll_interval"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
