//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! daemon control, and the main application runners.

pub mod app;
pub mod args;
pub mod config_cmd;
#[cfg(unix)]
pub mod daemon_app;
#[cfg(unix)]
pub mod daemon_cmd;
#[cfg(unix)]
pub mod ipc;
#[cfg(unix)]
pub mod pid_file;
pub mod presenter;
#[cfg(unix)]
pub mod signals;

// Re-export commonly used types
pub use app::{load_merged_config, run_oneshot, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, DaemonAction};
#[cfg(unix)]
pub use daemon_app::run_daemon;
#[cfg(unix)]
pub use daemon_cmd::handle_daemon_command;
pub use presenter::Presenter;
