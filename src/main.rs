//! voice-sync CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_sync::cli::{
    app::{cli_config, load_merged_config, run_oneshot, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, DaemonAction},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voice_sync::domain::config::AppConfig;
use voice_sync::infrastructure::{logging::init_logging, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    if cli.daemon && cli.command.is_some() {
        presenter.error("--daemon cannot be combined with a subcommand");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    // Handle subcommands that do not touch the sync engine
    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Daemon { action }) => {
            return control_daemon(action, &presenter).await;
        }
        _ => {}
    }

    // Merge config: defaults < file < env < cli
    let store = XdgConfigStore::new();
    let (config, load_error) = load_merged_config(&store, cli_config(&cli)).await;

    if let Err(e) = init_logging(config.log_level_or_default(), cli.verbose) {
        presenter.warn(&format!("Logging disabled: {}", e));
    }
    if let Some(e) = load_error {
        presenter.warn(&format!("Ignoring config file: {}", e));
    }

    if cli.daemon {
        start_daemon(config, &presenter).await
    } else {
        run_oneshot(cli.command, config).await
    }
}

#[cfg(unix)]
async fn control_daemon(action: DaemonAction, presenter: &Presenter) -> ExitCode {
    use voice_sync::cli::daemon_cmd::handle_daemon_command;

    match handle_daemon_command(action, presenter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(not(unix))]
async fn control_daemon(_action: DaemonAction, presenter: &Presenter) -> ExitCode {
    presenter.error("Daemon control is only supported on Unix");
    ExitCode::from(EXIT_ERROR)
}

#[cfg(unix)]
async fn start_daemon(config: AppConfig, _presenter: &Presenter) -> ExitCode {
    voice_sync::cli::daemon_app::run_daemon(config).await
}

#[cfg(not(unix))]
async fn start_daemon(_config: AppConfig, presenter: &Presenter) -> ExitCode {
    presenter.error("Daemon mode is only supported on Unix");
    ExitCode::from(EXIT_ERROR)
}
