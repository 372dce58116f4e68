//! Main app runner for one-shot commands

use std::env;
use std::process::ExitCode;

use crate::application::ports::ConfigStore;
use crate::application::{PassOutcome, SyncEngine, SyncEngineConfig, SyncEvent};
use crate::domain::artifact::ArtifactId;
use crate::domain::config::{AppConfig, NetworkConfig, NetworkMode};
use crate::domain::error::ConfigError;
use crate::domain::sync::SyncStatus;
use crate::infrastructure::{
    create_network_signal, FsPayloadStore, HttpUploader, JsonMetadataStore, TokioDelay,
    WatchNetworkSignal,
};

use super::args::{Cli, Commands};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the upload credential
pub const ENV_AUTH_TOKEN: &str = "VOICE_SYNC_AUTH_TOKEN";

/// Environment variable overriding the server URL
pub const ENV_SERVER_URL: &str = "VOICE_SYNC_SERVER_URL";

/// Engine wired to the production adapters
pub type Engine =
    SyncEngine<HttpUploader, JsonMetadataStore, FsPayloadStore, WatchNetworkSignal, TokioDelay>;

/// Build the CLI layer of the config from parsed arguments
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        recordings_dir: cli.recordings_dir.clone(),
        server_url: cli.server_url.clone(),
        network: cli.network.map(|mode| NetworkConfig {
            mode: Some(NetworkMode::from(mode).as_str().to_string()),
            poll_interval: None,
        }),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI.
///
/// An unreadable config file is skipped; its error is returned alongside
/// so the caller can report it once logging is up.
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
) -> (AppConfig, Option<ConfigError>) {
    let (file_config, file_error) = match store.load().await {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::empty(), Some(e)),
    };

    let env_config = AppConfig {
        auth_token: env::var(ENV_AUTH_TOKEN).ok().filter(|s| !s.is_empty()),
        server_url: env::var(ENV_SERVER_URL).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    let config = AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config);

    (config, file_error)
}

/// Wire the engine to the production adapters
pub async fn build_engine(config: &AppConfig, network: WatchNetworkSignal) -> Engine {
    let uploader = HttpUploader::new(
        config.server_url_or_default(),
        config.endpoint_or_default(),
        config.upload_timeout_or_default(),
    );
    let metadata = JsonMetadataStore::open(config.metadata_file_or_default()).await;
    let payloads = FsPayloadStore::new(config.recordings_dir_or_default());

    SyncEngine::new(
        uploader,
        metadata,
        payloads,
        network,
        TokioDelay,
        SyncEngineConfig {
            policy: config.retry_policy(),
            credential: config.auth_token().map(str::to_string),
        },
    )
}

/// Run a one-shot command (no subcommand means `sync`)
pub async fn run_oneshot(command: Option<Commands>, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    // The metadata file has a single writer; leave it to a running daemon
    if let Some(pid) = running_daemon() {
        if !matches!(command, Some(Commands::Status { .. })) {
            presenter.error(&format!(
                "A daemon is running (PID: {}). Use: voice-sync daemon sync",
                pid
            ));
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let (network, _) = create_network_signal(config.network_mode_or_default(), None);
    let engine = build_engine(&config, network).await;

    let result = match command {
        None | Some(Commands::Sync { id: None }) => run_sync(&engine, &mut presenter).await,
        Some(Commands::Sync { id: Some(id) }) => {
            run_sync_one(&engine, &mut presenter, &id).await
        }
        Some(Commands::Status { id }) => run_status(&engine, &presenter, id.as_deref()).await,
        Some(Commands::Register { id }) => run_register(&engine, &mut presenter, &id).await,
        Some(Commands::Retry { id }) => run_retry(&engine, &mut presenter, &id).await,
        Some(Commands::Delete { id }) => run_delete(&engine, &presenter, &id).await,
        Some(Commands::Config { .. }) | Some(Commands::Daemon { .. }) => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CommandError::Usage(message)) => {
            presenter.error(&message);
            ExitCode::from(EXIT_USAGE_ERROR)
        }
        Err(CommandError::Failed(message)) => {
            presenter.error(&message);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(unix)]
fn running_daemon() -> Option<u32> {
    super::pid_file::PidFile::new().is_running()
}

#[cfg(not(unix))]
fn running_daemon() -> Option<u32> {
    None
}

/// Failure of a one-shot command, mapped to an exit code
enum CommandError {
    Usage(String),
    Failed(String),
}

fn parse_id(id: &str) -> Result<ArtifactId, CommandError> {
    ArtifactId::new(id).map_err(|e| CommandError::Usage(e.to_string()))
}

async fn run_sync(engine: &Engine, presenter: &mut Presenter) -> Result<(), CommandError> {
    let report = engine.reconcile().await;
    if report.discovered > 0 {
        presenter.info(&format!("Found {} new recording(s)", report.discovered));
    }
    if report.interrupted > 0 {
        presenter.warn(&format!(
            "{} upload(s) were interrupted and will be retried",
            report.interrupted
        ));
    }

    let outcome = with_spinner(engine, presenter, engine.trigger_manual_sync()).await;
    finish_pass(engine, presenter, &outcome)
}

async fn run_sync_one(
    engine: &Engine,
    presenter: &mut Presenter,
    id: &str,
) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    let Some(record) = engine.record(&id).await else {
        return Err(CommandError::Failed(format!(
            "Unknown recording: {}. Register it with: voice-sync register {}",
            id, id
        )));
    };

    if engine.policy().is_exhausted(&record) {
        presenter.warn(&format!(
            "{} reached the retry limit. Reset it with: voice-sync retry {}",
            id, id
        ));
        return Ok(());
    }

    let outcome = with_spinner(engine, presenter, engine.sync_artifact(&id)).await;
    finish_pass(engine, presenter, &outcome)
}

async fn run_status(
    engine: &Engine,
    presenter: &Presenter,
    id: Option<&str>,
) -> Result<(), CommandError> {
    let max_retries = engine.policy().max_retries();

    if let Some(id) = id {
        let id = parse_id(id)?;
        match engine.record(&id).await {
            Some(record) => presenter.records(&[record], max_retries),
            None => presenter.key_value(id.as_str(), SyncStatus::NotSynced.display_text()),
        }
        return Ok(());
    }

    presenter.records(&engine.records().await, max_retries);
    presenter.key_value("pending", &engine.pending_count().await.to_string());
    presenter.key_value("local storage", &engine.storage_used().await.to_string());
    Ok(())
}

async fn run_register(
    engine: &Engine,
    presenter: &mut Presenter,
    id: &str,
) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    require_payload(engine, &id).await?;

    let outcome = with_spinner(engine, presenter, engine.on_artifact_created(id)).await;
    finish_pass(engine, presenter, &outcome)
}

async fn run_retry(
    engine: &Engine,
    presenter: &mut Presenter,
    id: &str,
) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    require_payload(engine, &id).await?;

    engine.reregister(id.clone()).await;
    presenter.info(&format!("Retry count reset for {}", id));

    let outcome = with_spinner(engine, presenter, engine.sync_artifact(&id)).await;
    finish_pass(engine, presenter, &outcome)
}

async fn run_delete(engine: &Engine, presenter: &Presenter, id: &str) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    engine
        .delete_artifact(&id)
        .await
        .map_err(|e| CommandError::Failed(e.to_string()))?;
    presenter.success(&format!("Deleted {}", id));
    Ok(())
}

async fn require_payload(engine: &Engine, id: &ArtifactId) -> Result<(), CommandError> {
    if engine.has_payload(id).await {
        Ok(())
    } else {
        Err(CommandError::Failed(format!("Recording not found: {}", id)))
    }
}

/// Run a pass while a spinner follows the engine's events.
///
/// The spinner is left running for `finish_pass` to settle.
async fn with_spinner<F>(engine: &Engine, presenter: &mut Presenter, pass: F) -> PassOutcome
where
    F: std::future::Future<Output = PassOutcome>,
{
    presenter.start_spinner("Syncing...");
    let mut events = engine.subscribe();
    let spinner = presenter.spinner_handle();

    let follower = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let (Some(spinner), SyncEvent::StatusChanged { artifact_id, status }) =
                (&spinner, &event)
            {
                if *status == SyncStatus::Syncing {
                    spinner.set_message(format!("Uploading {}...", artifact_id));
                }
            }
        }
    });

    let outcome = pass.await;
    follower.abort();
    outcome
}

fn finish_pass(
    engine: &Engine,
    presenter: &mut Presenter,
    outcome: &PassOutcome,
) -> Result<(), CommandError> {
    let summary = Presenter::format_pass(outcome);

    match outcome {
        PassOutcome::Skipped(_) => {
            presenter.stop_spinner();
            presenter.warn(&summary);
            if let Some(error) = engine.last_sync_error() {
                presenter.warn(&error);
            }
            Ok(())
        }
        PassOutcome::Completed(report) if report.failed > 0 => {
            presenter.spinner_fail(&summary);
            Err(CommandError::Failed(
                engine
                    .last_sync_error()
                    .unwrap_or_else(|| "Upload failed".to_string()),
            ))
        }
        PassOutcome::Completed(_) => {
            presenter.spinner_success(&summary);
            Ok(())
        }
    }
}
