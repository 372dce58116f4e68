//! Daemon app runner

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::config::AppConfig;
use crate::domain::daemon::DaemonStatus;
use crate::infrastructure::create_network_signal;

use super::app::{build_engine, Engine, EXIT_ERROR, EXIT_SUCCESS};
use super::ipc::create_ipc_server;
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{DaemonSignal, DaemonSignalHandler};

/// Run daemon mode
pub async fn run_daemon(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();

    // Acquire PID file
    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let mode = config.network_mode_or_default();
    let (network, _poller) =
        create_network_signal(mode, Some(config.poll_interval_or_default()));
    let engine = Arc::new(build_engine(&config, network).await);

    let report = engine.reconcile().await;
    if report.interrupted > 0 {
        presenter.warn(&format!(
            "{} upload(s) were interrupted and will be retried",
            report.interrupted
        ));
    }

    let _watcher = engine.spawn_network_watcher();

    // Setup signal handler (returns handler + sender for socket server)
    let (mut signals, signal_tx) = match DaemonSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Setup IPC server
    let mut ipc_server = create_ipc_server();
    if let Err(e) = ipc_server.bind() {
        presenter.error(&format!("Failed to bind IPC endpoint: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let ipc_path = ipc_server.path();

    // Shared snapshot answered to `voice-sync daemon status`
    let status = Arc::new(Mutex::new(DaemonStatus {
        syncing: false,
        pending: engine.pending_count().await,
    }));
    spawn_status_tracker(Arc::clone(&engine), Arc::clone(&status));

    let status_for_ipc = Arc::clone(&status);
    tokio::spawn(async move {
        let _ = ipc_server
            .run(
                signal_tx,
                Box::new(move || *status_for_ipc.lock().unwrap_or_else(|e| e.into_inner())),
            )
            .await;
    });

    presenter.daemon_status(&format!("Started, network mode: {}", mode.as_str()));
    presenter.info(&format!(
        "PID: {} | Socket: {} | SIGINT: exit",
        std::process::id(),
        ipc_path
    ));

    spawn_pass(&engine, PassKind::Pending);

    daemon_loop(&engine, &mut signals, &presenter, &config).await;

    let _ = pid_file.release();
    ExitCode::from(EXIT_SUCCESS)
}

#[derive(Debug, Clone, Copy)]
enum PassKind {
    Manual,
    Pending,
}

/// Run a pass in the background so the loop keeps answering signals
fn spawn_pass(engine: &Arc<Engine>, kind: PassKind) {
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        let outcome = match kind {
            PassKind::Manual => engine.trigger_manual_sync().await,
            PassKind::Pending => engine.sync_pending().await,
        };
        debug!(?outcome, "background pass done");
    });
}

/// Keep the daemon status snapshot in step with engine events
fn spawn_status_tracker(engine: Arc<Engine>, status: Arc<Mutex<DaemonStatus>>) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    let snapshot = DaemonStatus {
                        syncing: engine.is_syncing(),
                        pending: engine.pending_count().await,
                    };
                    *status.lock().unwrap_or_else(|e| e.into_inner()) = snapshot;
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn daemon_loop(
    engine: &Arc<Engine>,
    signals: &mut DaemonSignalHandler,
    presenter: &Presenter,
    config: &AppConfig,
) {
    let mut rescan = interval(config.rescan_interval_or_default().as_std());
    rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; startup already scanned
    rescan.tick().await;

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(DaemonSignal::Sync) => {
                    info!("sync requested over control socket");
                    spawn_pass(engine, PassKind::Manual);
                }
                Some(DaemonSignal::Rescan) => {
                    info!("rescan requested over control socket");
                    rescan_recordings(engine, presenter).await;
                }
                Some(DaemonSignal::Shutdown) => {
                    presenter.daemon_status("Shutting down...");
                    return;
                }
                // Channel closed
                None => return,
            },
            _ = rescan.tick() => {
                rescan_recordings(engine, presenter).await;
            }
        }
    }
}

async fn rescan_recordings(engine: &Arc<Engine>, presenter: &Presenter) {
    let found = engine.discover().await;
    if found.is_empty() {
        return;
    }

    presenter.info(&format!("Found {} new recording(s)", found.len()));
    spawn_pass(engine, PassKind::Pending);
}
