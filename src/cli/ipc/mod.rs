//! IPC (Inter-Process Communication) module for daemon control
//!
//! The daemon listens on a Unix domain socket. The protocol is one command
//! line per connection (`sync`, `status`, `rescan`) answered by one line.

mod unix_socket;

pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use std::io;
use tokio::sync::mpsc;

use super::signals::DaemonSignal;
use crate::domain::daemon::DaemonStatus;

/// State function type for IPC servers
pub type StateFn = Box<dyn Fn() -> DaemonStatus + Send + Sync>;

/// Trait for IPC servers that listen for daemon commands
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept and handle connections
    ///
    /// Commands are forwarded to the provided channel. The state_fn is
    /// called to answer status queries.
    async fn run(&self, tx: mpsc::Sender<DaemonSignal>, state_fn: StateFn) -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Trait for IPC clients that send commands to the daemon
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    /// Check if daemon appears to be running (endpoint exists)
    fn is_daemon_running(&self) -> bool;

    /// Send a command and receive response
    async fn send_command(&self, cmd: &str) -> io::Result<String>;
}

/// Create the IPC server at the default socket path
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(UnixSocketServer::new(SocketPath::new()))
}

/// Create the IPC client for the default socket path
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(UnixSocketClient::new(SocketPath::new()))
}
