//! PID file management for daemon mode

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// PID file name inside the runtime directory
const PID_FILE_NAME: &str = "voice-sync.pid";

/// PID file for daemon mode
pub struct PidFile {
    path: PathBuf,
    /// Set once this process wrote the file; only then does drop remove it
    acquired: AtomicBool,
}

impl PidFile {
    /// Create a new PID file manager, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let dir = std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());
        Self::with_path(dir.join(PID_FILE_NAME))
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            acquired: AtomicBool::new(false),
        }
    }

    /// Get the PID file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Check if another daemon is already running
    pub fn is_running(&self) -> Option<u32> {
        let mut file = File::open(&self.path).ok()?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;

        let pid: u32 = contents.trim().parse().ok()?;

        // Signal 0 only checks that the process exists
        match kill(Pid::from_raw(pid as i32), None::<Signal>) {
            Ok(_) => Some(pid),
            Err(nix::errno::Errno::ESRCH) => {
                // Stale PID file
                let _ = fs::remove_file(&self.path);
                None
            }
            Err(nix::errno::Errno::EPERM) => Some(pid),
            Err(_) => None,
        }
    }

    /// Acquire the PID file (fails if another daemon is running)
    pub fn acquire(&self) -> Result<(), PidFileError> {
        if let Some(pid) = self.is_running() {
            return Err(PidFileError::AlreadyRunning(pid));
        }

        let mut file = File::create(&self.path).map_err(|e| {
            PidFileError::WriteFailed(format!("Failed to create PID file: {}", e))
        })?;

        write!(file, "{}", process::id()).map_err(|e| {
            PidFileError::WriteFailed(format!("Failed to write PID: {}", e))
        })?;

        self.acquired.store(true, Ordering::Release);
        Ok(())
    }

    /// Release the PID file
    pub fn release(&self) -> Result<(), PidFileError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                PidFileError::RemoveFailed(format!("Failed to remove PID file: {}", e))
            })?;
        }
        Ok(())
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if self.acquired.load(Ordering::Acquire) {
            let _ = self.release();
        }
    }
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file: {0}")]
    WriteFailed(String),

    #[error("Failed to remove PID file: {0}")]
    RemoveFailed(String),
}
