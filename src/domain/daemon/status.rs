//! Daemon status reported over the control channel

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error when a status line from the daemon cannot be read
#[derive(Debug, Clone, Error)]
#[error("Malformed daemon status: \"{0}\"")]
pub struct DaemonStatusParseError(pub String);

/// Snapshot of a running daemon.
///
/// Wire form is a single line: `idle pending=3` or `syncing pending=0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaemonStatus {
    pub syncing: bool,
    pub pending: usize,
}

impl DaemonStatus {
    pub const fn state_str(&self) -> &'static str {
        if self.syncing {
            "syncing"
        } else {
            "idle"
        }
    }
}

impl fmt::Display for DaemonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pending={}", self.state_str(), self.pending)
    }
}

impl FromStr for DaemonStatus {
    type Err = DaemonStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DaemonStatusParseError(s.to_string());
        let mut parts = s.split_whitespace();

        let syncing = match parts.next() {
            Some("syncing") => true,
            Some("idle") => false,
            _ => return Err(err()),
        };

        let pending = parts
            .next()
            .and_then(|p| p.strip_prefix("pending="))
            .and_then(|n| n.parse().ok())
            .ok_or_else(err)?;

        if parts.next().is_some() {
            return Err(err());
        }

        Ok(Self { syncing, pending })
    }
}
