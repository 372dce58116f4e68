//! Daemon domain

mod status;

pub use status::{DaemonStatus, DaemonStatusParseError};
