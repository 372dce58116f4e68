//! Network signal adapters
//!
//! The engine only reads a boolean "on preferred network" signal. How that
//! boolean is produced depends on the configured mode.

mod sysfs;
mod watch;

pub use sysfs::{probe_wifi, spawn_wifi_poller, SYSFS_NET};
pub use watch::WatchNetworkSignal;

use tokio::task::JoinHandle;

use crate::domain::config::NetworkMode;
use crate::domain::duration::Duration;

/// Build the signal for a mode.
///
/// In `wifi` mode the signal starts from a probe of the current state and,
/// when `poll` is set, a background task keeps it up to date.
pub fn create_network_signal(
    mode: NetworkMode,
    poll: Option<Duration>,
) -> (WatchNetworkSignal, Option<JoinHandle<()>>) {
    match mode {
        NetworkMode::Always => (WatchNetworkSignal::new(true), None),
        NetworkMode::Never => (WatchNetworkSignal::new(false), None),
        NetworkMode::Wifi => {
            let signal = WatchNetworkSignal::new(probe_wifi(SYSFS_NET));
            let poller = poll.map(|interval| spawn_wifi_poller(signal.clone(), SYSFS_NET, interval));
            (signal, poller)
        }
    }
}
