//! Linux sysfs WiFi probe
//!
//! An interface counts as WiFi when its sysfs directory has a `wireless`
//! entry, and as connected when its `operstate` reads `up`.

use std::fs;
use std::path::Path;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::WatchNetworkSignal;
use crate::domain::duration::Duration;

/// Where the kernel lists network interfaces
pub const SYSFS_NET: &str = "/sys/class/net";

/// Whether any wireless interface under `root` is up.
///
/// Unreadable or missing directories count as "not on WiFi".
pub fn probe_wifi(root: impl AsRef<Path>) -> bool {
    let Ok(entries) = fs::read_dir(root.as_ref()) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let iface = entry.path();
        let wireless = iface.join("wireless").exists();
        let up = fs::read_to_string(iface.join("operstate"))
            .map(|s| s.trim() == "up")
            .unwrap_or(false);
        wireless && up
    })
}

/// Re-probe every `interval` and publish changes to `signal`
pub fn spawn_wifi_poller(
    signal: WatchNetworkSignal,
    root: impl AsRef<Path>,
    interval: Duration,
) -> JoinHandle<()> {
    let root = root.as_ref().to_path_buf();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.as_std());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last = None;

        loop {
            ticker.tick().await;
            let probe_root = root.clone();
            let on_wifi = tokio::task::spawn_blocking(move || probe_wifi(probe_root))
                .await
                .unwrap_or(false);

            if last != Some(on_wifi) {
                if last.is_some() {
                    info!(on_wifi, "wifi state changed");
                } else {
                    debug!(on_wifi, "initial wifi probe");
                }
                last = Some(on_wifi);
            }
            signal.set_preferred(on_wifi);
        }
    })
}
