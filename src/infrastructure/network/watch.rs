//! Settable network signal backed by a watch channel

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::application::ports::NetworkSignal;

/// Network signal whose value is published by its owner.
///
/// Clones share the same channel.
#[derive(Clone)]
pub struct WatchNetworkSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl WatchNetworkSignal {
    pub fn new(preferred: bool) -> Self {
        let (tx, _rx) = watch::channel(preferred);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a new value; subscribers are notified only when it changes
    pub fn set_preferred(&self, preferred: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == preferred {
                false
            } else {
                *current = preferred;
                true
            }
        });
        if changed {
            debug!(preferred, "network signal changed");
        }
    }
}

impl NetworkSignal for WatchNetworkSignal {
    fn is_preferred(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
