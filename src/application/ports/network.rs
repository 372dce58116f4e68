//! Network signal port interface

use tokio::sync::watch;

/// Port for the "on preferred network" signal.
///
/// The signal is owned by an external collaborator; the sync engine only
/// reads the current value and listens for changes.
pub trait NetworkSignal: Send + Sync {
    /// Whether the device is currently on the preferred (unmetered) network
    fn is_preferred(&self) -> bool;

    /// Subscribe to changes of the preferred flag
    fn subscribe(&self) -> watch::Receiver<bool>;
}
