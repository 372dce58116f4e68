//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces:
//! the JSON metadata file, the recordings directory, the HTTP
//! upload transport, network detection and timers.

pub mod clock;
pub mod config;
pub mod logging;
pub mod metadata;
pub mod network;
pub mod payload;
pub mod upload;

// Re-export adapters
pub use clock::TokioDelay;
pub use config::XdgConfigStore;
pub use metadata::JsonMetadataStore;
pub use network::{create_network_signal, WatchNetworkSignal};
pub use payload::FsPayloadStore;
pub use upload::HttpUploader;
