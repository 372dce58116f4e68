//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod delay;
pub mod metadata;
pub mod network;
pub mod payload;
pub mod uploader;

// Re-export common types
pub use config::ConfigStore;
pub use delay::Delay;
pub use metadata::{MetadataError, MetadataStore};
pub use network::NetworkSignal;
pub use payload::{PayloadError, PayloadStore};
pub use uploader::{UploadRequest, Uploader};
