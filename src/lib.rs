//! voice-sync - offline-first upload of voice recordings
//!
//! Recordings land in a local directory and are tracked in a JSON metadata
//! file. A sync engine uploads them to a server as multipart requests when
//! the device is on the preferred network, retries failures with a bounded
//! backoff, and deletes the local file once the server accepts it.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Sync records, statuses, retry policy, config, and errors
//! - **Application**: The sync engine and its port interfaces (traits)
//! - **Infrastructure**: Adapters (HTTP uploader, JSON metadata file, recordings directory, network probe)
//! - **CLI**: Command-line interface, daemon mode, and control socket

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
