//! Sync metadata persistence

mod json_file;

pub use json_file::JsonMetadataStore;
