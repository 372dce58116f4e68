//! Local payload storage

mod fs;

pub use fs::FsPayloadStore;
