//! Application layer - Use cases and port interfaces
//!
//! Contains the sync engine and the trait definitions
//! for external system interactions.

pub mod ports;
pub mod sync_engine;

// Re-export use cases
pub use sync_engine::{
    PassOutcome, PassReport, ReconcileReport, SkipReason, SyncEngine, SyncEngineConfig,
    SyncEvent, INTERRUPTED, WIFI_REQUIRED,
};
