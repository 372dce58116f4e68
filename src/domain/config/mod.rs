//! Configuration domain

mod app_config;

pub use app_config::{
    AppConfig, NetworkConfig, NetworkMode, DEFAULT_ENDPOINT, DEFAULT_LOG_LEVEL,
    DEFAULT_SERVER_URL,
};
