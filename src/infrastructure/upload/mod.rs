//! Upload transport adapters

mod http;

pub use http::HttpUploader;
