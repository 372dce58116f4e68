//! Delay port interface

use async_trait::async_trait;

use crate::domain::duration::Duration;

/// Port for the suspension used by retry backoff
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
