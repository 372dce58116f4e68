//! Tokio timer delay adapter

use async_trait::async_trait;

use crate::application::ports::Delay;
use crate::domain::duration::Duration;

/// Real-time backoff using the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration.as_std()).await;
    }
}
