// # Sleeper Trait
//
// The reconciler's repeat interval and the address source's retry delay
// both suspend through this trait instead of calling the timer directly.
// Tests inject a recording or never-completing sleeper to drive
// iterations deterministically without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// Injected sleep capability
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
