//! The event source seam: whatever turns a live change feed into queued work.
//!
//! The controller only requires `run(stop)` semantics: push changed-record
//! snapshots onto the work queue until the stop signal is observed, then
//! return. Items pushed after the queue has shut down are dropped by the
//! queue, which the design tolerates.

mod poll;


#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use tokio::sync::watch;

pub use poll::*;

use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Runs until the stop signal fires. Implementations push record
    /// snapshots onto the work queue they were constructed with.
    async fn run(&self, shutdown: watch::Receiver<()>) -> Result<()>;
}
