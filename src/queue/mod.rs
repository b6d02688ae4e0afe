//! The deduplicating, shutdown-capable buffer between the event source and
//! the worker loop.
//!
//! Queue identity is the record's [`ResourceRef`]; the queued value is the
//! record snapshot taken at enqueue time. `get` blocks until an item is
//! available or the queue has shut down and drained.

mod dedup;


#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

pub use dedup::*;

use crate::ConfigMap;
use crate::ResourceRef;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkQueue: Send + Sync + 'static {
    /// Enqueues a record snapshot. Adds after shutdown are dropped.
    fn add(&self, item: ConfigMap);

    /// Blocking dequeue. Returns `None` once the queue has been shut down and
    /// every pending item has been handed out.
    async fn get(&self) -> Option<ConfigMap>;

    /// Releases the in-flight marker for `key`. Must be called exactly once
    /// per item returned by `get`, success or failure.
    fn done(&self, key: &ResourceRef);

    /// Stops accepting new work and wakes blocked `get` callers so the
    /// pending backlog can drain. Idempotent.
    fn shut_down(&self);

    /// Number of pending (not in-flight) items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
