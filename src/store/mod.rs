//! Capability interface over the record store.
//!
//! The controller core never talks to a concrete backend: it only requires a
//! collaborator with get/list/update/create_event semantics. The store client
//! must tolerate concurrent calls from the event source task and the worker
//! loop without extra locking in the core.

mod memory;


#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

pub use memory::*;

use crate::ConfigMap;
use crate::ReportEvent;
use crate::StoreError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Fetches a single record by identity.
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<ConfigMap, StoreError>;

    /// Point-in-time snapshot of every record visible to this controller.
    async fn list(&self) -> std::result::Result<Vec<ConfigMap>, StoreError>;

    /// Persists an updated record.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when the record vanished between the
    /// snapshot and the write (concurrent deletion).
    async fn update(
        &self,
        record: &ConfigMap,
    ) -> std::result::Result<(), StoreError>;

    /// Appends a report event in the given namespace. Events are write-once.
    async fn create_event(
        &self,
        namespace: &str,
        event: ReportEvent,
    ) -> std::result::Result<(), StoreError>;
}
