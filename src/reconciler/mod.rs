//! The per-record reconcile algorithm.
//!
//! Given one record, decide whether action is needed, perform the fetch, and
//! write the result back. On failure, emit a report event and return the
//! failure to the caller.
//! Reconciliation is idempotent: a previously satisfied directive is never
//! re-fetched or overwritten, regardless of whether its url changed since.

mod directive;


#[cfg(test)]
use mockall::automock;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::error;

pub use directive::*;

use crate::metrics;
use crate::ConfigMap;
use crate::ConfigStore;
use crate::HttpFetcher;
use crate::ReconcileConfig;
use crate::ReconcileError;
use crate::ReportEvent;

/// Result of a reconcile attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to do: no directive, or the result key is already populated
    Unchanged,
    /// The fetched value was written back and persisted
    Updated,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Reconcile: Send + Sync + 'static {
    async fn reconcile(
        &self,
        record: &ConfigMap,
    ) -> std::result::Result<ReconcileOutcome, ReconcileError>;
}

/// Reconciler over a store and a fetcher.
///
/// Borrows the store per call and keeps no state across calls. Each call
/// operates on an owned clone of the input record: failures never leave
/// partial mutations visible to the caller, and the store is only written on
/// the success path.
pub struct Reconciler<S, F>
where
    S: ConfigStore,
    F: HttpFetcher,
{
    store: Arc<S>,
    fetcher: Arc<F>,
    directive_key: String,
}

impl<S, F> Reconciler<S, F>
where
    S: ConfigStore,
    F: HttpFetcher,
{
    pub fn new(store: Arc<S>, fetcher: Arc<F>, config: &ReconcileConfig) -> Self {
        Self {
            store,
            fetcher,
            directive_key: config.directive_key.clone(),
        }
    }

    /// Submits the report event for a failed attempt, then hands the failure
    /// back to the caller. A failure to create the report itself is logged
    /// and swallowed, never escalated.
    async fn report_failure(
        &self,
        record: &ConfigMap,
        err: ReconcileError,
    ) -> std::result::Result<ReconcileOutcome, ReconcileError> {
        let report = ReportEvent::for_failure(record, err.to_string());
        metrics::REPORT_EVENTS
            .with_label_values(&[record.namespace.as_str()])
            .inc();
        if let Err(create_err) = self.store.create_event(&record.namespace, report).await {
            error!("error creating report event: {}", create_err);
        }
        Err(err)
    }
}

#[async_trait]
impl<S, F> Reconcile for Reconciler<S, F>
where
    S: ConfigStore,
    F: HttpFetcher,
{
    async fn reconcile(
        &self,
        record: &ConfigMap,
    ) -> std::result::Result<ReconcileOutcome, ReconcileError> {
        let mut record = record.clone();

        let raw = match record.annotations.get(&self.directive_key) {
            Some(raw) => raw.clone(),
            None => {
                debug!("no directive annotation on {}", record.key());
                return Ok(ReconcileOutcome::Unchanged);
            }
        };

        let directive = match Directive::parse(&raw) {
            Ok(directive) => directive,
            Err(e) => return self.report_failure(&record, e).await,
        };

        if record.data.contains_key(&directive.result_key) {
            debug!(
                "data field {} already set on {}",
                directive.result_key,
                record.key()
            );
            return Ok(ReconcileOutcome::Unchanged);
        }

        let body = match self.fetcher.get(&directive.url).await {
            Ok(body) => body,
            Err(e) => {
                let err = ReconcileError::from_fetch(directive.url.as_str(), e);
                return self.report_failure(&record, err).await;
            }
        };

        record.data.insert(directive.result_key, body);

        if let Err(e) = self.store.update(&record).await {
            let err = ReconcileError::UpdateFailed {
                detail: e.to_string(),
            };
            return self.report_failure(&record, err).await;
        }

        metrics::RECORDS_UPDATED
            .with_label_values(&[record.namespace.as_str()])
            .inc();
        debug!("successfully updated {}", record.key());

        Ok(ReconcileOutcome::Updated)
    }
}
