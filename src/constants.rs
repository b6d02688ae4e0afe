// -
// Reconcile directive

/// Default annotation key that carries the `key=url` fetch directive
pub(crate) const DEFAULT_DIRECTIVE_KEY: &str = "confetch.io/fetch";

// -
// Report events

/// Component tag stamped on every report event, also the name prefix
pub(crate) const REPORT_COMPONENT: &str = "confetch-controller";

/// Reason placeholder carried by report events
pub(crate) const REPORT_REASON: &str = "-";

/// Severity tag carried by report events
pub(crate) const REPORT_SEVERITY_ERROR: &str = "error";

/// Kind tag used when a report references the originating record
pub(crate) const RECORD_KIND: &str = "ConfigMap";
