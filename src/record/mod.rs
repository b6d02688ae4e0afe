//! The record data model watched and conditionally updated by the controller.
//!
//! A [`ConfigMap`] is a namespaced, mutable bag of `annotations` and `data`
//! string pairs. The controller never removes or overwrites an existing
//! `data` key; it only ever adds the key named by the fetch directive.


use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::RECORD_KIND;
use crate::constants::REPORT_COMPONENT;
use crate::constants::REPORT_REASON;
use crate::constants::REPORT_SEVERITY_ERROR;
use crate::utils::time::now_unix_secs;

/// Identity of a record: namespace is a logical partition, name is unique
/// within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// A reference dequeued from the work queue is only processable when both
    /// parts are present.
    pub fn is_well_formed(&self) -> bool {
        !self.namespace.is_empty() && !self.name.is_empty()
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The mutable config record.
///
/// `uid` is opaque and stable for the record's lifetime; it is only used to
/// cross-reference the record from report events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMap {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl ConfigMap {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> ResourceRef {
        ResourceRef::new(self.namespace.clone(), self.name.clone())
    }
}

/// Reference from a report event back to the originating record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: String,
}

/// Audit record emitted to the store when a reconcile attempt fails.
///
/// Created once per failed attempt; never updated or deleted by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEvent {
    /// Synthetic unique name, component prefix + random suffix
    pub name: String,
    /// Human-readable failure message, identical to the returned error text
    pub message: String,
    /// Fixed reason placeholder
    pub reason: String,
    /// Fixed severity tag
    pub severity: String,
    /// Creation time, unix seconds
    pub timestamp_secs: u64,
    /// The record this report is about
    pub involved: ObjectRef,
    /// Fixed source/component tag
    pub component: String,
}

impl ReportEvent {
    /// Builds the failure report for one reconcile attempt on `record`.
    pub fn for_failure(record: &ConfigMap, message: impl Into<String>) -> Self {
        Self {
            name: format!("{}-{}", REPORT_COMPONENT, nanoid::nanoid!()),
            message: message.into(),
            reason: REPORT_REASON.to_string(),
            severity: REPORT_SEVERITY_ERROR.to_string(),
            timestamp_secs: now_unix_secs(),
            involved: ObjectRef {
                kind: RECORD_KIND.to_string(),
                namespace: record.namespace.clone(),
                name: record.name.clone(),
                uid: record.uid.clone(),
            },
            component: REPORT_COMPONENT.to_string(),
        }
    }
}
