//! Internal resource ↔ external representation conversion
//!
//! Every function here is pure. External → internal conversion only copies
//! the fields a caller may set (name, labels, spec); status and server
//! metadata always come from the stored object.

pub mod backup;
pub mod policy_binding;
pub mod restore;
pub mod rule_group;
pub mod schedule;
pub mod storage_location;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kube::api::ObjectMeta;

fn creation_time(meta: &ObjectMeta) -> Option<DateTime<Utc>> {
    meta.creation_timestamp.as_ref().map(|t| t.0)
}

/// Server-assigned identifier: the uid when the store assigned one
fn object_id(meta: &ObjectMeta) -> String {
    meta.uid
        .clone()
        .or_else(|| meta.name.clone())
        .unwrap_or_default()
}

fn labels_of(meta: &ObjectMeta) -> BTreeMap<String, String> {
    meta.labels.clone().unwrap_or_default()
}

fn metadata(name: &str, labels: BTreeMap<String, String>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        labels: (!labels.is_empty()).then_some(labels),
        ..Default::default()
    }
}
