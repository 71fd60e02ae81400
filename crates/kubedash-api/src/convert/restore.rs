//! ClusterRestore ↔ Velero Restore

use kubedash_common::crd::{LabelSelector, Restore, RestorePhase, RestoreSpec};

use super::{creation_time, labels_of, metadata, object_id};
use crate::apiv2::{
    ClusterRestore, ClusterRestoreSpec, ClusterRestoreStatus, CreateClusterRestoreBody,
};

fn spec_to_external(spec: &RestoreSpec) -> ClusterRestoreSpec {
    ClusterRestoreSpec {
        backup_name: spec.backup_name.clone(),
        schedule_name: spec.schedule_name.clone(),
        included_namespaces: spec.included_namespaces.clone(),
        excluded_namespaces: spec.excluded_namespaces.clone(),
        included_resources: spec.included_resources.clone(),
        excluded_resources: spec.excluded_resources.clone(),
        namespace_mapping: spec.namespace_mapping.clone(),
        label_selector: spec
            .label_selector
            .as_ref()
            .map(|s| s.match_labels.clone())
            .unwrap_or_default(),
        restore_pvs: spec.restore_pvs,
        existing_resource_policy: spec.existing_resource_policy.clone(),
    }
}

fn spec_to_internal(spec: ClusterRestoreSpec) -> RestoreSpec {
    RestoreSpec {
        backup_name: spec.backup_name,
        schedule_name: spec.schedule_name,
        included_namespaces: spec.included_namespaces,
        excluded_namespaces: spec.excluded_namespaces,
        included_resources: spec.included_resources,
        excluded_resources: spec.excluded_resources,
        namespace_mapping: spec.namespace_mapping,
        label_selector: (!spec.label_selector.is_empty()).then(|| LabelSelector {
            match_labels: spec.label_selector,
        }),
        restore_pvs: spec.restore_pvs,
        existing_resource_policy: spec.existing_resource_policy,
    }
}

/// External representation of a stored restore
pub fn to_external(restore: &Restore) -> ClusterRestore {
    let status = restore.status.clone().unwrap_or_default();
    let progress = status.progress.unwrap_or_default();

    ClusterRestore {
        name: restore.metadata.name.clone().unwrap_or_default(),
        id: object_id(&restore.metadata),
        labels: labels_of(&restore.metadata),
        creation_timestamp: creation_time(&restore.metadata),
        spec: spec_to_external(&restore.spec),
        status: ClusterRestoreStatus {
            phase: status.phase.unwrap_or(RestorePhase::New).to_string(),
            start_timestamp: status.start_timestamp,
            completion_timestamp: status.completion_timestamp,
            errors: status.errors,
            warnings: status.warnings,
            failure_reason: status.failure_reason,
            items_restored: progress.items_restored,
            total_items: progress.total_items,
            validation_errors: status.validation_errors,
        },
    }
}

/// Restore to create from a request body
pub fn to_internal(body: CreateClusterRestoreBody) -> Restore {
    Restore {
        metadata: metadata(&body.name, body.labels),
        spec: spec_to_internal(body.spec),
        status: None,
    }
}
