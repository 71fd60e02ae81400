//! ClusterBackup ↔ Velero Backup

use kubedash_common::crd::{Backup, BackupPhase, BackupSpec, LabelSelector};

use super::{creation_time, labels_of, metadata, object_id};
use crate::apiv2::{ClusterBackup, ClusterBackupSpec, ClusterBackupStatus, CreateClusterBackupBody};

/// External form of a Velero backup spec
pub fn spec_to_external(spec: &BackupSpec) -> ClusterBackupSpec {
    ClusterBackupSpec {
        included_namespaces: spec.included_namespaces.clone(),
        excluded_namespaces: spec.excluded_namespaces.clone(),
        included_resources: spec.included_resources.clone(),
        excluded_resources: spec.excluded_resources.clone(),
        include_cluster_resources: spec.include_cluster_resources,
        label_selector: spec
            .label_selector
            .as_ref()
            .map(|s| s.match_labels.clone())
            .unwrap_or_default(),
        snapshot_volumes: spec.snapshot_volumes,
        ttl: spec.ttl.clone(),
        storage_location: spec.storage_location.clone(),
        volume_snapshot_locations: spec.volume_snapshot_locations.clone(),
        default_volumes_to_fs_backup: spec.default_volumes_to_fs_backup,
    }
}

/// Velero backup spec for an external spec; also used for schedule templates
pub fn spec_to_internal(spec: ClusterBackupSpec) -> BackupSpec {
    BackupSpec {
        included_namespaces: spec.included_namespaces,
        excluded_namespaces: spec.excluded_namespaces,
        included_resources: spec.included_resources,
        excluded_resources: spec.excluded_resources,
        include_cluster_resources: spec.include_cluster_resources,
        label_selector: (!spec.label_selector.is_empty()).then(|| LabelSelector {
            match_labels: spec.label_selector,
        }),
        snapshot_volumes: spec.snapshot_volumes,
        ttl: spec.ttl,
        storage_location: spec.storage_location,
        volume_snapshot_locations: spec.volume_snapshot_locations,
        default_volumes_to_fs_backup: spec.default_volumes_to_fs_backup,
    }
}

/// External representation of a stored backup
pub fn to_external(backup: &Backup) -> ClusterBackup {
    let status = backup.status.clone().unwrap_or_default();
    let progress = status.progress.unwrap_or_default();

    ClusterBackup {
        name: backup.metadata.name.clone().unwrap_or_default(),
        id: object_id(&backup.metadata),
        labels: labels_of(&backup.metadata),
        creation_timestamp: creation_time(&backup.metadata),
        spec: spec_to_external(&backup.spec),
        status: ClusterBackupStatus {
            phase: status.phase.unwrap_or(BackupPhase::New).to_string(),
            start_timestamp: status.start_timestamp,
            completion_timestamp: status.completion_timestamp,
            expiration: status.expiration,
            errors: status.errors,
            warnings: status.warnings,
            items_backed_up: progress.items_backed_up,
            total_items: progress.total_items,
            validation_errors: status.validation_errors,
        },
    }
}

/// Backup to create from a request body
pub fn to_internal(body: CreateClusterBackupBody) -> Backup {
    Backup {
        metadata: metadata(&body.name, body.labels),
        spec: spec_to_internal(body.spec),
        status: None,
    }
}
