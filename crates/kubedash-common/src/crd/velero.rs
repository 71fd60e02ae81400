//! Velero resource types
//!
//! Typed resources for the Velero objects the dashboard manages inside user
//! clusters (Backup, Restore, Schedule, DeleteBackupRequest). Velero owns
//! these schemas; only the fields the dashboard reads or writes are modelled,
//! unknown fields are ignored on read.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared Types
// =============================================================================

/// Label selector for backup/restore filtering
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

/// Selects a key of a Secret
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the Kubernetes Secret
    pub name: String,
    /// Key within the Secret
    pub key: String,
}

/// Object storage configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStorageLocation {
    /// Bucket name
    pub bucket: String,
    /// Prefix within the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// PEM-encoded CA bundle for the object store endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
}

// =============================================================================
// Backup
// =============================================================================

/// Phase of a Velero Backup
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum BackupPhase {
    /// Backup has not been processed yet
    #[default]
    New,
    /// Backup spec failed validation
    FailedValidation,
    /// Backup is running
    InProgress,
    /// Waiting on asynchronous plugin operations
    WaitingForPluginOperations,
    /// Backup data written, finishing up
    Finalizing,
    /// Backup completed successfully
    Completed,
    /// Backup completed with errors
    PartiallyFailed,
    /// Backup failed
    Failed,
    /// Backup is being deleted
    Deleting,
    /// Phase reported by a newer Velero
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for BackupPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::FailedValidation => write!(f, "FailedValidation"),
            Self::InProgress => write!(f, "InProgress"),
            Self::WaitingForPluginOperations => write!(f, "WaitingForPluginOperations"),
            Self::Finalizing => write!(f, "Finalizing"),
            Self::Completed => write!(f, "Completed"),
            Self::PartiallyFailed => write!(f, "PartiallyFailed"),
            Self::Failed => write!(f, "Failed"),
            Self::Deleting => write!(f, "Deleting"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Backup progress counters
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupProgress {
    /// Total number of items to back up
    #[serde(default)]
    pub total_items: i64,
    /// Number of items backed up so far
    #[serde(default)]
    pub items_backed_up: i64,
}

/// Status of a Velero Backup
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    /// Current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<BackupPhase>,
    /// When the backup started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// When the backup finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<DateTime<Utc>>,
    /// When the backup is eligible for garbage collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
    /// Number of errors encountered
    #[serde(default)]
    pub errors: i32,
    /// Number of warnings encountered
    #[serde(default)]
    pub warnings: i32,
    /// Progress counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<BackupProgress>,
    /// Validation errors reported by Velero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}

/// Velero Backup specification
///
/// Also used as the template of a [`Schedule`].
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Backup",
    plural = "backups",
    namespaced,
    status = "BackupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    /// Included namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_namespaces: Vec<String>,
    /// Excluded namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_namespaces: Vec<String>,
    /// Included resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_resources: Vec<String>,
    /// Excluded resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_resources: Vec<String>,
    /// Whether cluster-scoped resources are included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_cluster_resources: Option<bool>,
    /// Label selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    /// Snapshot volumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_volumes: Option<bool>,
    /// TTL for backups (Go duration, e.g. "720h0m0s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Storage location name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    /// Volume snapshot locations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_snapshot_locations: Vec<String>,
    /// Default volumes to file-system backup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_volumes_to_fs_backup: Option<bool>,
}

// =============================================================================
// DeleteBackupRequest
// =============================================================================

/// Phase of a Velero DeleteBackupRequest
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum DeleteBackupRequestPhase {
    /// Request has not been processed yet
    #[default]
    New,
    /// Deletion is running
    InProgress,
    /// Deletion request was processed
    Processed,
    /// Phase reported by a newer Velero
    #[serde(other)]
    Unknown,
}

/// Status of a Velero DeleteBackupRequest
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBackupRequestStatus {
    /// Current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<DeleteBackupRequestPhase>,
    /// Errors encountered while deleting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Velero DeleteBackupRequest specification
///
/// Recorded intent to delete a backup; Velero removes the backup and its
/// data from object storage when processing the request.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "DeleteBackupRequest",
    plural = "deletebackuprequests",
    namespaced,
    status = "DeleteBackupRequestStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBackupRequestSpec {
    /// Name of the backup to delete
    pub backup_name: String,
}

// =============================================================================
// Restore
// =============================================================================

/// Phase of a Velero Restore
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum RestorePhase {
    /// Restore has not been processed yet
    #[default]
    New,
    /// Restore spec failed validation
    FailedValidation,
    /// Restore is running
    InProgress,
    /// Waiting on asynchronous plugin operations
    WaitingForPluginOperations,
    /// Restore data applied, finishing up
    Finalizing,
    /// Restore completed successfully
    Completed,
    /// Restore completed with errors
    PartiallyFailed,
    /// Restore failed
    Failed,
    /// Phase reported by a newer Velero
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::FailedValidation => write!(f, "FailedValidation"),
            Self::InProgress => write!(f, "InProgress"),
            Self::WaitingForPluginOperations => write!(f, "WaitingForPluginOperations"),
            Self::Finalizing => write!(f, "Finalizing"),
            Self::Completed => write!(f, "Completed"),
            Self::PartiallyFailed => write!(f, "PartiallyFailed"),
            Self::Failed => write!(f, "Failed"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Restore progress counters
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestoreProgress {
    /// Total number of items to restore
    #[serde(default)]
    pub total_items: i64,
    /// Number of items restored so far
    #[serde(default)]
    pub items_restored: i64,
}

/// Status of a Velero Restore
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestoreStatus {
    /// Current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<RestorePhase>,
    /// When the restore started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    /// When the restore finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<DateTime<Utc>>,
    /// Number of errors encountered
    #[serde(default)]
    pub errors: i32,
    /// Number of warnings encountered
    #[serde(default)]
    pub warnings: i32,
    /// Why the restore failed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Progress counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<RestoreProgress>,
    /// Validation errors reported by Velero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}

/// Velero Restore specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Restore",
    plural = "restores",
    namespaced,
    status = "RestoreStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSpec {
    /// Name of the Velero Backup to restore from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,
    /// Restore from the latest backup of this schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_name: Option<String>,
    /// Included namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_namespaces: Vec<String>,
    /// Excluded namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_namespaces: Vec<String>,
    /// Included resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_resources: Vec<String>,
    /// Excluded resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_resources: Vec<String>,
    /// Source namespace to target namespace mapping
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_mapping: BTreeMap<String, String>,
    /// Label selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,
    /// Restore PVs
    #[serde(
        default,
        rename = "restorePVs",
        skip_serializing_if = "Option::is_none"
    )]
    pub restore_pvs: Option<bool>,
    /// What to do with resources that already exist ("none" or "update")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_resource_policy: Option<String>,
}

// =============================================================================
// Schedule
// =============================================================================

/// Phase of a Velero Schedule
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum SchedulePhase {
    /// Schedule has not been processed yet
    #[default]
    New,
    /// Schedule is active
    Enabled,
    /// Schedule spec failed validation
    FailedValidation,
    /// Phase reported by a newer Velero
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for SchedulePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::Enabled => write!(f, "Enabled"),
            Self::FailedValidation => write!(f, "FailedValidation"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Status of a Velero Schedule
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    /// Current phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<SchedulePhase>,
    /// When the last backup was created from this schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
    /// Validation errors reported by Velero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}

/// Velero Schedule specification
///
/// Defines a periodic backup schedule.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "velero.io",
    version = "v1",
    kind = "Schedule",
    plural = "schedules",
    namespaced,
    status = "ScheduleStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    /// Cron schedule expression
    pub schedule: String,
    /// Backup template
    #[serde(default)]
    pub template: BackupSpec,
    /// Whether the schedule is paused
    #[serde(default)]
    pub paused: bool,
    /// Set owner references from the schedule on created backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_owner_references_in_backup: Option<bool>,
}
