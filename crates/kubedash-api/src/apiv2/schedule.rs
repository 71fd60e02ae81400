use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClusterBackupSpec;

/// When and what to back up periodically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBackupScheduleSpec {
    /// Cron expression
    #[serde(default)]
    pub schedule: String,
    /// Suspend backup creation
    #[serde(default)]
    pub paused: bool,
    /// Backup created on every run
    #[serde(default)]
    pub template: ClusterBackupSpec,
    /// Owner-reference created backups to the schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_owner_references_in_backup: Option<bool>,
}

/// Observed state of a schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBackupScheduleStatus {
    /// Phase name
    pub phase: String,
    /// Last time a backup was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
    /// Validation errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
}

/// A periodic backup of a user cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBackupSchedule {
    /// Schedule name
    pub name: String,
    /// Server-assigned identifier
    pub id: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Desired schedule
    pub spec: ClusterBackupScheduleSpec,
    /// Observed state
    pub status: ClusterBackupScheduleStatus,
}

/// Body of a create schedule request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterBackupScheduleBody {
    /// Schedule name
    #[serde(default)]
    pub name: String,
    /// Labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Desired schedule
    #[serde(default)]
    pub spec: ClusterBackupScheduleSpec,
}

/// Body of a patch schedule request; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchClusterBackupScheduleBody {
    /// New cron expression
    #[serde(default)]
    pub schedule: Option<String>,
    /// Pause or resume
    #[serde(default)]
    pub paused: Option<bool>,
    /// New backup template
    #[serde(default)]
    pub template: Option<ClusterBackupSpec>,
}
