//! ClusterBackupStorageLocation custom resource
//!
//! A project-owned object storage destination for cluster backups. The
//! platform operator syncs it into a Velero BackupStorageLocation on every
//! user cluster of the project. Objects live in the `kubermatic` namespace
//! of the seed and carry the `project-id` label.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::velero::{ObjectStorageLocation, SecretKeySelector};

/// Availability of a storage location as last validated
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum StorageLocationPhase {
    /// Location is reachable
    Available,
    /// Location could not be validated
    #[default]
    Unavailable,
    /// Phase reported by a newer controller
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for StorageLocationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Storage location status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBackupStorageLocationStatus {
    /// Current availability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<StorageLocationPhase>,

    /// Last time the location was validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validation_time: Option<DateTime<Utc>>,

    /// Last time backups were synced from the location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_time: Option<DateTime<Utc>>,

    /// Human-readable message from the last validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Storage location specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kubermatic.k8c.io",
    version = "v1",
    kind = "ClusterBackupStorageLocation",
    plural = "clusterbackupstoragelocations",
    shortname = "cbsl",
    namespaced,
    status = "ClusterBackupStorageLocationStatus",
    printcolumn = r#"{"name":"Provider","type":"string","jsonPath":".spec.provider"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBackupStorageLocationSpec {
    /// Object storage plugin provider (e.g. "aws")
    pub provider: String,

    /// Bucket and prefix
    pub object_storage: ObjectStorageLocation,

    /// Provider-specific configuration (region, s3Url, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,

    /// Secret key holding the provider credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<SecretKeySelector>,

    /// Whether this is the default location for backups
    #[serde(default)]
    pub default: bool,

    /// "ReadWrite" or "ReadOnly"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,

    /// How often to sync backups from the location (Go duration)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_sync_period: Option<String>,

    /// How often to validate the location (Go duration)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_frequency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_yaml_wire_format() {
        let spec: ClusterBackupStorageLocationSpec = serde_json::from_value(serde_json::json!({
            "provider": "aws",
            "objectStorage": {"bucket": "backups", "prefix": "prod"},
            "config": {"region": "eu-central-1"},
            "credential": {"name": "p1-s3-credentials", "key": "cloud"},
            "accessMode": "ReadWrite"
        }))
        .unwrap();

        assert_eq!(spec.object_storage.bucket, "backups");
        assert_eq!(spec.object_storage.prefix.as_deref(), Some("prod"));
        assert_eq!(spec.config.get("region").map(String::as_str), Some("eu-central-1"));
        assert_eq!(spec.credential.unwrap().key, "cloud");
        assert!(!spec.default);
    }

    #[test]
    fn test_status_phase() {
        let status: ClusterBackupStorageLocationStatus = serde_json::from_value(
            serde_json::json!({"phase": "Available", "lastValidationTime": "2026-01-10T08:00:00Z"}),
        )
        .unwrap();
        assert_eq!(status.phase, Some(StorageLocationPhase::Available));
        assert!(status.last_validation_time.is_some());
        assert_eq!(StorageLocationPhase::Unavailable.to_string(), "Unavailable");
    }
}
