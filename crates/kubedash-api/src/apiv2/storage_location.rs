use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// S3-compatible object storage destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStorageLocationSpec {
    /// Bucket name
    #[serde(default)]
    pub bucket: String,
    /// Prefix within the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Bucket region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Endpoint URL for non-AWS object stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// PEM CA bundle for the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
    /// Default location for new backups
    #[serde(default)]
    pub default: bool,
    /// `ReadWrite` or `ReadOnly`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_mode: Option<String>,
    /// How often backups are synced from the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_sync_period: Option<String>,
    /// How often the location is validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_frequency: Option<String>,
    /// Additional provider configuration
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

/// Observed state of a storage location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStorageLocationStatus {
    /// `Available` or `Unavailable`
    pub phase: String,
    /// Last validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validation_time: Option<DateTime<Utc>>,
    /// Last backup sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_time: Option<DateTime<Utc>>,
    /// Message from the last validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A project's backup storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStorageLocation {
    /// Name within the project
    pub name: String,
    /// Platform-wide identifier
    pub id: String,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Destination
    pub spec: BackupStorageLocationSpec,
    /// Observed state
    pub status: BackupStorageLocationStatus,
}

/// Object storage access keys
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    /// Access key id
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: String,
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Body of a create storage location request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupStorageLocationBody {
    /// Name within the project
    #[serde(default)]
    pub name: String,
    /// Destination
    #[serde(default)]
    pub spec: BackupStorageLocationSpec,
    /// Access keys
    #[serde(default)]
    pub credentials: Option<S3Credentials>,
}

/// Body of a patch storage location request; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchBackupStorageLocationBody {
    /// New destination
    #[serde(default)]
    pub spec: Option<BackupStorageLocationSpec>,
    /// New access keys
    #[serde(default)]
    pub credentials: Option<S3Credentials>,
}
