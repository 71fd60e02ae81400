//! Custom resource types read and written by the dashboard
//!
//! These mirror schemas owned by external controllers (Velero, the platform
//! operator). Field names and label conventions are a contract with those
//! controllers and must not drift.

mod cluster;
mod identity;
mod policy_binding;
mod rule_group;
mod settings;
mod storage_location;
mod types;
pub mod velero;

pub use cluster::{Cluster, ClusterSpec};
pub use identity::{User, UserProjectBinding, UserProjectBindingSpec, UserSpec};
pub use policy_binding::{
    KyvernoPolicyNamespace, PolicyBinding, PolicyBindingCondition, PolicyBindingSpec,
    PolicyBindingStatus,
};
pub use rule_group::{RuleGroup, RuleGroupSpec, RuleGroupType};
pub use settings::{KubermaticSetting, SettingSpec};
pub use storage_location::{
    ClusterBackupStorageLocation, ClusterBackupStorageLocationSpec,
    ClusterBackupStorageLocationStatus, StorageLocationPhase,
};
pub use types::{ConditionStatus, ObjectReference};
pub use velero::{
    Backup, BackupPhase, BackupProgress, BackupSpec, BackupStatus, DeleteBackupRequest,
    DeleteBackupRequestPhase, DeleteBackupRequestSpec, DeleteBackupRequestStatus, LabelSelector,
    ObjectStorageLocation, Restore, RestorePhase, RestoreProgress, RestoreSpec, RestoreStatus,
    Schedule, SchedulePhase, ScheduleSpec, ScheduleStatus, SecretKeySelector,
};

/// Serde (de)serialization of byte payloads as base64 strings, matching
/// how Kubernetes encodes `[]byte` fields.
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Encode bytes as a standard base64 string
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Decode a standard base64 string into bytes
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
