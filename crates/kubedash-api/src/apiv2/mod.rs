//! External API types
//!
//! The stable JSON schema served under `/api/v2`. These types are decoupled
//! from the custom resources they are converted from; see [`crate::convert`].
//! Request bodies carry only caller-mutable fields, so status and server
//! metadata sent by a caller are dropped during decoding.

mod backup;
mod policy_binding;
mod restore;
mod rule_group;
mod schedule;
mod storage_location;

pub use backup::{ClusterBackup, ClusterBackupSpec, ClusterBackupStatus, CreateClusterBackupBody};
pub use policy_binding::{
    CreatePolicyBindingBody, PatchPolicyBindingBody, PolicyBinding, PolicyBindingCondition,
    PolicyBindingSpec, PolicyBindingStatus, PolicyNamespace, PolicyTemplateReference,
};
pub use restore::{ClusterRestore, ClusterRestoreSpec, ClusterRestoreStatus, CreateClusterRestoreBody};
pub use rule_group::{RuleGroup, RuleGroupBody, RuleGroupListQuery, RuleGroupType};
pub use schedule::{
    ClusterBackupSchedule, ClusterBackupScheduleSpec, ClusterBackupScheduleStatus,
    CreateClusterBackupScheduleBody, PatchClusterBackupScheduleBody,
};
pub use storage_location::{
    BackupStorageLocation, BackupStorageLocationSpec, BackupStorageLocationStatus,
    CreateBackupStorageLocationBody, PatchBackupStorageLocationBody, S3Credentials,
};
