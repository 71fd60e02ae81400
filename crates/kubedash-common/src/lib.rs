//! Common types for kubedash: custom resources, errors, and shared utilities

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label carrying the owning project on project-scoped resources
pub const PROJECT_ID_LABEL: &str = "project-id";

/// Namespace on user clusters where Velero resources live
pub const VELERO_NAMESPACE: &str = "velero";

/// Namespace on the seed for platform-wide resources (storage locations, credentials)
pub const KUBERMATIC_NAMESPACE: &str = "kubermatic";

/// Name of the cluster-scoped global settings object
pub const GLOBAL_SETTINGS_NAME: &str = "globalsettings";

/// Secret in the cluster namespace holding the user cluster admin kubeconfig
pub const ADMIN_KUBECONFIG_SECRET: &str = "admin-kubeconfig";

/// Data key of the kubeconfig inside [`ADMIN_KUBECONFIG_SECRET`]
pub const KUBECONFIG_SECRET_KEY: &str = "kubeconfig";

/// Label linking a DeleteBackupRequest to its backup by name
pub const VELERO_BACKUP_NAME_LABEL: &str = "velero.io/backup-name";

/// Label linking a DeleteBackupRequest to its backup by UID
pub const VELERO_BACKUP_UID_LABEL: &str = "velero.io/backup-uid";

/// Seed namespace that holds the control plane objects of a user cluster
pub fn cluster_namespace(cluster_id: &str) -> String {
    format!("cluster-{}", cluster_id)
}
