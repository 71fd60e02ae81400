//! BackupStorageLocation ↔ ClusterBackupStorageLocation
//!
//! Locations share one namespace across projects, so the stored name is
//! `<project>-<name>` and the external name drops the project prefix.
//! Region and endpoint travel in the provider config under `region` and
//! `s3Url`.

use std::collections::BTreeMap;

use kubedash_common::crd::{
    ClusterBackupStorageLocation, ClusterBackupStorageLocationSpec, ObjectStorageLocation,
    StorageLocationPhase,
};

use super::creation_time;
use crate::apiv2::{
    BackupStorageLocation, BackupStorageLocationSpec, BackupStorageLocationStatus,
    CreateBackupStorageLocationBody, S3Credentials,
};
use crate::provider::CloudCredentials;

/// Object storage plugin used for every location
pub const PROVIDER: &str = "aws";

const REGION_KEY: &str = "region";
const ENDPOINT_KEY: &str = "s3Url";

/// Stored name of location `name` in `project`
pub fn internal_name(project: &str, name: &str) -> String {
    format!("{}-{}", project, name)
}

/// External name of a stored location
pub fn display_name<'a>(project: &str, internal: &'a str) -> &'a str {
    internal
        .strip_prefix(project)
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(internal)
}

fn spec_to_external(spec: &ClusterBackupStorageLocationSpec) -> BackupStorageLocationSpec {
    let mut config = spec.config.clone();
    let region = config.remove(REGION_KEY);
    let endpoint = config.remove(ENDPOINT_KEY);

    BackupStorageLocationSpec {
        bucket: spec.object_storage.bucket.clone(),
        prefix: spec.object_storage.prefix.clone(),
        region,
        endpoint,
        ca_cert: spec.object_storage.ca_cert.clone(),
        default: spec.default,
        access_mode: spec.access_mode.clone(),
        backup_sync_period: spec.backup_sync_period.clone(),
        validation_frequency: spec.validation_frequency.clone(),
        config,
    }
}

/// Stored spec for an external spec; `spec.credential` is left unset
pub fn spec_to_internal(spec: BackupStorageLocationSpec) -> ClusterBackupStorageLocationSpec {
    let mut config: BTreeMap<String, String> = spec.config;
    if let Some(region) = spec.region {
        config.insert(REGION_KEY.to_string(), region);
    }
    if let Some(endpoint) = spec.endpoint {
        config.insert(ENDPOINT_KEY.to_string(), endpoint);
    }

    ClusterBackupStorageLocationSpec {
        provider: PROVIDER.to_string(),
        object_storage: ObjectStorageLocation {
            bucket: spec.bucket,
            prefix: spec.prefix,
            ca_cert: spec.ca_cert,
        },
        config,
        credential: None,
        default: spec.default,
        access_mode: spec.access_mode,
        backup_sync_period: spec.backup_sync_period,
        validation_frequency: spec.validation_frequency,
    }
}

/// External representation of a stored location
pub fn to_external(project: &str, location: &ClusterBackupStorageLocation) -> BackupStorageLocation {
    let id = location.metadata.name.clone().unwrap_or_default();
    let status = location.status.clone().unwrap_or_default();

    BackupStorageLocation {
        name: display_name(project, &id).to_string(),
        creation_timestamp: creation_time(&location.metadata),
        spec: spec_to_external(&location.spec),
        status: BackupStorageLocationStatus {
            phase: status
                .phase
                .unwrap_or(StorageLocationPhase::Unavailable)
                .to_string(),
            last_validation_time: status.last_validation_time,
            last_synced_time: status.last_synced_time,
            message: status.message,
        },
        id,
    }
}

/// Location to create in `project` from a request body
pub fn to_internal(project: &str, body: CreateBackupStorageLocationBody) -> ClusterBackupStorageLocation {
    ClusterBackupStorageLocation::new(
        &internal_name(project, &body.name),
        spec_to_internal(body.spec),
    )
}

/// Replace the caller-settable spec fields, keeping the credential link
pub fn apply_spec(location: &mut ClusterBackupStorageLocation, spec: BackupStorageLocationSpec) {
    let credential = location.spec.credential.take();
    location.spec = spec_to_internal(spec);
    location.spec.credential = credential;
}

/// Access keys in the form the credentials secret stores
pub fn credentials(creds: S3Credentials) -> CloudCredentials {
    CloudCredentials {
        access_key_id: creds.access_key_id,
        secret_access_key: creds.secret_access_key,
    }
}
