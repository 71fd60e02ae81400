//! Backup storage location endpoints
//!
//! Locations are project-level objects; the path name is the name within the
//! project and is prefixed with the project id for storage.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use kubedash_common::crd::ClusterBackupStorageLocation;

use super::backup_gate;
use crate::apiv2::{
    BackupStorageLocation, CreateBackupStorageLocationBody, PatchBackupStorageLocationBody,
};
use crate::auth::Action;
use crate::convert::storage_location::{
    apply_spec, credentials, internal_name, to_external, to_internal,
};
use crate::decode::{decode_body, missing_credentials, ProjectObjectPath, ProjectPath};
use crate::error::Result;
use crate::provider::Target;
use crate::server::AppState;

/// POST /projects/{project}/backupstoragelocations
pub async fn create_storage_location(
    State(state): State<AppState>,
    Path(path): Path<ProjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BackupStorageLocation>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let mut body: CreateBackupStorageLocationBody = decode_body(&body)?;
    let creds = body
        .credentials
        .take()
        .map(credentials)
        .ok_or_else(missing_credentials)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::project_labelled(&path.project);
    let created = state
        .providers
        .storage_locations(&access)
        .create(&target, to_internal(&path.project, body), &creds)
        .await?;

    Ok(Json(to_external(&path.project, &created)))
}

/// GET /projects/{project}/backupstoragelocations
pub async fn list_storage_locations(
    State(state): State<AppState>,
    Path(path): Path<ProjectPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<BackupStorageLocation>>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::project_labelled(&path.project);
    let locations = state
        .providers
        .storage_locations(&access)
        .list(&target)
        .await?;
    Ok(Json(
        locations
            .iter()
            .map(|location| to_external(&path.project, location))
            .collect(),
    ))
}

/// GET /projects/{project}/backupstoragelocations/{name}
pub async fn get_storage_location(
    State(state): State<AppState>,
    Path(path): Path<ProjectObjectPath>,
    headers: HeaderMap,
) -> Result<Json<BackupStorageLocation>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::project_labelled(&path.project);
    let location = state
        .providers
        .storage_locations(&access)
        .get(&target, &internal_name(&path.project, &path.name))
        .await?;
    Ok(Json(to_external(&path.project, &location)))
}

/// PATCH /projects/{project}/backupstoragelocations/{name}
pub async fn patch_storage_location(
    State(state): State<AppState>,
    Path(path): Path<ProjectObjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BackupStorageLocation>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let patch: PatchBackupStorageLocationBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::project_labelled(&path.project);
    let creds = patch.credentials.map(credentials);
    let spec = patch.spec;
    let patched = state
        .providers
        .storage_locations(&access)
        .patch(
            &target,
            &internal_name(&path.project, &path.name),
            Box::new(move |location: &mut ClusterBackupStorageLocation| {
                if let Some(spec) = spec {
                    apply_spec(location, spec);
                }
            }),
            creds.as_ref(),
        )
        .await?;

    info!(project = %path.project, location = %path.name, "Updated storage location");
    Ok(Json(to_external(&path.project, &patched)))
}

/// DELETE /projects/{project}/backupstoragelocations/{name}
pub async fn delete_storage_location(
    State(state): State<AppState>,
    Path(path): Path<ProjectObjectPath>,
    headers: HeaderMap,
) -> Result<()> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::project_labelled(&path.project);
    state
        .providers
        .storage_locations(&access)
        .delete(&target, &internal_name(&path.project, &path.name))
        .await?;

    info!(project = %path.project, location = %path.name, "Deleted storage location");
    Ok(())
}
