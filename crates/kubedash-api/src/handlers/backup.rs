//! Cluster backup endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use super::backup_gate;
use crate::apiv2::{ClusterBackup, CreateClusterBackupBody};
use crate::auth::Action;
use crate::convert::backup::{to_external, to_internal};
use crate::decode::{decode_body, ClusterObjectPath, ClusterPath};
use crate::error::Result;
use crate::provider::{Accessor, Target};
use crate::server::AppState;

/// POST /projects/{project}/clusters/{cluster}/backups
pub async fn create_backup(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClusterBackup>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let body: CreateClusterBackupBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let created = state
        .providers
        .backups(&access)
        .create(&target, to_internal(body))
        .await?;

    info!(
        project = %path.project,
        cluster = %path.cluster,
        backup = %created.metadata.name.as_deref().unwrap_or_default(),
        "Created cluster backup"
    );
    Ok(Json(to_external(&created)))
}

/// GET /projects/{project}/clusters/{cluster}/backups
pub async fn list_backups(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClusterBackup>>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let backups = state.providers.backups(&access).list(&target).await?;
    Ok(Json(backups.iter().map(to_external).collect()))
}

/// GET /projects/{project}/clusters/{cluster}/backups/{name}
pub async fn get_backup(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<Json<ClusterBackup>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let backup = state
        .providers
        .backups(&access)
        .get(&target, &path.name)
        .await?;
    Ok(Json(to_external(&backup)))
}

/// DELETE /projects/{project}/clusters/{cluster}/backups/{name}
///
/// Files a deletion request; the backup object disappears once the backup
/// engine has removed its data.
pub async fn delete_backup(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<()> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    state
        .providers
        .backups(&access)
        .delete(&target, &path.name)
        .await
}
