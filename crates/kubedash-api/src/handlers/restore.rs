//! Cluster restore endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use kubedash_common::crd::Restore;

use super::backup_gate;
use crate::apiv2::{ClusterRestore, CreateClusterRestoreBody};
use crate::auth::Action;
use crate::convert::restore::{to_external, to_internal};
use crate::decode::{decode_body, ClusterObjectPath, ClusterPath};
use crate::error::Result;
use crate::provider::{Accessor, Target};
use crate::server::AppState;

/// POST /projects/{project}/clusters/{cluster}/restores
pub async fn create_restore(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClusterRestore>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let body: CreateClusterRestoreBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let created = state
        .providers
        .resolve::<Restore>(&access)
        .create(&target, to_internal(body))
        .await?;

    info!(
        project = %path.project,
        cluster = %path.cluster,
        restore = %created.metadata.name.as_deref().unwrap_or_default(),
        "Created cluster restore"
    );
    Ok(Json(to_external(&created)))
}

/// GET /projects/{project}/clusters/{cluster}/restores
pub async fn list_restores(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClusterRestore>>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let restores = state
        .providers
        .resolve::<Restore>(&access)
        .list(&target)
        .await?;
    Ok(Json(restores.iter().map(to_external).collect()))
}

/// GET /projects/{project}/clusters/{cluster}/restores/{name}
pub async fn get_restore(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<Json<ClusterRestore>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let restore = state
        .providers
        .resolve::<Restore>(&access)
        .get(&target, &path.name)
        .await?;
    Ok(Json(to_external(&restore)))
}

/// DELETE /projects/{project}/clusters/{cluster}/restores/{name}
pub async fn delete_restore(
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
        .resolve::<Restore>(&access)
        .delete(&target, &path.name)
        .await?;

    info!(project = %path.project, cluster = %path.cluster, restore = %path.name, "Deleted cluster restore");
    Ok(())
}
