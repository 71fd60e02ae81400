//! Backup schedule endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use kubedash_common::crd::Schedule;

use super::backup_gate;
use crate::apiv2::{
    ClusterBackupSchedule, CreateClusterBackupScheduleBody, PatchClusterBackupScheduleBody,
};
use crate::auth::Action;
use crate::convert::schedule::{apply_patch, to_external, to_internal};
use crate::decode::{decode_body, ClusterObjectPath, ClusterPath};
use crate::error::Result;
use crate::provider::{Accessor, Target};
use crate::server::AppState;

/// POST /projects/{project}/clusters/{cluster}/backupschedules
pub async fn create_schedule(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClusterBackupSchedule>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let body: CreateClusterBackupScheduleBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let created = state
        .providers
        .resolve::<Schedule>(&access)
        .create(&target, to_internal(body))
        .await?;

    info!(
        project = %path.project,
        cluster = %path.cluster,
        schedule = %created.metadata.name.as_deref().unwrap_or_default(),
        cron = %created.spec.schedule,
        "Created backup schedule"
    );
    Ok(Json(to_external(&created)))
}

/// GET /projects/{project}/clusters/{cluster}/backupschedules
pub async fn list_schedules(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClusterBackupSchedule>>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let schedules = state
        .providers
        .resolve::<Schedule>(&access)
        .list(&target)
        .await?;
    Ok(Json(schedules.iter().map(to_external).collect()))
}

/// GET /projects/{project}/clusters/{cluster}/backupschedules/{name}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<Json<ClusterBackupSchedule>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let schedule = state
        .providers
        .resolve::<Schedule>(&access)
        .get(&target, &path.name)
        .await?;
    Ok(Json(to_external(&schedule)))
}

/// PATCH /projects/{project}/clusters/{cluster}/backupschedules/{name}
pub async fn patch_schedule(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClusterBackupSchedule>> {
    backup_gate(&state).await?;
    let path = path.decode()?;
    let patch: PatchClusterBackupScheduleBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::user_cluster(&path.project, &path.cluster);
    let patched = state
        .providers
        .resolve::<Schedule>(&access)
        .patch(
            &target,
            &path.name,
            Box::new(move |schedule: &mut Schedule| apply_patch(schedule, patch)),
        )
        .await?;

    info!(
        project = %path.project,
        cluster = %path.cluster,
        schedule = %path.name,
        paused = patched.spec.paused,
        "Updated backup schedule"
    );
    Ok(Json(to_external(&patched)))
}

/// DELETE /projects/{project}/clusters/{cluster}/backupschedules/{name}
pub async fn delete_schedule(
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
        .resolve::<Schedule>(&access)
        .delete(&target, &path.name)
        .await?;

    info!(project = %path.project, cluster = %path.cluster, schedule = %path.name, "Deleted backup schedule");
    Ok(())
}
