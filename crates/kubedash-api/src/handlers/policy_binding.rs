//! Policy binding endpoints

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use kubedash_common::crd;

use crate::apiv2::{CreatePolicyBindingBody, PatchPolicyBindingBody, PolicyBinding};
use crate::auth::Action;
use crate::convert::policy_binding::{spec_to_internal, to_external, to_internal};
use crate::decode::{decode_body, ClusterObjectPath, ClusterPath};
use crate::error::{Error, Result};
use crate::provider::{Accessor, Target};
use crate::server::AppState;

/// POST /projects/{project}/clusters/{cluster}/policybindings
pub async fn create_policy_binding(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PolicyBinding>> {
    let path = path.decode()?;
    let body: CreatePolicyBindingBody = decode_body(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let created = state
        .providers
        .resolve::<crd::PolicyBinding>(&access)
        .create(&target, to_internal(body))
        .await?;

    info!(
        project = %path.project,
        cluster = %path.cluster,
        binding = %created.metadata.name.as_deref().unwrap_or_default(),
        template = %created.spec.policy_template_ref.name,
        "Created policy binding"
    );
    Ok(Json(to_external(&created)))
}

/// GET /projects/{project}/clusters/{cluster}/policybindings
pub async fn list_policy_bindings(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
) -> Result<Json<Vec<PolicyBinding>>> {
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let bindings = state
        .providers
        .resolve::<crd::PolicyBinding>(&access)
        .list(&target)
        .await?;
    Ok(Json(bindings.iter().map(to_external).collect()))
}

/// GET /projects/{project}/clusters/{cluster}/policybindings/{name}
pub async fn get_policy_binding(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<Json<PolicyBinding>> {
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let binding = state
        .providers
        .resolve::<crd::PolicyBinding>(&access)
        .get(&target, &path.name)
        .await?;
    Ok(Json(to_external(&binding)))
}

/// PATCH /projects/{project}/clusters/{cluster}/policybindings/{name}
pub async fn patch_policy_binding(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PolicyBinding>> {
    let path = path.decode()?;
    let patch: PatchPolicyBindingBody = decode_body(&body)?;
    let spec = patch
        .spec
        .map(spec_to_internal)
        .ok_or_else(|| Error::Validation("spec is required".to_string()))?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let patched = state
        .providers
        .resolve::<crd::PolicyBinding>(&access)
        .patch(
            &target,
            &path.name,
            Box::new(move |binding: &mut crd::PolicyBinding| binding.spec = spec),
        )
        .await?;

    info!(project = %path.project, cluster = %path.cluster, binding = %path.name, "Updated policy binding");
    Ok(Json(to_external(&patched)))
}

/// DELETE /projects/{project}/clusters/{cluster}/policybindings/{name}
pub async fn delete_policy_binding(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<()> {
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    state
        .providers
        .resolve::<crd::PolicyBinding>(&access)
        .delete(&target, &path.name)
        .await?;

    info!(project = %path.project, cluster = %path.cluster, binding = %path.name, "Deleted policy binding");
    Ok(())
}
