//! Rule group endpoints

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use kubedash_common::crd;

use crate::apiv2::{RuleGroup, RuleGroupBody, RuleGroupListQuery};
use crate::auth::Action;
use crate::convert::rule_group::{spec_to_internal, to_external, to_internal, type_to_external};
use crate::decode::{decode_body, rule_group_name, ClusterObjectPath, ClusterPath};
use crate::error::{Error, Result};
use crate::provider::{Accessor, Target};
use crate::server::AppState;

/// POST /projects/{project}/clusters/{cluster}/rulegroups
///
/// The rule group is named after the `name` field of its data.
pub async fn create_rule_group(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RuleGroup>> {
    let path = path.decode()?;
    let body: RuleGroupBody = decode_body(&body)?;
    let name = rule_group_name(&body)?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let created = state
        .providers
        .resolve::<crd::RuleGroup>(&access)
        .create(&target, to_internal(&path.cluster, &name, body))
        .await?;

    info!(project = %path.project, cluster = %path.cluster, rule_group = %name, "Created rule group");
    Ok(Json(to_external(&created)))
}

/// GET /projects/{project}/clusters/{cluster}/rulegroups[?type=Metrics|Logs]
pub async fn list_rule_groups(
    State(state): State<AppState>,
    Path(path): Path<ClusterPath>,
    query: std::result::Result<Query<RuleGroupListQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Vec<RuleGroup>>> {
    let path = path.decode()?;
    let Query(query) = query.map_err(|e| Error::Validation(e.body_text()))?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let rule_groups = state
        .providers
        .resolve::<crd::RuleGroup>(&access)
        .list(&target)
        .await?;
    Ok(Json(
        rule_groups
            .iter()
            .filter(|rg| {
                query
                    .type_
                    .is_none_or(|t| type_to_external(rg.spec.rule_group_type) == t)
            })
            .map(to_external)
            .collect(),
    ))
}

/// GET /projects/{project}/clusters/{cluster}/rulegroups/{name}
pub async fn get_rule_group(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
) -> Result<Json<RuleGroup>> {
    let path = path.decode()?;
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Read)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let rule_group = state
        .providers
        .resolve::<crd::RuleGroup>(&access)
        .get(&target, &path.name)
        .await?;
    Ok(Json(to_external(&rule_group)))
}

/// PUT /projects/{project}/clusters/{cluster}/rulegroups/{name}
///
/// Replaces the spec of an existing rule group. The `name` in the data
/// must match the path.
pub async fn replace_rule_group(
    State(state): State<AppState>,
    Path(path): Path<ClusterObjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RuleGroup>> {
    let path = path.decode()?;
    let body: RuleGroupBody = decode_body(&body)?;
    let name = rule_group_name(&body)?;
    if name != path.name {
        return Err(Error::Validation(format!(
            "rule group data is named {} but the request is for {}",
            name, path.name
        )));
    }
    let access = state
        .authorizer
        .authorize(&headers, &path.project, Action::Write)
        .await?;

    let target = Target::cluster_namespace(&path.project, &path.cluster);
    let spec = spec_to_internal(&path.cluster, body);
    let replaced = state
        .providers
        .resolve::<crd::RuleGroup>(&access)
        .patch(
            &target,
            &path.name,
            Box::new(move |rg: &mut crd::RuleGroup| rg.spec = spec),
        )
        .await?;

    info!(project = %path.project, cluster = %path.cluster, rule_group = %path.name, "Replaced rule group");
    Ok(Json(to_external(&replaced)))
}

/// DELETE /projects/{project}/clusters/{cluster}/rulegroups/{name}
pub async fn delete_rule_group(
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
        .resolve::<crd::RuleGroup>(&access)
        .delete(&target, &path.name)
        .await?;

    info!(project = %path.project, cluster = %path.cluster, rule_group = %path.name, "Deleted rule group");
    Ok(())
}
