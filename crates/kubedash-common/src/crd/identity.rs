//! Platform users and their project memberships

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Platform user record
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "kubermatic.k8c.io", version = "v1", kind = "User", plural = "users")]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Email address, the identity key matched against token claims
    pub email: String,

    /// Platform administrator
    #[serde(default)]
    pub is_admin: bool,
}

/// Membership of a user in a project
///
/// The group is `<role>-<project>`, e.g. `editors-p1`.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kubermatic.k8c.io",
    version = "v1",
    kind = "UserProjectBinding",
    plural = "userprojectbindings"
)]
#[serde(rename_all = "camelCase")]
pub struct UserProjectBindingSpec {
    /// Member email
    pub user_email: String,

    /// Project the membership applies to
    #[serde(rename = "projectID")]
    pub project_id: String,

    /// Role group
    pub group: String,
}
