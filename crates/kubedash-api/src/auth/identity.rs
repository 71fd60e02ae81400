//! Caller identity and project membership
//!
//! Token claims say who the caller is; the platform `User` record says
//! whether they are an administrator; `UserProjectBinding` records say which
//! role they hold in a project.

use std::fmt;

use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use kubedash_common::crd::{User, UserProjectBinding, UserSpec};

use crate::error::Result;

/// Claims extracted from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Email address
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Groups asserted by the identity provider
    pub groups: Vec<String>,
}

/// Verifies bearer tokens
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return its claims; invalid tokens are `Unauthorized`
    async fn verify(&self, token: &str) -> Result<TokenClaims>;
}

/// Authenticated caller, derived once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Platform administrator
    pub is_admin: bool,
    /// Groups asserted by the identity provider
    pub groups: Vec<String>,
}

/// Looks up platform user records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// User record for `email`, if one exists
    async fn user_by_email(&self, email: &str) -> kubedash_common::Result<Option<UserSpec>>;
}

/// Looks up project memberships
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Role group (`<role>-<project>`) of `email` in `project`, if a member
    async fn group_in_project(
        &self,
        email: &str,
        project: &str,
    ) -> kubedash_common::Result<Option<String>>;
}

/// [`UserProvider`] reading `User` objects from the seed
pub struct KubeUserProvider {
    client: Client,
}

impl KubeUserProvider {
    /// Create a provider using the seed client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserProvider for KubeUserProvider {
    async fn user_by_email(&self, email: &str) -> kubedash_common::Result<Option<UserSpec>> {
        let api: Api<User> = Api::all(self.client.clone());
        let users = api.list(&ListParams::default()).await?;

        let user = users
            .items
            .into_iter()
            .find(|u| u.spec.email.eq_ignore_ascii_case(email))
            .map(|u| u.spec);

        debug!(email = %email, found = user.is_some(), "Looked up user");
        Ok(user)
    }
}

/// [`MembershipProvider`] reading `UserProjectBinding` objects from the seed
pub struct KubeMembershipProvider {
    client: Client,
}

impl KubeMembershipProvider {
    /// Create a provider using the seed client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MembershipProvider for KubeMembershipProvider {
    async fn group_in_project(
        &self,
        email: &str,
        project: &str,
    ) -> kubedash_common::Result<Option<String>> {
        let api: Api<UserProjectBinding> = Api::all(self.client.clone());
        let bindings = api.list(&ListParams::default()).await?;

        Ok(bindings
            .items
            .into_iter()
            .find(|b| b.spec.project_id == project && b.spec.user_email.eq_ignore_ascii_case(email))
            .map(|b| b.spec.group))
    }
}

/// Role held in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full control, including membership
    Owner,
    /// Read and write resources
    Editor,
    /// Read only
    Viewer,
    /// Manage project resources on behalf of owners
    ProjectManager,
}

impl Role {
    /// Parse a `<role>-<project>` group for `project`
    pub fn from_group(group: &str, project: &str) -> Option<Self> {
        let prefix = group.strip_suffix(project)?.strip_suffix('-')?;
        match prefix {
            "owners" => Some(Self::Owner),
            "editors" => Some(Self::Editor),
            "viewers" => Some(Self::Viewer),
            "projectmanagers" => Some(Self::ProjectManager),
            _ => None,
        }
    }

    /// Whether this role may create, change or delete resources
    pub fn can_write(self) -> bool {
        !matches!(self, Self::Viewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owners"),
            Self::Editor => write!(f, "editors"),
            Self::Viewer => write!(f, "viewers"),
            Self::ProjectManager => write!(f, "projectmanagers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_group() {
        assert_eq!(Role::from_group("owners-p1", "p1"), Some(Role::Owner));
        assert_eq!(Role::from_group("editors-p1", "p1"), Some(Role::Editor));
        assert_eq!(Role::from_group("viewers-p1", "p1"), Some(Role::Viewer));
        assert_eq!(
            Role::from_group("projectmanagers-p1", "p1"),
            Some(Role::ProjectManager)
        );
    }

    #[test]
    fn test_role_from_group_other_project() {
        assert_eq!(Role::from_group("editors-p2", "p1"), None);
        assert_eq!(Role::from_group("editorsp1", "p1"), None);
        assert_eq!(Role::from_group("admins-p1", "p1"), None);
    }

    #[test]
    fn test_only_viewers_are_read_only() {
        assert!(Role::Owner.can_write());
        assert!(Role::Editor.can_write());
        assert!(Role::ProjectManager.can_write());
        assert!(!Role::Viewer.can_write());
    }

    #[test]
    fn test_role_display_matches_group_prefix() {
        for role in [Role::Owner, Role::Editor, Role::Viewer, Role::ProjectManager] {
            let group = format!("{}-p1", role);
            assert_eq!(Role::from_group(&group, "p1"), Some(role));
        }
    }
}
