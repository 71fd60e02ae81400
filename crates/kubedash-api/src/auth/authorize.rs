//! Access decisions
//!
//! Turns request headers and a target project into an [`Access`] verdict.
//! Every handler obtains its verdict here before touching a store.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::debug;

use crate::auth::identity::{
    CallerIdentity, MembershipProvider, Role, TokenVerifier, UserProvider,
};
use crate::error::{Error, Result};

/// What the caller wants to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Get or list
    Read,
    /// Create, patch, replace or delete
    Write,
}

/// Authorization verdict for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Platform administrator; no ownership checks
    Privileged,
    /// Member of `project` with `role`
    Scoped {
        /// Project the caller is a member of
        project: String,
        /// Role held in that project
        role: Role,
    },
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Authenticates callers and decides their access to a project
pub struct Authorizer {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserProvider>,
    memberships: Arc<dyn MembershipProvider>,
}

impl Authorizer {
    /// Create an authorizer
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        users: Arc<dyn UserProvider>,
        memberships: Arc<dyn MembershipProvider>,
    ) -> Self {
        Self {
            verifier,
            users,
            memberships,
        }
    }

    /// Identify the caller from the bearer token and their user record
    ///
    /// A missing or invalid token is `Unauthorized`; a valid token for an
    /// unknown user is `Forbidden`.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<CallerIdentity> {
        let token = extract_bearer_token(headers)
            .ok_or_else(|| Error::Unauthorized("missing Authorization header".into()))?;

        let claims = self.verifier.verify(token).await?;

        let user = self
            .users
            .user_by_email(&claims.email)
            .await?
            .ok_or_else(|| Error::Forbidden(format!("user {} is not registered", claims.email)))?;

        Ok(CallerIdentity {
            name: claims.name.unwrap_or(user.name),
            email: claims.email,
            is_admin: user.is_admin,
            groups: claims.groups,
        })
    }

    /// Decide what the caller may do in `project`
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        project: &str,
        action: Action,
    ) -> Result<Access> {
        let identity = self.authenticate(headers).await?;

        if identity.is_admin {
            debug!(user = %identity.email, project = %project, ?action, "Admin access");
            return Ok(Access::Privileged);
        }

        let group = self
            .memberships
            .group_in_project(&identity.email, project)
            .await?
            .ok_or_else(|| {
                Error::Forbidden(format!(
                    "user {} is not a member of project {}",
                    identity.email, project
                ))
            })?;

        let role = Role::from_group(&group, project).ok_or_else(|| {
            Error::Forbidden(format!(
                "group {} does not grant access to project {}",
                group, project
            ))
        })?;

        if action == Action::Write && !role.can_write() {
            return Err(Error::Forbidden(format!(
                "role {} is read-only in project {}",
                role, project
            )));
        }

        debug!(
            user = %identity.email,
            project = %project,
            role = %role,
            ?action,
            "Project access"
        );

        Ok(Access::Scoped {
            project: project.to_string(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::{
        MockMembershipProvider, MockTokenVerifier, MockUserProvider, TokenClaims,
    };
    use kubedash_common::crd::UserSpec;
    use mockall::predicate::eq;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", token).parse().unwrap());
        headers
    }

    fn verifier_for(email: &'static str) -> MockTokenVerifier {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().returning(move |_| {
            Ok(TokenClaims {
                email: email.to_string(),
                name: None,
                groups: vec![],
            })
        });
        verifier
    }

    fn users(is_admin: bool) -> MockUserProvider {
        let mut users = MockUserProvider::new();
        users.expect_user_by_email().returning(move |email| {
            Ok(Some(UserSpec {
                name: "Jane".to_string(),
                email: email.to_string(),
                is_admin,
            }))
        });
        users
    }

    fn memberships(group: Option<&'static str>) -> MockMembershipProvider {
        let mut memberships = MockMembershipProvider::new();
        memberships
            .expect_group_in_project()
            .returning(move |_, _| Ok(group.map(str::to_string)));
        memberships
    }

    fn authorizer(
        verifier: MockTokenVerifier,
        users: MockUserProvider,
        memberships: MockMembershipProvider,
    ) -> Authorizer {
        Authorizer::new(Arc::new(verifier), Arc::new(users), Arc::new(memberships))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&bearer("abc123")), Some("abc123"));
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);

        let mut basic = HeaderMap::new();
        basic.insert("Authorization", "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&basic), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().never();
        let mut users = MockUserProvider::new();
        users.expect_user_by_email().never();

        let authz = authorizer(verifier, users, MockMembershipProvider::new());
        let err = authz
            .authorize(&HeaderMap::new(), "p1", Action::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_admin_is_privileged_without_membership_lookup() {
        let mut memberships = MockMembershipProvider::new();
        memberships.expect_group_in_project().never();

        let authz = authorizer(verifier_for("root@example.com"), users(true), memberships);
        let access = authz
            .authorize(&bearer("t"), "p1", Action::Write)
            .await
            .unwrap();
        assert_eq!(access, Access::Privileged);
    }

    #[tokio::test]
    async fn test_member_is_scoped() {
        let mut memberships = MockMembershipProvider::new();
        memberships
            .expect_group_in_project()
            .with(eq("jane@example.com"), eq("p1"))
            .returning(|_, _| Ok(Some("editors-p1".to_string())));

        let authz = authorizer(verifier_for("jane@example.com"), users(false), memberships);
        let access = authz
            .authorize(&bearer("t"), "p1", Action::Write)
            .await
            .unwrap();
        assert_eq!(
            access,
            Access::Scoped {
                project: "p1".to_string(),
                role: Role::Editor
            }
        );
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        let authz = authorizer(
            verifier_for("jane@example.com"),
            users(false),
            memberships(None),
        );
        let err = authz
            .authorize(&bearer("t"), "p1", Action::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_viewer_cannot_write() {
        let authz = authorizer(
            verifier_for("jane@example.com"),
            users(false),
            memberships(Some("viewers-p1")),
        );

        assert!(authz
            .authorize(&bearer("t"), "p1", Action::Read)
            .await
            .is_ok());

        let err = authz
            .authorize(&bearer("t"), "p1", Action::Write)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unknown_user_is_forbidden() {
        let mut users = MockUserProvider::new();
        users.expect_user_by_email().returning(|_| Ok(None));

        let authz = authorizer(
            verifier_for("ghost@example.com"),
            users,
            MockMembershipProvider::new(),
        );
        let err = authz.authenticate(&bearer("t")).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(Error::Unauthorized("expired".into())));

        let authz = authorizer(verifier, MockUserProvider::new(), MockMembershipProvider::new());
        let err = authz.authenticate(&bearer("t")).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
