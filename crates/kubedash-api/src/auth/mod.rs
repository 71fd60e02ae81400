//! Authentication and authorization
//!
//! OIDC token verification, platform user and membership lookups, and the
//! admin-or-member access decision made for every request.

mod authorize;
mod identity;
mod oidc;

pub use authorize::{extract_bearer_token, Access, Action, Authorizer};
pub use identity::{
    CallerIdentity, KubeMembershipProvider, KubeUserProvider, MembershipProvider, Role,
    TokenClaims, TokenVerifier, UserProvider,
};
pub use oidc::{OidcConfig, OidcVerifier};

#[cfg(test)]
pub(crate) use identity::{MockMembershipProvider, MockTokenVerifier, MockUserProvider};
