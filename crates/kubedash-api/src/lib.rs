//! Kubedash dashboard API
//!
//! HTTP API for managing cluster backups, restores, backup schedules,
//! backup storage locations, policy bindings and rule groups of the user
//! clusters in a project.
//!
//! # Architecture
//!
//! ```text
//! request ──► feature gate ──► decode ──► authorize ──► accessor ──► store
//!                                          (admin or      (privileged
//!                                           member)        or scoped)
//! ```
//!
//! # Endpoints
//!
//! Everything lives under `/api/v2/projects/{project}`:
//!
//! - `clusters/{cluster}/backups[/{name}]` - Velero backups (gated)
//! - `clusters/{cluster}/restores[/{name}]` - Velero restores (gated)
//! - `clusters/{cluster}/backupschedules[/{name}]` - Velero schedules (gated)
//! - `backupstoragelocations[/{name}]` - object storage destinations (gated)
//! - `clusters/{cluster}/policybindings[/{name}]` - policy bindings
//! - `clusters/{cluster}/rulegroups[/{name}]` - alerting and recording rules
//!
//! Plus `GET /healthz`.

#![deny(missing_docs)]

pub mod apiv2;
pub mod auth;
pub mod convert;
pub mod decode;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod server;
pub mod settings;
pub mod store;

pub use auth::{Authorizer, OidcConfig, OidcVerifier};
pub use error::{Error, Result};
pub use provider::ProviderResolver;
pub use server::{router, start_server, AppState, ServerConfig, TlsConfig};
pub use settings::{KubeSettingsProvider, SettingsProvider};
