//! HTTP handlers
//!
//! Every handler runs the same pipeline: check the feature gate (backup
//! family only), decode the path and body, authorize, resolve an accessor
//! for the verdict, call it, convert the result. The first failing stage
//! produces the response.

pub mod backup;
pub mod policy_binding;
pub mod restore;
pub mod rule_group;
pub mod schedule;
pub mod storage_location;


use crate::error::Result;
use crate::server::AppState;
use crate::settings::require_cluster_backups;

/// Reject backup-family requests while the feature is turned off
async fn backup_gate(state: &AppState) -> Result<()> {
    require_cluster_backups(state.settings.as_ref()).await
}
