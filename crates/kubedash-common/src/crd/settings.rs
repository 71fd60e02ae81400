//! Platform-wide settings

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Global settings specification
///
/// A single object named `globalsettings` exists per platform.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kubermatic.k8c.io",
    version = "v1",
    kind = "KubermaticSetting",
    plural = "kubermaticsettings"
)]
#[serde(rename_all = "camelCase")]
pub struct SettingSpec {
    /// Enables the cluster backup family of endpoints
    #[serde(default)]
    pub enable_cluster_backups: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_settings_ignored() {
        let spec: SettingSpec = serde_json::from_value(serde_json::json!({
            "enableClusterBackups": true,
            "customLinks": []
        }))
        .unwrap();
        assert!(spec.enable_cluster_backups);
    }
}
