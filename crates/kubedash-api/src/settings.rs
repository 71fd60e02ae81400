//! Global settings and feature gates

use async_trait::async_trait;
use kube::api::Api;
use kube::Client;

#[cfg(test)]
use mockall::automock;

use kubedash_common::crd::{KubermaticSetting, SettingSpec};
use kubedash_common::GLOBAL_SETTINGS_NAME;

use crate::error::{Error, Result};

/// Reads the platform's global settings
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current global settings, or `None` if none are configured
    async fn global_settings(&self) -> kubedash_common::Result<Option<SettingSpec>>;
}

/// [`SettingsProvider`] reading the `globalsettings` object from the seed
pub struct KubeSettingsProvider {
    client: Client,
}

impl KubeSettingsProvider {
    /// Create a provider using the seed client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SettingsProvider for KubeSettingsProvider {
    async fn global_settings(&self) -> kubedash_common::Result<Option<SettingSpec>> {
        let api: Api<KubermaticSetting> = Api::all(self.client.clone());
        Ok(api.get_opt(GLOBAL_SETTINGS_NAME).await?.map(|s| s.spec))
    }
}

/// Fail with `FeatureDisabled` unless cluster backups are enabled
pub async fn require_cluster_backups(settings: &dyn SettingsProvider) -> Result<()> {
    let enabled = settings
        .global_settings()
        .await?
        .is_some_and(|s| s.enable_cluster_backups);

    if enabled {
        Ok(())
    } else {
        Err(Error::FeatureDisabled("cluster backup".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(spec: Option<SettingSpec>) -> MockSettingsProvider {
        let mut mock = MockSettingsProvider::new();
        mock.expect_global_settings()
            .returning(move || Ok(spec.clone()));
        mock
    }

    #[tokio::test]
    async fn test_enabled() {
        let mock = settings(Some(SettingSpec {
            enable_cluster_backups: true,
        }));
        assert!(require_cluster_backups(&mock).await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled() {
        let mock = settings(Some(SettingSpec {
            enable_cluster_backups: false,
        }));
        let err = require_cluster_backups(&mock).await.unwrap_err();
        assert_eq!(err.to_string(), "cluster backup feature is disabled");
    }

    #[tokio::test]
    async fn test_missing_settings_means_disabled() {
        let mock = settings(None);
        assert!(matches!(
            require_cluster_backups(&mock).await,
            Err(Error::FeatureDisabled(_))
        ));
    }
}
