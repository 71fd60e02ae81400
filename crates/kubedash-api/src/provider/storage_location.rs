//! Storage locations and their credential secrets
//!
//! Each ClusterBackupStorageLocation references a Secret named
//! `<location>-credentials` whose `cloud` key holds an AWS-style credentials
//! profile. The two are created, replaced and deleted together.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use tracing::{info, warn};

use kubedash_common::crd::{ClusterBackupStorageLocation, SecretKeySelector};

use super::{ignore_not_found, Accessor, Mutation, Target};
use crate::error::Result;

/// Secret data key holding the credentials profile
pub const CREDENTIALS_SECRET_KEY: &str = "cloud";

/// Name of the credentials secret for `location`
pub fn credentials_secret_name(location: &str) -> String {
    format!("{}-credentials", location)
}

fn credential_selector(location: &str) -> SecretKeySelector {
    SecretKeySelector {
        name: credentials_secret_name(location),
        key: CREDENTIALS_SECRET_KEY.to_string(),
    }
}

/// Object storage access keys
#[derive(Clone, PartialEq, Eq)]
pub struct CloudCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
}

impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl CloudCredentials {
    /// Credentials file contents in the AWS shared credentials format
    pub fn to_profile(&self) -> String {
        format!(
            "[default]\naws_access_key_id={}\naws_secret_access_key={}\n",
            self.access_key_id, self.secret_access_key
        )
    }

    fn secret_data(&self) -> BTreeMap<String, ByteString> {
        let mut data = BTreeMap::new();
        data.insert(
            CREDENTIALS_SECRET_KEY.to_string(),
            ByteString(self.to_profile().into_bytes()),
        );
        data
    }

    fn to_secret(&self, location: &str) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(credentials_secret_name(location)),
                ..Default::default()
            },
            data: Some(self.secret_data()),
            type_: Some("Opaque".to_string()),
            ..Default::default()
        }
    }
}

/// Accessor for storage locations that keeps credential secrets in step
pub struct StorageLocationProvider {
    locations: Box<dyn Accessor<ClusterBackupStorageLocation>>,
    secrets: Box<dyn Accessor<Secret>>,
}

impl StorageLocationProvider {
    /// Combine location and secret accessors of the same access level
    pub fn new(
        locations: Box<dyn Accessor<ClusterBackupStorageLocation>>,
        secrets: Box<dyn Accessor<Secret>>,
    ) -> Self {
        Self { locations, secrets }
    }

    /// Create the credentials secret, then the location referencing it
    ///
    /// The secret is removed again if the location cannot be created.
    pub async fn create(
        &self,
        target: &Target,
        mut location: ClusterBackupStorageLocation,
        credentials: &CloudCredentials,
    ) -> Result<ClusterBackupStorageLocation> {
        let name = location.name_any();
        self.secrets
            .create(target, credentials.to_secret(&name))
            .await?;

        location.spec.credential = Some(credential_selector(&name));
        match self.locations.create(target, location).await {
            Ok(created) => {
                info!(location = %name, project = %target.project, "Created storage location");
                Ok(created)
            }
            Err(e) => {
                if let Err(cleanup) = self
                    .secrets
                    .delete(target, &credentials_secret_name(&name))
                    .await
                {
                    warn!(location = %name, error = %cleanup, "Failed to remove credentials secret");
                }
                Err(e)
            }
        }
    }

    /// Fetch a location by name
    pub async fn get(&self, target: &Target, name: &str) -> Result<ClusterBackupStorageLocation> {
        self.locations.get(target, name).await
    }

    /// All locations of the target project, ordered by name
    pub async fn list(&self, target: &Target) -> Result<Vec<ClusterBackupStorageLocation>> {
        self.locations.list(target).await
    }

    /// Apply `mutation` to the location and optionally replace its credentials
    ///
    /// Credentials are written before the location, so a failed secret write
    /// leaves the location untouched. The location keeps referencing its
    /// credentials secret whatever the mutation does to `spec.credential`.
    pub async fn patch(
        &self,
        target: &Target,
        name: &str,
        mutation: Mutation<ClusterBackupStorageLocation>,
        credentials: Option<&CloudCredentials>,
    ) -> Result<ClusterBackupStorageLocation> {
        if let Some(credentials) = credentials {
            self.locations.get(target, name).await?;
            self.replace_credentials(target, name, credentials).await?;
        }

        let link = credential_selector(name);
        self.locations
            .patch(
                target,
                name,
                Box::new(move |location: &mut ClusterBackupStorageLocation| {
                    mutation(location);
                    location.spec.credential = Some(link);
                }),
            )
            .await
    }

    async fn replace_credentials(
        &self,
        target: &Target,
        name: &str,
        credentials: &CloudCredentials,
    ) -> Result<()> {
        let data = credentials.secret_data();
        let replaced = self
            .secrets
            .patch(
                target,
                &credentials_secret_name(name),
                Box::new(move |secret: &mut Secret| secret.data = Some(data)),
            )
            .await;
        match replaced {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                self.secrets
                    .create(target, credentials.to_secret(name))
                    .await?;
            }
            Err(e) => return Err(e),
        }
        info!(location = %name, "Replaced storage location credentials");
        Ok(())
    }

    /// Delete the location and its credentials secret
    pub async fn delete(&self, target: &Target, name: &str) -> Result<()> {
        self.locations.delete(target, name).await?;
        ignore_not_found(
            self.secrets
                .delete(target, &credentials_secret_name(name))
                .await,
        )
    }
}
