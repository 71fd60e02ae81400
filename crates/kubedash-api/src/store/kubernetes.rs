//! Kubernetes-backed object store
//!
//! Seed objects go through the shared seed client. User cluster objects go
//! through a client built per call from that cluster's admin kubeconfig
//! secret on the seed.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use kubedash_common::{
    cluster_namespace, Error, Result, ADMIN_KUBECONFIG_SECRET, KUBECONFIG_SECRET_KEY,
};

use super::{Location, ObjectStore};

/// Source of Kubernetes clients per cluster
#[async_trait]
pub trait ClusterClients: Send + Sync {
    /// Client for the seed (`None`) or a user cluster
    async fn client(&self, cluster: Option<&str>) -> Result<Client>;
}

/// Builds user cluster clients from the admin kubeconfig secrets on the seed
pub struct KubeClusterClients {
    seed: Client,
}

impl KubeClusterClients {
    /// Create a client source around the seed client
    pub fn new(seed: Client) -> Self {
        Self { seed }
    }

    async fn user_cluster_client(&self, cluster: &str) -> Result<Client> {
        let secrets: Api<Secret> = Api::namespaced(self.seed.clone(), &cluster_namespace(cluster));
        let secret = secrets
            .get(ADMIN_KUBECONFIG_SECRET)
            .await
            .map_err(|e| kubeconfig_secret_error(cluster, e))?;

        let raw = secret
            .data
            .as_ref()
            .and_then(|d| d.get(KUBECONFIG_SECRET_KEY))
            .ok_or_else(|| {
                Error::internal_with_context(
                    format!(
                        "secret {} has no {} key",
                        ADMIN_KUBECONFIG_SECRET, KUBECONFIG_SECRET_KEY
                    ),
                    "kubeconfig",
                )
            })?;

        let yaml = std::str::from_utf8(&raw.0).map_err(|e| {
            Error::internal_with_context(format!("kubeconfig is not UTF-8: {}", e), "kubeconfig")
        })?;
        let kubeconfig = Kubeconfig::from_yaml(yaml).map_err(|e| {
            Error::internal_with_context(format!("failed to parse kubeconfig: {}", e), "kubeconfig")
        })?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                Error::internal_with_context(
                    format!("failed to load kubeconfig: {}", e),
                    "kubeconfig",
                )
            })?;

        debug!(cluster = %cluster, "Built user cluster client");

        Client::try_from(config).map_err(|e| {
            Error::internal_with_context(format!("failed to create client: {}", e), "kubeconfig")
        })
    }
}

#[async_trait]
impl ClusterClients for KubeClusterClients {
    async fn client(&self, cluster: Option<&str>) -> Result<Client> {
        match cluster {
            None => Ok(self.seed.clone()),
            Some(id) => self.user_cluster_client(id).await,
        }
    }
}

/// A missing admin kubeconfig means the cluster itself does not exist
fn kubeconfig_secret_error(cluster: &str, error: kube::Error) -> Error {
    match error {
        kube::Error::Api(response) if response.code == 404 => Error::cluster_not_found(cluster),
        other => other.into(),
    }
}

/// [`ObjectStore`] backed by the Kubernetes API
pub struct KubeStore {
    clients: Arc<dyn ClusterClients>,
}

impl KubeStore {
    /// Create a store resolving clients through `clients`
    pub fn new(clients: Arc<dyn ClusterClients>) -> Self {
        Self { clients }
    }

    async fn api(&self, location: &Location, resource: &ApiResource) -> Result<Api<DynamicObject>> {
        let client = self.clients.client(location.cluster.as_deref()).await?;
        Ok(Api::namespaced_with(client, &location.namespace, resource))
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn create(
        &self,
        location: &Location,
        resource: &ApiResource,
        object: DynamicObject,
    ) -> Result<DynamicObject> {
        let api = self.api(location, resource).await?;
        Ok(api.create(&PostParams::default(), &object).await?)
    }

    async fn get(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
    ) -> Result<DynamicObject> {
        let api = self.api(location, resource).await?;
        Ok(api.get(name).await?)
    }

    async fn list(
        &self,
        location: &Location,
        resource: &ApiResource,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        let api = self.api(location, resource).await?;
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };
        Ok(api.list(&params).await?.items)
    }

    async fn replace(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
        object: DynamicObject,
    ) -> Result<DynamicObject> {
        let api = self.api(location, resource).await?;
        Ok(api.replace(name, &PostParams::default(), &object).await?)
    }

    async fn delete(&self, location: &Location, resource: &ApiResource, name: &str) -> Result<()> {
        let api = self.api(location, resource).await?;
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: String::new(),
            code,
        })
    }

    #[test]
    fn test_missing_kubeconfig_names_the_cluster() {
        let err = kubeconfig_secret_error(
            "c9",
            api_error(404, "secrets \"admin-kubeconfig\" not found"),
        );
        assert_eq!(err.to_string(), "cluster \"c9\" not found");
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_other_secret_errors_pass_through() {
        let err = kubeconfig_secret_error("c1", api_error(403, "forbidden"));
        assert_eq!(err.status_code(), Some(403));
    }
}
