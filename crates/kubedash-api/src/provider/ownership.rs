//! Which project a user cluster belongs to

use async_trait::async_trait;
use kube::api::Api;
use kube::Client;

#[cfg(test)]
use mockall::automock;

use kubedash_common::crd::Cluster;
use kubedash_common::kube_utils::project_of;

/// Resolves the owning project of a user cluster
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterOwnership: Send + Sync {
    /// Owning project, or `None` if the cluster is absent or unlabelled
    async fn project_of_cluster(&self, cluster: &str) -> kubedash_common::Result<Option<String>>;
}

/// [`ClusterOwnership`] reading the `project-id` label of seed `Cluster` objects
pub struct KubeClusterOwnership {
    client: Client,
}

impl KubeClusterOwnership {
    /// Create a resolver using the seed client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterOwnership for KubeClusterOwnership {
    async fn project_of_cluster(&self, cluster: &str) -> kubedash_common::Result<Option<String>> {
        let api: Api<Cluster> = Api::all(self.client.clone());
        Ok(api
            .get_opt(cluster)
            .await?
            .and_then(|c| project_of(&c.metadata).map(str::to_string)))
    }
}
