//! Resource accessors
//!
//! An [`Accessor`] performs create/get/list/delete/patch for one resource
//! kind against a [`Target`]. The [`ProviderResolver`] picks the accessor
//! for an [`Access`] verdict: administrators get a [`PrivilegedAccessor`],
//! project members get a [`ScopedAccessor`] that checks ownership before
//! every store call.
//!
//! Accessors are built per request and never shared between requests.

mod backup;
mod ownership;
mod privileged;
mod scoped;
mod storage_location;

use std::sync::Arc;

use async_trait::async_trait;
use kube::Resource;

use kubedash_common::kube_utils::{is_owned_by_project, set_project_label};
use kubedash_common::{cluster_namespace, KUBERMATIC_NAMESPACE, VELERO_NAMESPACE};

use crate::auth::Access;
use crate::error::{Error, Result};
use crate::store::{Location, ObjectStore, StoredResource, TypedStore};

pub use backup::{deletion_request, ClusterBackupProvider};
pub use ownership::{ClusterOwnership, KubeClusterOwnership};
pub use privileged::PrivilegedAccessor;
pub use scoped::ScopedAccessor;
pub use storage_location::{
    credentials_secret_name, CloudCredentials, StorageLocationProvider, CREDENTIALS_SECRET_KEY,
};

#[cfg(test)]
pub(crate) use ownership::MockClusterOwnership;

/// How ownership of objects at a target is established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// Objects belong to whoever owns this user cluster
    Cluster(String),
    /// Objects carry a `project-id` label
    Labelled,
}

/// Where an operation applies and who owns what lives there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Project the request is made in
    pub project: String,
    /// Store location of the objects
    pub location: Location,
    /// Ownership rule for the objects
    pub owner: Owner,
}

impl Target {
    /// Velero objects inside a user cluster
    pub fn user_cluster(project: &str, cluster: &str) -> Self {
        Self {
            project: project.to_string(),
            location: Location::user_cluster(cluster, VELERO_NAMESPACE),
            owner: Owner::Cluster(cluster.to_string()),
        }
    }

    /// Objects in a user cluster's namespace on the seed
    pub fn cluster_namespace(project: &str, cluster: &str) -> Self {
        Self {
            project: project.to_string(),
            location: Location::seed(cluster_namespace(cluster)),
            owner: Owner::Cluster(cluster.to_string()),
        }
    }

    /// Project-labelled objects in the platform namespace on the seed
    pub fn project_labelled(project: &str) -> Self {
        Self {
            project: project.to_string(),
            location: Location::seed(KUBERMATIC_NAMESPACE),
            owner: Owner::Labelled,
        }
    }
}

/// In-place change applied to a freshly read copy of an object
pub type Mutation<K> = Box<dyn FnOnce(&mut K) + Send>;

/// CRUD operations for one resource kind
#[async_trait]
pub trait Accessor<K: StoredResource>: Send + Sync {
    /// Create `object`; an existing object with the same name is a conflict
    async fn create(&self, target: &Target, object: K) -> Result<K>;

    /// Fetch an object by name
    async fn get(&self, target: &Target, name: &str) -> Result<K>;

    /// All visible objects, ordered by name
    async fn list(&self, target: &Target) -> Result<Vec<K>>;

    /// Delete an object; deleting an absent object succeeds
    async fn delete(&self, target: &Target, name: &str) -> Result<()>;

    /// Read, apply `mutation` to a copy, and write it back
    async fn patch(&self, target: &Target, name: &str, mutation: Mutation<K>) -> Result<K>;
}

/// Builds accessors for an access verdict
pub struct ProviderResolver {
    store: Arc<dyn ObjectStore>,
    ownership: Arc<dyn ClusterOwnership>,
}

impl ProviderResolver {
    /// Create a resolver over `store`
    pub fn new(store: Arc<dyn ObjectStore>, ownership: Arc<dyn ClusterOwnership>) -> Self {
        Self { store, ownership }
    }

    /// Accessor for kind `K`
    pub fn resolve<K: StoredResource>(&self, access: &Access) -> Box<dyn Accessor<K>> {
        let store = TypedStore::new(self.store.clone());
        match access {
            Access::Privileged => Box::new(PrivilegedAccessor::new(store)),
            Access::Scoped { project, .. } => Box::new(ScopedAccessor::new(
                store,
                self.ownership.clone(),
                project.clone(),
            )),
        }
    }

    /// Backup accessor with soft deletion
    pub fn backups(&self, access: &Access) -> ClusterBackupProvider {
        ClusterBackupProvider::new(self.resolve(access), self.resolve(access))
    }

    /// Storage location accessor managing credential secrets
    pub fn storage_locations(&self, access: &Access) -> StorageLocationProvider {
        StorageLocationProvider::new(self.resolve(access), self.resolve(access))
    }
}

fn sort_by_name<K: Resource>(objects: &mut [K]) {
    objects.sort_by(|a, b| a.meta().name.cmp(&b.meta().name));
}

/// Treat a missing object as already deleted
fn ignore_not_found(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

fn ensure_labelled<K: StoredResource>(object: &K, kind: &str, project: &str) -> Result<()> {
    if is_owned_by_project(object.meta(), project) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "{} {} does not belong to project {}",
            kind,
            object.meta().name.as_deref().unwrap_or_default(),
            project
        )))
    }
}

/// Fresh read, mutate an owned copy, replace with the read's resourceVersion
///
/// With `required_project` set, the stored object must carry that project's
/// label. A write racing this one surfaces as a store conflict.
async fn patch_object<K: StoredResource>(
    store: &TypedStore<K>,
    target: &Target,
    name: &str,
    mutation: Mutation<K>,
    required_project: Option<&str>,
) -> Result<K> {
    let current = store.get(&target.location, name).await?;
    if let Some(project) = required_project {
        ensure_labelled(&current, store.kind(), project)?;
    }

    let mut updated = current.clone();
    mutation(&mut updated);

    let meta = updated.meta_mut();
    meta.name = Some(name.to_string());
    meta.namespace = current.meta().namespace.clone();
    meta.resource_version = current.meta().resource_version.clone();
    if target.owner == Owner::Labelled {
        set_project_label(meta, &target.project);
    }

    Ok(store.replace(&target.location, name, &updated).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::store::MemoryStore;
    use kubedash_common::crd::{RuleGroup, RuleGroupSpec};

    fn resolver_with(project_of_cluster: Option<&'static str>) -> ProviderResolver {
        let mut ownership = MockClusterOwnership::new();
        ownership
            .expect_project_of_cluster()
            .returning(move |_| Ok(project_of_cluster.map(str::to_string)));
        ProviderResolver::new(Arc::new(MemoryStore::new()), Arc::new(ownership))
    }

    fn rule_group(name: &str) -> RuleGroup {
        RuleGroup::new(name, RuleGroupSpec::default())
    }

    #[test]
    fn test_targets() {
        let t = Target::user_cluster("p1", "c1");
        assert_eq!(t.location, Location::user_cluster("c1", "velero"));
        assert_eq!(t.owner, Owner::Cluster("c1".to_string()));

        let t = Target::cluster_namespace("p1", "c1");
        assert_eq!(t.location, Location::seed("cluster-c1"));

        let t = Target::project_labelled("p1");
        assert_eq!(t.location, Location::seed("kubermatic"));
        assert_eq!(t.owner, Owner::Labelled);
    }

    #[tokio::test]
    async fn test_resolved_accessors_share_the_store() {
        let resolver = resolver_with(Some("p1"));
        let target = Target::cluster_namespace("p1", "c1");

        let admin = resolver.resolve::<RuleGroup>(&Access::Privileged);
        admin.create(&target, rule_group("cpu")).await.unwrap();

        let member = resolver.resolve::<RuleGroup>(&Access::Scoped {
            project: "p1".to_string(),
            role: Role::Editor,
        });
        let listed = member.list(&target).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_patch_keeps_identity() {
        let resolver = resolver_with(Some("p1"));
        let target = Target::cluster_namespace("p1", "c1");
        let accessor = resolver.resolve::<RuleGroup>(&Access::Privileged);
        let created = accessor.create(&target, rule_group("cpu")).await.unwrap();

        let patched = accessor
            .patch(
                &target,
                "cpu",
                Box::new(|rg: &mut RuleGroup| {
                    rg.spec.is_default = true;
                    rg.metadata.name = Some("renamed".to_string());
                }),
            )
            .await
            .unwrap();

        assert!(patched.spec.is_default);
        assert_eq!(patched.metadata.name.as_deref(), Some("cpu"));
        assert_eq!(patched.metadata.uid, created.metadata.uid);
    }

    #[test]
    fn test_ignore_not_found() {
        let missing: Result<()> = Err(kubedash_common::Error::not_found("Backup", "b").into());
        assert!(ignore_not_found(missing).is_ok());

        let conflict: Result<()> = Err(kubedash_common::Error::conflict("Backup", "b").into());
        assert!(ignore_not_found(conflict).is_err());

        let no_cluster: Result<()> = Err(kubedash_common::Error::cluster_not_found("c9").into());
        let err = ignore_not_found(no_cluster).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
