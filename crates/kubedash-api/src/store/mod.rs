//! Object store abstraction
//!
//! Handlers never talk to the Kubernetes API directly. They go through an
//! [`ObjectStore`], which addresses objects by [`Location`] (seed or user
//! cluster, plus namespace) and [`ApiResource`]. [`TypedStore`] layers typed
//! resources on top of the untyped store.

mod kubernetes;
mod memory;

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{ApiResource, DynamicObject};
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;

use kubedash_common::{Error, Result};

pub use kubernetes::{ClusterClients, KubeClusterClients, KubeStore};
pub use memory::MemoryStore;

/// Where an object lives
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// User cluster id, or `None` for the seed
    pub cluster: Option<String>,
    /// Namespace within that cluster
    pub namespace: String,
}

impl Location {
    /// A namespace on the seed
    pub fn seed(namespace: impl Into<String>) -> Self {
        Self {
            cluster: None,
            namespace: namespace.into(),
        }
    }

    /// A namespace inside a user cluster
    pub fn user_cluster(cluster: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster: Some(cluster.into()),
            namespace: namespace.into(),
        }
    }
}

/// Untyped namespaced object storage
///
/// Implementations report absence as a 404 and duplicates or stale writes
/// as a 409 through [`Error::status_code`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create an object; fails if one with the same name exists
    async fn create(
        &self,
        location: &Location,
        resource: &ApiResource,
        object: DynamicObject,
    ) -> Result<DynamicObject>;

    /// Fetch an object by name
    async fn get(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
    ) -> Result<DynamicObject>;

    /// List objects, optionally filtered by an equality label selector
    async fn list(
        &self,
        location: &Location,
        resource: &ApiResource,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>>;

    /// Replace an existing object
    ///
    /// When the object carries a resourceVersion, the write fails with a
    /// conflict if the stored object has moved on.
    async fn replace(
        &self,
        location: &Location,
        resource: &ApiResource,
        name: &str,
        object: DynamicObject,
    ) -> Result<DynamicObject>;

    /// Delete an object by name
    async fn delete(&self, location: &Location, resource: &ApiResource, name: &str) -> Result<()>;
}

/// Bounds for resources the dashboard reads and writes through a store
pub trait StoredResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredResource for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static
{
}

/// Typed view of an [`ObjectStore`] for one resource kind
pub struct TypedStore<K> {
    inner: Arc<dyn ObjectStore>,
    resource: ApiResource,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for TypedStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            resource: self.resource.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: StoredResource> TypedStore<K> {
    /// Wrap an untyped store
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self {
            inner,
            resource: ApiResource::erase::<K>(&()),
            _kind: PhantomData,
        }
    }

    /// Kind name used in log lines and error messages
    pub fn kind(&self) -> &str {
        &self.resource.kind
    }

    /// Create `object` at `location`; the object's namespace is set to the location's
    pub async fn create(&self, location: &Location, mut object: K) -> Result<K> {
        object.meta_mut().namespace = Some(location.namespace.clone());
        let created = self
            .inner
            .create(location, &self.resource, to_dynamic(&object)?)
            .await?;
        from_dynamic(created)
    }

    /// Fetch an object by name
    pub async fn get(&self, location: &Location, name: &str) -> Result<K> {
        from_dynamic(self.inner.get(location, &self.resource, name).await?)
    }

    /// List objects at `location`
    pub async fn list(&self, location: &Location, label_selector: Option<&str>) -> Result<Vec<K>> {
        self.inner
            .list(location, &self.resource, label_selector)
            .await?
            .into_iter()
            .map(from_dynamic)
            .collect()
    }

    /// Replace an existing object
    pub async fn replace(&self, location: &Location, name: &str, object: &K) -> Result<K> {
        let replaced = self
            .inner
            .replace(location, &self.resource, name, to_dynamic(object)?)
            .await?;
        from_dynamic(replaced)
    }

    /// Delete an object by name
    pub async fn delete(&self, location: &Location, name: &str) -> Result<()> {
        self.inner.delete(location, &self.resource, name).await
    }
}

fn to_dynamic<K: StoredResource>(object: &K) -> Result<DynamicObject> {
    let value = serde_json::to_value(object)
        .map_err(|e| Error::serialization_for_kind(K::kind(&()), e.to_string()))?;
    serde_json::from_value(value)
        .map_err(|e| Error::serialization_for_kind(K::kind(&()), e.to_string()))
}

fn from_dynamic<K: StoredResource>(object: DynamicObject) -> Result<K> {
    let value = serde_json::to_value(&object)
        .map_err(|e| Error::serialization_for_kind(K::kind(&()), e.to_string()))?;
    serde_json::from_value(value)
        .map_err(|e| Error::serialization_for_kind(K::kind(&()), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubedash_common::crd::{Backup, BackupSpec};

    fn store() -> TypedStore<Backup> {
        TypedStore::new(Arc::new(MemoryStore::new()))
    }

    fn backup(name: &str) -> Backup {
        Backup::new(
            name,
            BackupSpec {
                included_namespaces: vec!["default".to_string()],
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_typed_create_sets_namespace_and_server_fields() {
        let store = store();
        let location = Location::user_cluster("c1", "velero");

        let created = store.create(&location, backup("daily")).await.unwrap();
        assert_eq!(created.metadata.namespace.as_deref(), Some("velero"));
        assert!(created.metadata.uid.is_some());
        assert!(created.metadata.creation_timestamp.is_some());
        assert_eq!(created.spec.included_namespaces, vec!["default"]);
    }

    #[tokio::test]
    async fn test_typed_get_roundtrips_spec() {
        let store = store();
        let location = Location::user_cluster("c1", "velero");
        store.create(&location, backup("daily")).await.unwrap();

        let fetched = store.get(&location, "daily").await.unwrap();
        assert_eq!(fetched.spec, backup("daily").spec);
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(store().kind(), "Backup");
    }
}
