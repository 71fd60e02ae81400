//! Accessor for platform administrators

use async_trait::async_trait;
use kube::Resource;
use tracing::debug;

use kubedash_common::kube_utils::{project_selector, set_project_label};

use super::{ignore_not_found, patch_object, sort_by_name, Accessor, Mutation, Owner, Target};
use crate::error::Result;
use crate::store::{StoredResource, TypedStore};

/// Performs operations without ownership checks
///
/// Label-owned objects are still created with, and listed by, the target
/// project's label so that an admin sees the same project view as members.
pub struct PrivilegedAccessor<K> {
    store: TypedStore<K>,
}

impl<K: StoredResource> PrivilegedAccessor<K> {
    /// Create an accessor over `store`
    pub fn new(store: TypedStore<K>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<K: StoredResource> Accessor<K> for PrivilegedAccessor<K> {
    async fn create(&self, target: &Target, mut object: K) -> Result<K> {
        if target.owner == Owner::Labelled {
            set_project_label(object.meta_mut(), &target.project);
        }
        debug!(
            kind = %self.store.kind(),
            name = ?object.meta().name,
            project = %target.project,
            "Creating object (privileged)"
        );
        Ok(self.store.create(&target.location, object).await?)
    }

    async fn get(&self, target: &Target, name: &str) -> Result<K> {
        Ok(self.store.get(&target.location, name).await?)
    }

    async fn list(&self, target: &Target) -> Result<Vec<K>> {
        let selector = match target.owner {
            Owner::Labelled => Some(project_selector(&target.project)),
            Owner::Cluster(_) => None,
        };
        let mut objects = self
            .store
            .list(&target.location, selector.as_deref())
            .await?;
        sort_by_name(&mut objects);
        Ok(objects)
    }

    async fn delete(&self, target: &Target, name: &str) -> Result<()> {
        debug!(kind = %self.store.kind(), name = %name, "Deleting object (privileged)");
        ignore_not_found(
            self.store
                .delete(&target.location, name)
                .await
                .map_err(Into::into),
        )
    }

    async fn patch(&self, target: &Target, name: &str, mutation: Mutation<K>) -> Result<K> {
        patch_object(&self.store, target, name, mutation, None).await
    }
}
