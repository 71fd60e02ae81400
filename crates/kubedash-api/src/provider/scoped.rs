//! Accessor for project members
//!
//! Every operation first checks that the target belongs to the bound
//! project: cluster-owned targets through the cluster's project label,
//! label-owned objects through their own `project-id` label.

use std::sync::Arc;

use async_trait::async_trait;
use kube::Resource;
use tracing::debug;

use kubedash_common::kube_utils::{project_selector, set_project_label};

use super::{
    ensure_labelled, ignore_not_found, patch_object, sort_by_name, Accessor, ClusterOwnership,
    Mutation, Owner, Target,
};
use crate::error::{Error, Result};
use crate::store::{StoredResource, TypedStore};

/// Performs operations only within one project
pub struct ScopedAccessor<K> {
    store: TypedStore<K>,
    ownership: Arc<dyn ClusterOwnership>,
    project: String,
}

impl<K: StoredResource> ScopedAccessor<K> {
    /// Create an accessor limited to `project`
    pub fn new(store: TypedStore<K>, ownership: Arc<dyn ClusterOwnership>, project: String) -> Self {
        Self {
            store,
            ownership,
            project,
        }
    }

    /// Reject targets outside the bound project before any store call
    async fn check_target(&self, target: &Target) -> Result<()> {
        if target.project != self.project {
            return Err(Error::Forbidden(format!(
                "access is limited to project {}",
                self.project
            )));
        }

        if let Owner::Cluster(cluster) = &target.owner {
            let owner = self.ownership.project_of_cluster(cluster).await?;
            if owner.as_deref() != Some(self.project.as_str()) {
                debug!(
                    cluster = %cluster,
                    project = %self.project,
                    owner = ?owner,
                    "Cluster ownership check failed"
                );
                return Err(Error::Forbidden(format!(
                    "cluster {} does not belong to project {}",
                    cluster, self.project
                )));
            }
        }

        Ok(())
    }

    fn check_object(&self, target: &Target, object: &K) -> Result<()> {
        match target.owner {
            Owner::Labelled => ensure_labelled(object, self.store.kind(), &self.project),
            Owner::Cluster(_) => Ok(()),
        }
    }
}

#[async_trait]
impl<K: StoredResource> Accessor<K> for ScopedAccessor<K> {
    async fn create(&self, target: &Target, mut object: K) -> Result<K> {
        self.check_target(target).await?;
        if target.owner == Owner::Labelled {
            set_project_label(object.meta_mut(), &self.project);
        }
        Ok(self.store.create(&target.location, object).await?)
    }

    async fn get(&self, target: &Target, name: &str) -> Result<K> {
        self.check_target(target).await?;
        let object = self.store.get(&target.location, name).await?;
        self.check_object(target, &object)?;
        Ok(object)
    }

    async fn list(&self, target: &Target) -> Result<Vec<K>> {
        self.check_target(target).await?;
        let selector = match target.owner {
            Owner::Labelled => Some(project_selector(&self.project)),
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
        self.check_target(target).await?;

        if target.owner == Owner::Labelled {
            match self.store.get(&target.location, name).await {
                Ok(object) => self.check_object(target, &object)?,
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        ignore_not_found(
            self.store
                .delete(&target.location, name)
                .await
                .map_err(Into::into),
        )
    }

    async fn patch(&self, target: &Target, name: &str, mutation: Mutation<K>) -> Result<K> {
        self.check_target(target).await?;
        let required = match target.owner {
            Owner::Labelled => Some(self.project.as_str()),
            Owner::Cluster(_) => None,
        };
        patch_object(&self.store, target, name, mutation, required).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockClusterOwnership, PrivilegedAccessor};
    use crate::store::MemoryStore;
    use axum::http::StatusCode;
    use k8s_openapi::api::core::v1::Secret;
    use kube::api::ObjectMeta;
    use kubedash_common::crd::{Backup, BackupSpec};
    use mockall::predicate::eq;

    fn ownership(cluster: &'static str, project: Option<&'static str>) -> Arc<MockClusterOwnership> {
        let mut mock = MockClusterOwnership::new();
        mock.expect_project_of_cluster()
            .with(eq(cluster))
            .returning(move |_| Ok(project.map(str::to_string)));
        Arc::new(mock)
    }

    fn secret(name: &str) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_foreign_cluster_is_forbidden_before_store_access() {
        let store = Arc::new(MemoryStore::new());
        let admin = PrivilegedAccessor::<Backup>::new(TypedStore::new(store.clone()));
        let target = Target::user_cluster("p2", "c1");
        admin
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();

        let scoped = ScopedAccessor::<Backup>::new(
            TypedStore::new(store),
            ownership("c1", Some("p2")),
            "p1".to_string(),
        );
        let target = Target::user_cluster("p1", "c1");
        let err = scoped.get(&target, "b1").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_cluster_is_forbidden() {
        let scoped = ScopedAccessor::<Backup>::new(
            TypedStore::new(Arc::new(MemoryStore::new())),
            ownership("ghost", None),
            "p1".to_string(),
        );
        let err = scoped
            .list(&Target::user_cluster("p1", "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_other_project_target_is_forbidden() {
        let mut mock = MockClusterOwnership::new();
        mock.expect_project_of_cluster().never();
        let scoped = ScopedAccessor::<Secret>::new(
            TypedStore::new(Arc::new(MemoryStore::new())),
            Arc::new(mock),
            "p1".to_string(),
        );
        let err = scoped
            .list(&Target::project_labelled("p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_labelled_objects_are_isolated_by_project() {
        let store = Arc::new(MemoryStore::new());
        let admin = PrivilegedAccessor::<Secret>::new(TypedStore::new(store.clone()));
        admin
            .create(&Target::project_labelled("p2"), secret("p2-creds"))
            .await
            .unwrap();

        let scoped = ScopedAccessor::<Secret>::new(
            TypedStore::new(store),
            Arc::new(MockClusterOwnership::new()),
            "p1".to_string(),
        );
        let target = Target::project_labelled("p1");
        scoped.create(&target, secret("p1-creds")).await.unwrap();

        let names: Vec<_> = scoped
            .list(&target)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|s| s.metadata.name)
            .collect();
        assert_eq!(names, vec!["p1-creds"]);

        let err = scoped.get(&target, "p2-creds").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = scoped.delete(&target, "p2-creds").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = scoped
            .patch(&target, "p2-creds", Box::new(|_: &mut Secret| {}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let scoped = ScopedAccessor::<Secret>::new(
            TypedStore::new(Arc::new(MemoryStore::new())),
            Arc::new(MockClusterOwnership::new()),
            "p1".to_string(),
        );
        let target = Target::project_labelled("p1");
        scoped.create(&target, secret("creds")).await.unwrap();

        scoped.delete(&target, "creds").await.unwrap();
        scoped.delete(&target, "creds").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let scoped = ScopedAccessor::<Backup>::new(
            TypedStore::new(Arc::new(MemoryStore::new())),
            ownership("c1", Some("p1")),
            "p1".to_string(),
        );
        let target = Target::user_cluster("p1", "c1");
        scoped
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();

        let err = scoped
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
