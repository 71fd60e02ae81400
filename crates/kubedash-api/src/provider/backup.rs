//! Backup accessor with soft deletion
//!
//! Velero removes a backup's data only when it processes a
//! DeleteBackupRequest, so deleting a backup records a request instead of
//! deleting the Backup object.

use std::collections::BTreeMap;

use async_trait::async_trait;
use kube::api::ObjectMeta;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use kubedash_common::crd::{Backup, DeleteBackupRequest, DeleteBackupRequestSpec};
use kubedash_common::{VELERO_BACKUP_NAME_LABEL, VELERO_BACKUP_UID_LABEL};

use super::{Accessor, Mutation, Target};
use crate::error::Result;

/// Name of the deletion request for one incarnation of a backup
///
/// Processed requests outlive their backup, so the name carries a uid
/// prefix to keep a recreated backup of the same name distinct.
pub fn deletion_request_name(backup: &Backup) -> String {
    let name = backup.name_any();
    match backup.uid() {
        Some(uid) => {
            let short = uid.get(..8).unwrap_or(&uid);
            format!("{}-delete-{}", name, short)
        }
        None => format!("{}-delete", name),
    }
}

/// DeleteBackupRequest recording the intent to delete `backup`
pub fn deletion_request(backup: &Backup) -> DeleteBackupRequest {
    let name = backup.name_any();

    let mut labels = BTreeMap::new();
    labels.insert(VELERO_BACKUP_NAME_LABEL.to_string(), name.clone());
    if let Some(uid) = backup.uid() {
        labels.insert(VELERO_BACKUP_UID_LABEL.to_string(), uid);
    }

    DeleteBackupRequest {
        metadata: ObjectMeta {
            name: Some(deletion_request_name(backup)),
            labels: Some(labels),
            ..Default::default()
        },
        spec: DeleteBackupRequestSpec { backup_name: name },
        status: None,
    }
}

/// [`Accessor`] for backups whose delete files a deletion request
pub struct ClusterBackupProvider {
    backups: Box<dyn Accessor<Backup>>,
    requests: Box<dyn Accessor<DeleteBackupRequest>>,
}

impl ClusterBackupProvider {
    /// Combine a backup accessor with a deletion request accessor of the same access level
    pub fn new(
        backups: Box<dyn Accessor<Backup>>,
        requests: Box<dyn Accessor<DeleteBackupRequest>>,
    ) -> Self {
        Self { backups, requests }
    }

    /// Succeed only if the request already on file is for this incarnation of `backup`
    async fn check_existing_request(&self, target: &Target, backup: &Backup) -> Result<()> {
        let name = backup.name_any();
        let existing = self
            .requests
            .get(target, &deletion_request_name(backup))
            .await?;
        let filed_for = existing.labels().get(VELERO_BACKUP_UID_LABEL).cloned();
        if filed_for == backup.uid() {
            debug!(backup = %name, "Backup deletion already requested");
            return Ok(());
        }

        warn!(
            backup = %name,
            request = %existing.name_any(),
            filed_for = ?filed_for,
            "Deletion request on file belongs to another backup"
        );
        Err(kubedash_common::Error::already_exists("DeleteBackupRequest", existing.name_any())
            .into())
    }
}

#[async_trait]
impl Accessor<Backup> for ClusterBackupProvider {
    async fn create(&self, target: &Target, object: Backup) -> Result<Backup> {
        self.backups.create(target, object).await
    }

    async fn get(&self, target: &Target, name: &str) -> Result<Backup> {
        self.backups.get(target, name).await
    }

    async fn list(&self, target: &Target) -> Result<Vec<Backup>> {
        self.backups.list(target).await
    }

    async fn delete(&self, target: &Target, name: &str) -> Result<()> {
        let backup = match self.backups.get(target, name).await {
            Ok(backup) => backup,
            Err(e) if e.is_not_found() => {
                debug!(backup = %name, "Backup already gone");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match self
            .requests
            .create(target, deletion_request(&backup))
            .await
        {
            Ok(_) => {
                info!(backup = %name, project = %target.project, "Requested backup deletion");
                Ok(())
            }
            Err(e) if e.is_conflict() => self.check_existing_request(target, &backup).await,
            Err(e) => Err(e),
        }
    }

    async fn patch(&self, target: &Target, name: &str, mutation: Mutation<Backup>) -> Result<Backup> {
        self.backups.patch(target, name, mutation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Access, Role};
    use crate::provider::{MockClusterOwnership, ProviderResolver};
    use crate::store::MemoryStore;
    use kubedash_common::crd::BackupSpec;
    use std::sync::Arc;

    fn resolver() -> ProviderResolver {
        let mut ownership = MockClusterOwnership::new();
        ownership
            .expect_project_of_cluster()
            .returning(|_| Ok(Some("p1".to_string())));
        ProviderResolver::new(Arc::new(MemoryStore::new()), Arc::new(ownership))
    }

    fn member() -> Access {
        Access::Scoped {
            project: "p1".to_string(),
            role: Role::Owner,
        }
    }

    fn request_uids(requests: &[DeleteBackupRequest]) -> Vec<Option<String>> {
        requests
            .iter()
            .map(|r| r.labels().get(VELERO_BACKUP_UID_LABEL).cloned())
            .collect()
    }

    #[test]
    fn test_deletion_request_links_backup() {
        let mut backup = Backup::new("daily-backup", BackupSpec::default());
        backup.metadata.uid = Some("5f0c81d2-7a4e-4f0b-9b1e-2c3d4e5f6a7b".to_string());

        let request = deletion_request(&backup);
        assert_eq!(
            request.metadata.name.as_deref(),
            Some("daily-backup-delete-5f0c81d2")
        );
        assert_eq!(request.spec.backup_name, "daily-backup");
        let labels = request.metadata.labels.unwrap();
        assert_eq!(labels["velero.io/backup-name"], "daily-backup");
        assert_eq!(labels["velero.io/backup-uid"], "5f0c81d2-7a4e-4f0b-9b1e-2c3d4e5f6a7b");
    }

    #[test]
    fn test_deletion_request_name_without_uid() {
        let backup = Backup::new("daily-backup", BackupSpec::default());
        assert_eq!(deletion_request_name(&backup), "daily-backup-delete");

        let mut short = Backup::new("b1", BackupSpec::default());
        short.metadata.uid = Some("5f0c".to_string());
        assert_eq!(deletion_request_name(&short), "b1-delete-5f0c");
    }

    #[tokio::test]
    async fn test_delete_files_request_and_keeps_backup() {
        let resolver = resolver();
        let target = Target::user_cluster("p1", "c1");
        let backups = resolver.backups(&member());
        let created = backups
            .create(&target, Backup::new("daily-backup", BackupSpec::default()))
            .await
            .unwrap();

        backups.delete(&target, "daily-backup").await.unwrap();

        let requests = resolver.resolve::<DeleteBackupRequest>(&member());
        let filed = requests
            .get(&target, &deletion_request_name(&created))
            .await
            .unwrap();
        assert_eq!(filed.spec.backup_name, "daily-backup");
        assert!(backups.get(&target, "daily-backup").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_twice_succeeds() {
        let resolver = resolver();
        let target = Target::user_cluster("p1", "c1");
        let backups = resolver.backups(&Access::Privileged);
        backups
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();

        backups.delete(&target, "b1").await.unwrap();
        backups.delete(&target, "b1").await.unwrap();

        let requests = resolver
            .resolve::<DeleteBackupRequest>(&Access::Privileged)
            .list(&target)
            .await
            .unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_recreated_backup_gets_its_own_request() {
        let resolver = resolver();
        let target = Target::user_cluster("p1", "c1");
        let backups = resolver.backups(&Access::Privileged);

        let first = backups
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();
        backups.delete(&target, "b1").await.unwrap();

        // Velero removes the Backup and keeps the processed request
        resolver
            .resolve::<Backup>(&Access::Privileged)
            .delete(&target, "b1")
            .await
            .unwrap();

        let second = backups
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();
        assert_ne!(first.uid(), second.uid());
        backups.delete(&target, "b1").await.unwrap();

        let requests = resolver
            .resolve::<DeleteBackupRequest>(&Access::Privileged)
            .list(&target)
            .await
            .unwrap();
        let uids = request_uids(&requests);
        assert_eq!(uids.len(), 2);
        assert!(uids.contains(&first.uid()));
        assert!(uids.contains(&second.uid()));
    }

    #[tokio::test]
    async fn test_request_for_another_backup_is_conflict() {
        let resolver = resolver();
        let target = Target::user_cluster("p1", "c1");
        let backups = resolver.backups(&Access::Privileged);
        let backup = backups
            .create(&target, Backup::new("b1", BackupSpec::default()))
            .await
            .unwrap();

        let mut foreign = deletion_request(&backup);
        foreign
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(VELERO_BACKUP_UID_LABEL.to_string(), "another-uid".to_string());
        resolver
            .resolve::<DeleteBackupRequest>(&Access::Privileged)
            .create(&target, foreign)
            .await
            .unwrap();

        let err = backups.delete(&target, "b1").await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_missing_backup_succeeds() {
        let backups = resolver().backups(&Access::Privileged);
        backups
            .delete(&Target::user_cluster("p1", "c1"), "absent")
            .await
            .unwrap();
    }
}
