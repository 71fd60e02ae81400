//! Request decoding
//!
//! Path parameters are trimmed and must be non-empty. Bodies are read as raw
//! bytes and decoded here so malformed JSON and failed validation both come
//! back as the API's own error body. Nothing in this module touches a store
//! or looks at the caller.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use kubedash_common::kube_utils::validate_dns_subdomain;

use crate::apiv2::{
    CreateBackupStorageLocationBody, CreateClusterBackupBody, CreateClusterBackupScheduleBody,
    CreateClusterRestoreBody, CreatePolicyBindingBody, PatchBackupStorageLocationBody,
    PatchClusterBackupScheduleBody, PatchPolicyBindingBody, RuleGroupBody, S3Credentials,
};
use crate::error::{Error, Result};

/// Trimmed `value`, or `ParameterRequired(field)` when nothing is left
pub fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::ParameterRequired(field.to_string()))
    } else {
        Ok(value.to_string())
    }
}

/// Decode and validate a JSON request body
pub fn decode_body<T: DeserializeOwned + Validate>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::InvalidBody("request body is empty".to_string()));
    }
    let body: T = serde_json::from_slice(bytes).map_err(|e| Error::InvalidBody(e.to_string()))?;
    body.validate()?;
    Ok(body)
}

/// Path of a collection inside a user cluster
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterPath {
    /// Project id
    pub project: String,
    /// User cluster id
    pub cluster: String,
}

impl ClusterPath {
    /// Trimmed copy with every parameter present
    pub fn decode(self) -> Result<Self> {
        Ok(Self {
            project: required("project", &self.project)?,
            cluster: required("cluster", &self.cluster)?,
        })
    }
}

/// Path of one named object inside a user cluster
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterObjectPath {
    /// Project id
    pub project: String,
    /// User cluster id
    pub cluster: String,
    /// Object name
    pub name: String,
}

impl ClusterObjectPath {
    /// Trimmed copy with every parameter present
    pub fn decode(self) -> Result<Self> {
        Ok(Self {
            project: required("project", &self.project)?,
            cluster: required("cluster", &self.cluster)?,
            name: required("name", &self.name)?,
        })
    }
}

/// Path of a project-level collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectPath {
    /// Project id
    pub project: String,
}

impl ProjectPath {
    /// Trimmed copy with every parameter present
    pub fn decode(self) -> Result<Self> {
        Ok(Self {
            project: required("project", &self.project)?,
        })
    }
}

/// Path of one named project-level object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectObjectPath {
    /// Project id
    pub project: String,
    /// Object name
    pub name: String,
}

impl ProjectObjectPath {
    /// Trimmed copy with every parameter present
    pub fn decode(self) -> Result<Self> {
        Ok(Self {
            project: required("project", &self.project)?,
            name: required("name", &self.name)?,
        })
    }
}

/// Body-level checks run after a body decodes
pub trait Validate {
    /// `Validation` error describing the first problem found
    fn validate(&self) -> Result<()>;
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    validate_dns_subdomain(name).map_err(Error::Validation)
}

fn validate_cron(schedule: &str) -> Result<()> {
    if schedule.trim().is_empty() {
        Err(Error::Validation("schedule must not be empty".to_string()))
    } else {
        Ok(())
    }
}

fn validate_credentials(credentials: &S3Credentials) -> Result<()> {
    if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
        Err(Error::Validation(
            "credentials need an accessKeyId and a secretAccessKey".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Error for a storage location created without access keys
pub fn missing_credentials() -> Error {
    Error::Validation("credentials are required".to_string())
}

/// Longest backup name; Velero copies it into label values
pub const MAX_BACKUP_NAME_LENGTH: usize = 63;

impl Validate for CreateClusterBackupBody {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.name.len() > MAX_BACKUP_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "backup name must be no more than {} characters",
                MAX_BACKUP_NAME_LENGTH
            )));
        }
        Ok(())
    }
}

impl Validate for CreateClusterRestoreBody {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        let has_source = |source: &Option<String>| {
            source.as_deref().is_some_and(|s| !s.trim().is_empty())
        };
        if has_source(&self.spec.backup_name) || has_source(&self.spec.schedule_name) {
            Ok(())
        } else {
            Err(Error::Validation(
                "restore needs a backupName or a scheduleName".to_string(),
            ))
        }
    }
}

impl Validate for CreateClusterBackupScheduleBody {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_cron(&self.spec.schedule)
    }
}

impl Validate for PatchClusterBackupScheduleBody {
    fn validate(&self) -> Result<()> {
        match &self.schedule {
            Some(schedule) => validate_cron(schedule),
            None => Ok(()),
        }
    }
}

impl Validate for CreateBackupStorageLocationBody {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.spec.bucket.is_empty() {
            return Err(Error::Validation("bucket is required".to_string()));
        }
        let credentials = self.credentials.as_ref().ok_or_else(missing_credentials)?;
        validate_credentials(credentials)
    }
}

impl Validate for PatchBackupStorageLocationBody {
    fn validate(&self) -> Result<()> {
        if let Some(spec) = &self.spec {
            if spec.bucket.is_empty() {
                return Err(Error::Validation("bucket is required".to_string()));
            }
        }
        match &self.credentials {
            Some(credentials) => validate_credentials(credentials),
            None => Ok(()),
        }
    }
}

impl Validate for CreatePolicyBindingBody {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.spec.policy_template_ref.name.is_empty() {
            return Err(Error::Validation(
                "policyTemplateRef.name is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for PatchPolicyBindingBody {
    fn validate(&self) -> Result<()> {
        match &self.spec {
            Some(spec) if spec.policy_template_ref.name.is_empty() => Err(Error::Validation(
                "policyTemplateRef.name is required".to_string(),
            )),
            Some(_) => Ok(()),
            None => Err(Error::Validation("spec is required".to_string())),
        }
    }
}

impl Validate for RuleGroupBody {
    fn validate(&self) -> Result<()> {
        rule_group_name(self).map(|_| ())
    }
}

#[derive(Deserialize)]
struct RuleGroupDocument {
    #[serde(default)]
    name: String,
}

/// Name of a rule group, read from the `name` field of its YAML data
pub fn rule_group_name(body: &RuleGroupBody) -> Result<String> {
    let document: RuleGroupDocument = serde_yaml::from_slice(&body.data)
        .map_err(|e| Error::Validation(format!("rule group data is not valid YAML: {}", e)))?;
    if document.name.is_empty() {
        return Err(Error::Validation(
            "rule group data must have a name".to_string(),
        ));
    }
    validate_dns_subdomain(&document.name).map_err(Error::Validation)?;
    Ok(document.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apiv2::ClusterRestoreSpec;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("cluster", " c1 ").unwrap(), "c1");

        let err = required("cluster", "   ").unwrap_err();
        assert!(matches!(&err, Error::ParameterRequired(f) if f == "cluster"));
        assert_eq!(err.to_string(), "cluster parameter is required");
    }

    #[test]
    fn test_path_reports_first_missing_field() {
        let err = ClusterObjectPath {
            project: "p1".to_string(),
            cluster: "c1".to_string(),
            name: "\t".to_string(),
        }
        .decode()
        .unwrap_err();
        assert!(matches!(err, Error::ParameterRequired(f) if f == "name"));

        let err = ProjectPath {
            project: String::new(),
        }
        .decode()
        .unwrap_err();
        assert!(matches!(err, Error::ParameterRequired(f) if f == "project"));
    }

    #[test]
    fn test_malformed_and_empty_bodies_are_invalid() {
        let raws: [&[u8]; 5] = [b"", b"  ", b"{", b"[1,2]", br#"{"name": 5}"#];
        for raw in raws {
            let err = decode_body::<CreateClusterBackupBody>(raw).unwrap_err();
            assert!(matches!(err, Error::InvalidBody(_)), "{:?}", raw);
        }
    }

    #[test]
    fn test_backup_name_validation() {
        let err = decode_body::<CreateClusterBackupBody>(br#"{"spec": {}}"#).unwrap_err();
        assert!(matches!(&err, Error::Validation(m) if m == "name is required"));

        let err = decode_body::<CreateClusterBackupBody>(br#"{"name": "Daily_Backup"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let body = decode_body::<CreateClusterBackupBody>(
            br#"{"name": "daily-backup", "spec": {"includedNamespaces": ["default"]}}"#,
        )
        .unwrap();
        assert_eq!(body.spec.included_namespaces, vec!["default"]);
    }

    #[test]
    fn test_backup_name_fits_a_label_value() {
        let at_limit = "b".repeat(MAX_BACKUP_NAME_LENGTH);
        let body = serde_json::json!({"name": at_limit}).to_string();
        assert!(decode_body::<CreateClusterBackupBody>(body.as_bytes()).is_ok());

        let too_long = "b".repeat(MAX_BACKUP_NAME_LENGTH + 1);
        let body = serde_json::json!({"name": too_long}).to_string();
        let err = decode_body::<CreateClusterBackupBody>(body.as_bytes()).unwrap_err();
        assert!(matches!(&err, Error::Validation(m) if m.contains("63 characters")));
    }

    #[test]
    fn test_restore_needs_a_source() {
        let mut body = CreateClusterRestoreBody {
            name: "restore-1".to_string(),
            ..Default::default()
        };
        assert!(body.validate().is_err());

        body.spec = ClusterRestoreSpec {
            schedule_name: Some("nightly".to_string()),
            ..Default::default()
        };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_schedule_cron_required() {
        let err = decode_body::<CreateClusterBackupScheduleBody>(
            br#"{"name": "nightly", "spec": {"schedule": " "}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let patch: PatchClusterBackupScheduleBody =
            decode_body(br#"{"paused": true}"#).unwrap();
        assert_eq!(patch.paused, Some(true));
        assert!(decode_body::<PatchClusterBackupScheduleBody>(br#"{"schedule": ""}"#).is_err());
    }

    #[test]
    fn test_storage_location_requires_credentials() {
        let err = decode_body::<CreateBackupStorageLocationBody>(
            br#"{"name": "s3", "spec": {"bucket": "backups"}}"#,
        )
        .unwrap_err();
        assert!(matches!(&err, Error::Validation(m) if m == "credentials are required"));

        let body = decode_body::<CreateBackupStorageLocationBody>(
            br#"{"name": "s3", "spec": {"bucket": "backups"},
                "credentials": {"accessKeyId": "AKIA", "secretAccessKey": "s3cr3t"}}"#,
        )
        .unwrap();
        assert_eq!(body.credentials.unwrap().access_key_id, "AKIA");
    }

    #[test]
    fn test_rule_group_name_from_yaml() {
        let body = RuleGroupBody {
            data: b"name: cpu-alerts\nrules:\n- alert: HighCPU\n".to_vec(),
            ..Default::default()
        };
        assert_eq!(rule_group_name(&body).unwrap(), "cpu-alerts");

        let unnamed = RuleGroupBody {
            data: b"rules: []\n".to_vec(),
            ..Default::default()
        };
        assert!(matches!(rule_group_name(&unnamed), Err(Error::Validation(_))));

        let garbage = RuleGroupBody {
            data: b"name: [unclosed".to_vec(),
            ..Default::default()
        };
        assert!(matches!(garbage.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_patch_binding_requires_spec() {
        let err = decode_body::<PatchPolicyBindingBody>(b"{}").unwrap_err();
        assert!(matches!(&err, Error::Validation(m) if m == "spec is required"));
    }
}
