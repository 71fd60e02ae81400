//! Kubernetes helpers shared across kubedash crates
//!
//! Label conventions for project ownership and name validation for
//! objects created on behalf of API callers.

use kube::api::ObjectMeta;

use crate::PROJECT_ID_LABEL;

/// Maximum length of a DNS-1123 subdomain
const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;

/// Label selector matching every object owned by `project`
pub fn project_selector(project: &str) -> String {
    format!("{}={}", PROJECT_ID_LABEL, project)
}

/// Project recorded on an object's `project-id` label, if any
pub fn project_of(metadata: &ObjectMeta) -> Option<&str> {
    metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(PROJECT_ID_LABEL))
        .map(String::as_str)
}

/// Check whether an object is labelled as owned by `project`
pub fn is_owned_by_project(metadata: &ObjectMeta, project: &str) -> bool {
    project_of(metadata) == Some(project)
}

/// Set the `project-id` label on an object, replacing any existing value
pub fn set_project_label(metadata: &mut ObjectMeta, project: &str) {
    metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(PROJECT_ID_LABEL.to_string(), project.to_string());
}

/// Validate a Kubernetes object name (DNS-1123 subdomain).
///
/// Rules:
/// - Must not be empty or longer than 253 characters
/// - Lowercase alphanumerics, '-' and '.'
/// - Must start and end with an alphanumeric character
pub fn validate_dns_subdomain(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".to_string());
    }

    if name.len() > DNS1123_SUBDOMAIN_MAX_LEN {
        return Err(format!(
            "name must be no more than {} characters: {}",
            DNS1123_SUBDOMAIN_MAX_LEN, name
        ));
    }

    let valid_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.';
    if !name.chars().all(valid_char) {
        return Err(format!(
            "name must consist of lowercase alphanumeric characters, '-' or '.': {}",
            name
        ));
    }

    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let starts = name.chars().next().map(alnum).unwrap_or(false);
    let ends = name.chars().last().map(alnum).unwrap_or(false);
    if !starts || !ends {
        return Err(format!(
            "name must start and end with an alphanumeric character: {}",
            name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn meta_with_labels(labels: &[(&str, &str)]) -> ObjectMeta {
        ObjectMeta {
            name: Some("test".to_string()),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_selector() {
        assert_eq!(project_selector("abc123"), "project-id=abc123");
    }

    #[test]
    fn test_is_owned_by_project() {
        let meta = meta_with_labels(&[("project-id", "p1")]);
        assert!(is_owned_by_project(&meta, "p1"));
        assert!(!is_owned_by_project(&meta, "p2"));
    }

    #[test]
    fn test_unlabelled_object_is_not_owned() {
        let meta = ObjectMeta::default();
        assert!(project_of(&meta).is_none());
        assert!(!is_owned_by_project(&meta, "p1"));
    }

    #[test]
    fn test_set_project_label_overrides_caller_value() {
        let mut meta = meta_with_labels(&[("project-id", "other"), ("team", "infra")]);
        set_project_label(&mut meta, "p1");
        let labels = meta.labels.unwrap();
        assert_eq!(labels.get("project-id").map(String::as_str), Some("p1"));
        assert_eq!(labels.get("team").map(String::as_str), Some("infra"));
    }

    #[test]
    fn test_set_project_label_without_labels() {
        let mut meta = ObjectMeta::default();
        set_project_label(&mut meta, "p1");
        assert!(is_owned_by_project(&meta, "p1"));
    }

    #[test]
    fn test_validate_dns_subdomain_valid() {
        assert!(validate_dns_subdomain("daily-backup").is_ok());
        assert!(validate_dns_subdomain("a").is_ok());
        assert!(validate_dns_subdomain("backup.v2").is_ok());
        assert!(validate_dns_subdomain("0day").is_ok());
    }

    #[test]
    fn test_validate_dns_subdomain_invalid() {
        assert!(validate_dns_subdomain("").is_err());
        assert!(validate_dns_subdomain("Daily").is_err());
        assert!(validate_dns_subdomain("-backup").is_err());
        assert!(validate_dns_subdomain("backup-").is_err());
        assert!(validate_dns_subdomain("my_backup").is_err());
        assert!(validate_dns_subdomain(&"a".repeat(254)).is_err());
    }
}
