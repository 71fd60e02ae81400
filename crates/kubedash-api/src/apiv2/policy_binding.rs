use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Policy template to enforce
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTemplateReference {
    /// Template name
    #[serde(default)]
    pub name: String,
    /// Template namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Namespace namespaced policies are installed into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyNamespace {
    /// Namespace name
    #[serde(default)]
    pub name: String,
    /// Namespace labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Namespace annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Binding of a policy template to a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingSpec {
    /// Template to enforce
    #[serde(default)]
    pub policy_template_ref: PolicyTemplateReference,
    /// Target namespace for namespaced policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyverno_policy_namespace: Option<PolicyNamespace>,
}

/// One binding condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub type_: String,
    /// `True`, `False` or `Unknown`
    pub status: String,
    /// Last evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_time: Option<DateTime<Utc>>,
    /// Last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Observed state of a binding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingStatus {
    /// Generation last processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Template cannot be removed by project members
    #[serde(default)]
    pub template_enforced: bool,
    /// Policy is active in the cluster
    #[serde(default)]
    pub active: bool,
    /// Conditions ordered by type
    #[serde(default)]
    pub conditions: Vec<PolicyBindingCondition>,
}

/// A policy binding on a user cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBinding {
    /// Binding name
    pub name: String,
    /// Server-assigned identifier
    pub id: String,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Desired binding
    pub spec: PolicyBindingSpec,
    /// Observed state
    pub status: PolicyBindingStatus,
}

/// Body of a create policy binding request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyBindingBody {
    /// Binding name
    #[serde(default)]
    pub name: String,
    /// Desired binding
    #[serde(default)]
    pub spec: PolicyBindingSpec,
}

/// Body of a patch policy binding request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPolicyBindingBody {
    /// New desired binding
    #[serde(default)]
    pub spec: Option<PolicyBindingSpec>,
}
