//! PolicyBinding custom resource
//!
//! Binds a policy template to a user cluster. Lives in the cluster's seed
//! namespace (`cluster-<id>`); the policy controller enforces the template
//! inside the user cluster and reports back through conditions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ConditionStatus, ObjectReference};

/// Namespace in the user cluster where the policy engine is installed
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KyvernoPolicyNamespace {
    /// Namespace name
    pub name: String,

    /// Labels applied to the namespace
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    /// Annotations applied to the namespace
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

/// Binding specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kubermatic.k8c.io",
    version = "v1",
    kind = "PolicyBinding",
    plural = "policybindings",
    namespaced,
    status = "PolicyBindingStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingSpec {
    /// Policy template to enforce
    pub policy_template_ref: ObjectReference,

    /// Namespace to install namespaced policies into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kyverno_policy_namespace: Option<KyvernoPolicyNamespace>,
}

/// A single binding condition
///
/// The condition type is the key of [`PolicyBindingStatus::conditions`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingCondition {
    /// Condition status
    #[serde(default)]
    pub status: ConditionStatus,

    /// Last time the condition was evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_time: Option<DateTime<Utc>>,

    /// Last time the status changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Binding status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBindingStatus {
    /// Generation last processed by the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Whether the template is enforced (cannot be removed by users)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_enforced: Option<bool>,

    /// Whether the policy is active in the user cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Conditions keyed by type; map order is not meaningful
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub conditions: HashMap<String, PolicyBindingCondition>,
}
