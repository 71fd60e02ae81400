//! RuleGroup custom resource
//!
//! Alerting/recording rules deployed to the monitoring or logging stack of a
//! user cluster. The payload is an opaque YAML rule group document.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ObjectReference;

/// Which stack consumes the rule group
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum RuleGroupType {
    /// Prometheus-compatible metrics rules
    #[default]
    Metrics,
    /// Loki-compatible log rules
    Logs,
}

impl std::fmt::Display for RuleGroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metrics => write!(f, "Metrics"),
            Self::Logs => write!(f, "Logs"),
        }
    }
}

impl std::str::FromStr for RuleGroupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Metrics" => Ok(Self::Metrics),
            "Logs" => Ok(Self::Logs),
            other => Err(format!(
                "unknown rule group type {:?} (expected Metrics or Logs)",
                other
            )),
        }
    }
}

/// Rule group specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "kubermatic.k8c.io",
    version = "v1",
    kind = "RuleGroup",
    plural = "rulegroups",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroupSpec {
    /// Marks platform-provided default rule groups
    #[serde(default)]
    pub is_default: bool,

    /// Consuming stack
    pub rule_group_type: RuleGroupType,

    /// User cluster the rules apply to
    pub cluster: ObjectReference,

    /// Rule group YAML document
    #[serde(with = "super::base64_bytes")]
    #[schemars(with = "String")]
    pub data: Vec<u8>,
}
