use serde::{Deserialize, Serialize};

/// Stack consuming a rule group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleGroupType {
    /// Metrics rules
    #[default]
    Metrics,
    /// Log rules
    Logs,
}

/// Alerting or recording rules for a user cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    /// Rule group name, taken from the `name` field of `data`
    pub name: String,
    /// Platform default rule group
    pub is_default: bool,
    /// Consuming stack
    #[serde(rename = "type")]
    pub type_: RuleGroupType,
    /// Rule group YAML document, base64 encoded on the wire
    #[serde(with = "kubedash_common::crd::base64_bytes")]
    pub data: Vec<u8>,
}

/// Body of a create or replace rule group request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroupBody {
    /// Consuming stack
    #[serde(rename = "type")]
    pub type_: RuleGroupType,
    /// Platform default rule group
    #[serde(default)]
    pub is_default: bool,
    /// Rule group YAML document, base64 encoded on the wire
    #[serde(with = "kubedash_common::crd::base64_bytes")]
    pub data: Vec<u8>,
}

/// Query parameters of the list rule groups request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleGroupListQuery {
    /// Only return groups of this type
    #[serde(default, rename = "type")]
    pub type_: Option<RuleGroupType>,
}
