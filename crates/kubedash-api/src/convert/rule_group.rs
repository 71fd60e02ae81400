//! RuleGroup ↔ RuleGroup custom resource

use kubedash_common::crd::{self, ObjectReference, RuleGroup as StoredRuleGroup, RuleGroupSpec};

use crate::apiv2::{RuleGroup, RuleGroupBody, RuleGroupType};

/// External form of a stored type
pub fn type_to_external(type_: crd::RuleGroupType) -> RuleGroupType {
    match type_ {
        crd::RuleGroupType::Metrics => RuleGroupType::Metrics,
        crd::RuleGroupType::Logs => RuleGroupType::Logs,
    }
}

fn type_to_internal(type_: RuleGroupType) -> crd::RuleGroupType {
    match type_ {
        RuleGroupType::Metrics => crd::RuleGroupType::Metrics,
        RuleGroupType::Logs => crd::RuleGroupType::Logs,
    }
}

/// External representation of a stored rule group
pub fn to_external(rule_group: &StoredRuleGroup) -> RuleGroup {
    RuleGroup {
        name: rule_group.metadata.name.clone().unwrap_or_default(),
        is_default: rule_group.spec.is_default,
        type_: type_to_external(rule_group.spec.rule_group_type),
        data: rule_group.spec.data.clone(),
    }
}

/// Stored spec for rules applied to `cluster`
pub fn spec_to_internal(cluster: &str, body: RuleGroupBody) -> RuleGroupSpec {
    RuleGroupSpec {
        is_default: body.is_default,
        rule_group_type: type_to_internal(body.type_),
        cluster: ObjectReference {
            name: cluster.to_string(),
            namespace: None,
        },
        data: body.data,
    }
}

/// Rule group named `name` to create for `cluster`
pub fn to_internal(cluster: &str, name: &str, body: RuleGroupBody) -> StoredRuleGroup {
    StoredRuleGroup::new(name, spec_to_internal(cluster, body))
}
