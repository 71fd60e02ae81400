//! PolicyBinding ↔ PolicyBinding custom resource
//!
//! Conditions are stored keyed by type and returned as a list ordered by
//! type, so repeated reads of the same object produce identical output.

use kubedash_common::crd::{
    self, KyvernoPolicyNamespace, ObjectReference, PolicyBinding as StoredBinding,
};

use super::{creation_time, object_id};
use crate::apiv2::{
    CreatePolicyBindingBody, PolicyBinding, PolicyBindingCondition, PolicyBindingSpec,
    PolicyBindingStatus, PolicyNamespace, PolicyTemplateReference,
};

fn spec_to_external(spec: &crd::PolicyBindingSpec) -> PolicyBindingSpec {
    PolicyBindingSpec {
        policy_template_ref: PolicyTemplateReference {
            name: spec.policy_template_ref.name.clone(),
            namespace: spec.policy_template_ref.namespace.clone(),
        },
        kyverno_policy_namespace: spec.kyverno_policy_namespace.as_ref().map(|ns| {
            PolicyNamespace {
                name: ns.name.clone(),
                labels: ns.labels.clone().into_iter().collect(),
                annotations: ns.annotations.clone().into_iter().collect(),
            }
        }),
    }
}

/// Stored spec for an external spec
pub fn spec_to_internal(spec: PolicyBindingSpec) -> crd::PolicyBindingSpec {
    crd::PolicyBindingSpec {
        policy_template_ref: ObjectReference {
            name: spec.policy_template_ref.name,
            namespace: spec.policy_template_ref.namespace,
        },
        kyverno_policy_namespace: spec.kyverno_policy_namespace.map(|ns| {
            KyvernoPolicyNamespace {
                name: ns.name,
                labels: ns.labels.into_iter().collect(),
                annotations: ns.annotations.into_iter().collect(),
            }
        }),
    }
}

fn status_to_external(status: &crd::PolicyBindingStatus) -> PolicyBindingStatus {
    let mut conditions: Vec<PolicyBindingCondition> = status
        .conditions
        .iter()
        .map(|(type_, c)| PolicyBindingCondition {
            type_: type_.clone(),
            status: c.status.to_string(),
            last_heartbeat_time: c.last_heartbeat_time,
            last_transition_time: c.last_transition_time,
            reason: c.reason.clone(),
            message: c.message.clone(),
        })
        .collect();
    conditions.sort_by(|a, b| a.type_.cmp(&b.type_));

    PolicyBindingStatus {
        observed_generation: status.observed_generation,
        template_enforced: status.template_enforced.unwrap_or(false),
        active: status.active.unwrap_or(false),
        conditions,
    }
}

/// External representation of a stored binding
pub fn to_external(binding: &StoredBinding) -> PolicyBinding {
    PolicyBinding {
        name: binding.metadata.name.clone().unwrap_or_default(),
        id: object_id(&binding.metadata),
        creation_timestamp: creation_time(&binding.metadata),
        spec: spec_to_external(&binding.spec),
        status: binding
            .status
            .as_ref()
            .map(status_to_external)
            .unwrap_or_default(),
    }
}

/// Binding to create from a request body
pub fn to_internal(body: CreatePolicyBindingBody) -> StoredBinding {
    StoredBinding::new(&body.name, spec_to_internal(body.spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubedash_common::crd::{ConditionStatus, PolicyBindingCondition as StoredCondition};
    use std::collections::HashMap;

    fn binding_with_conditions(types: &[&str]) -> StoredBinding {
        let mut binding = to_internal(CreatePolicyBindingBody {
            name: "disallow-privileged".to_string(),
            spec: PolicyBindingSpec {
                policy_template_ref: PolicyTemplateReference {
                    name: "disallow-privileged".to_string(),
                    namespace: None,
                },
                kyverno_policy_namespace: None,
            },
        });
        let conditions: HashMap<String, StoredCondition> = types
            .iter()
            .map(|t| {
                (
                    t.to_string(),
                    StoredCondition {
                        status: ConditionStatus::True,
                        ..Default::default()
                    },
                )
            })
            .collect();
        binding.status = Some(crd::PolicyBindingStatus {
            active: Some(true),
            conditions,
            ..Default::default()
        });
        binding
    }

    #[test]
    fn test_conditions_sorted_by_type() {
        let binding = binding_with_conditions(&["Ready", "KyvernoPolicyApplied", "Enforced"]);

        let types: Vec<String> = to_external(&binding)
            .status
            .conditions
            .into_iter()
            .map(|c| c.type_)
            .collect();
        assert_eq!(types, vec!["Enforced", "KyvernoPolicyApplied", "Ready"]);
    }

    #[test]
    fn test_repeated_conversion_is_identical() {
        let binding = binding_with_conditions(&["b", "a", "d", "c", "e"]);
        let first = to_external(&binding);
        for _ in 0..5 {
            assert_eq!(to_external(&binding), first);
        }
        assert!(first.status.active);
        assert_eq!(first.status.conditions[0].status, "True");
    }

    #[test]
    fn test_missing_status_is_inactive() {
        let mut binding = binding_with_conditions(&[]);
        binding.status = None;
        let status = to_external(&binding).status;
        assert!(!status.active);
        assert!(status.conditions.is_empty());
    }

    #[test]
    fn test_policy_namespace_is_copied() {
        let mut labels = std::collections::BTreeMap::new();
        labels.insert("team".to_string(), "security".to_string());
        let spec = spec_to_internal(PolicyBindingSpec {
            policy_template_ref: PolicyTemplateReference {
                name: "require-labels".to_string(),
                namespace: Some("policies".to_string()),
            },
            kyverno_policy_namespace: Some(PolicyNamespace {
                name: "kyverno".to_string(),
                labels,
                annotations: Default::default(),
            }),
        });
        let ns = spec.kyverno_policy_namespace.as_ref().unwrap();
        assert_eq!(ns.labels["team"], "security");
        assert_eq!(spec_to_external(&spec).policy_template_ref.namespace.as_deref(), Some("policies"));
    }
}
