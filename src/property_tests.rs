//! Property-based tests for the rule engine.
//!
//! These tests use proptest to verify invariants across many random inputs.

#[cfg(test)]
mod tests {
    use crate::models::{is_truthy, IssueData, Rule, RuleType, TransitionConfig};
    use crate::workflows::{
        validate_transition, ValidationContext, ValidationResult, ADMIN_ROLE,
        EXPLICITLY_BLOCKED_REASON,
    };
    use proptest::prelude::*;
    use serde_json::Value;

    // ===== STRATEGY HELPERS =====

    fn any_status() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("TODO".to_string()),
            Just("IN_PROGRESS".to_string()),
            Just("IN_REVIEW".to_string()),
            Just("DONE".to_string()),
            "[a-z_]{1,12}",
        ]
    }

    fn any_rule_type() -> impl Strategy<Value = RuleType> {
        prop_oneof![
            Just(RuleType::RestrictRole),
            Just(RuleType::RequiredField),
            Just(RuleType::BlockerCheck),
            Just(RuleType::ParentCheck),
            Just(RuleType::WipLimit),
        ]
    }

    fn any_rule() -> impl Strategy<Value = Rule> {
        (
            "[a-z0-9]{1,8}",
            any_rule_type(),
            "[A-Za-z0-9 ]{0,10}",
            proptest::option::of("[A-Za-z ]{1,20}"),
        )
            .prop_map(|(id, rule_type, value, message)| Rule {
                id,
                rule_type,
                value,
                message,
            })
    }

    fn any_issue() -> impl Strategy<Value = IssueData> {
        (
            any_status(),
            proptest::option::of("[a-z0-9]{0,6}"),
            proptest::option::of(0u32..13),
        )
            .prop_map(|(status, assignee, points)| {
                let mut issue = IssueData::new("tsk-prop", status);
                issue.assignee_id = assignee;
                issue.story_points = points.map(f64::from);
                issue
            })
    }

    fn any_role() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(prop_oneof![
            Just(ADMIN_ROLE.to_string()),
            Just("QA".to_string()),
            Just("DEV".to_string()),
            "[A-Z]{1,6}",
        ])
    }

    fn any_field_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-3i64..4).prop_map(Value::from),
            "[a-z0-9]{0,4}".prop_map(Value::from),
            Just(Value::Array(Vec::new())),
        ]
    }

    // ===== PROPERTIES =====

    proptest! {
        /// Without a configuration or an ambient limit every move is allowed.
        #[test]
        fn unconfigured_moves_without_wip_limit_are_allowed(
            issue in any_issue(),
            target in any_status(),
            role in any_role(),
            count in proptest::option::of(0usize..50),
        ) {
            let context = ValidationContext {
                user_role: role,
                target_column_count: count,
                wip_limit: None,
            };
            prop_assert_eq!(
                validate_transition(&issue, &target, None, Some(&context)),
                ValidationResult::allow()
            );
            prop_assert_eq!(
                validate_transition(&issue, &target, None, None),
                ValidationResult::allow()
            );
        }

        /// A disabled transition is denied whatever its rules say.
        #[test]
        fn blocked_transitions_always_deny(
            issue in any_issue(),
            target in any_status(),
            rules in prop::collection::vec(any_rule(), 0..5),
            role in any_role(),
        ) {
            let transition = TransitionConfig {
                from: issue.status.clone(),
                to: target.clone(),
                allowed: false,
                rules,
            };
            let context = ValidationContext { user_role: role, ..Default::default() };
            prop_assert_eq!(
                validate_transition(&issue, &target, Some(&transition), Some(&context)),
                ValidationResult::deny(EXPLICITLY_BLOCKED_REASON)
            );
        }

        /// Administrators pass every role restriction.
        #[test]
        fn admin_passes_any_role_restriction(
            issue in any_issue(),
            roles in prop::collection::vec("[A-Z]{0,6}", 1..4),
        ) {
            let transition = TransitionConfig {
                from: issue.status.clone(),
                to: "DONE".to_string(),
                allowed: true,
                rules: roles
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| Rule {
                        id: format!("r{index}"),
                        rule_type: RuleType::RestrictRole,
                        value,
                        message: None,
                    })
                    .collect(),
            };
            let context = ValidationContext::for_role(ADMIN_ROLE);
            prop_assert!(validate_transition(&issue, "DONE", Some(&transition), Some(&context)).allowed);
        }

        /// A required-field rule denies exactly when the field is falsy.
        #[test]
        fn required_field_denies_iff_falsy(value in any_field_value()) {
            let mut issue = IssueData::new("tsk-prop", "TODO");
            issue.custom.insert("severity".to_string(), value.clone());
            let transition = TransitionConfig {
                from: "TODO".to_string(),
                to: "DONE".to_string(),
                allowed: true,
                rules: vec![Rule {
                    id: "r1".to_string(),
                    rule_type: RuleType::RequiredField,
                    value: "severity".to_string(),
                    message: None,
                }],
            };
            let result = validate_transition(&issue, "DONE", Some(&transition), None);
            prop_assert_eq!(result.allowed, is_truthy(&value));
        }

        /// A positive WIP rule denies exactly when occupancy reaches the limit.
        #[test]
        fn wip_rule_denies_at_or_over_limit(limit in 1u32..20, count in 0usize..40) {
            let issue = IssueData::new("tsk-prop", "TODO");
            let transition = TransitionConfig {
                from: "TODO".to_string(),
                to: "IN_PROGRESS".to_string(),
                allowed: true,
                rules: vec![Rule {
                    id: "r1".to_string(),
                    rule_type: RuleType::WipLimit,
                    value: limit.to_string(),
                    message: None,
                }],
            };
            let context = ValidationContext {
                user_role: None,
                target_column_count: Some(count),
                wip_limit: None,
            };
            let result = validate_transition(&issue, "IN_PROGRESS", Some(&transition), Some(&context));
            prop_assert_eq!(result.allowed, count < limit as usize);
        }

        /// Non-positive or non-numeric WIP rule values never deny.
        #[test]
        fn unparsable_wip_values_never_deny(
            value in prop_oneof![Just("0".to_string()), "-[0-9]{1,3}", "[a-z]{0,5}"],
            count in 0usize..100,
        ) {
            let issue = IssueData::new("tsk-prop", "TODO");
            let transition = TransitionConfig {
                from: "TODO".to_string(),
                to: "IN_PROGRESS".to_string(),
                allowed: true,
                rules: vec![Rule {
                    id: "r1".to_string(),
                    rule_type: RuleType::WipLimit,
                    value,
                    message: None,
                }],
            };
            let context = ValidationContext {
                user_role: None,
                target_column_count: Some(count),
                wip_limit: None,
            };
            prop_assert!(validate_transition(&issue, "IN_PROGRESS", Some(&transition), Some(&context)).allowed);
        }

        /// The first failing rule's message is the one reported.
        #[test]
        fn first_failing_rule_wins(
            first in "[A-Za-z ]{1,20}",
            second in "[A-Za-z ]{1,20}",
        ) {
            let issue = IssueData::new("tsk-prop", "TODO");
            let transition = TransitionConfig {
                from: "TODO".to_string(),
                to: "DONE".to_string(),
                allowed: true,
                rules: vec![
                    Rule {
                        id: "a".to_string(),
                        rule_type: RuleType::RestrictRole,
                        value: "QA".to_string(),
                        message: Some(first.clone()),
                    },
                    Rule {
                        id: "b".to_string(),
                        rule_type: RuleType::RequiredField,
                        value: "assigneeId".to_string(),
                        message: Some(second),
                    },
                ],
            };
            let context = ValidationContext::for_role("DEV");
            let result = validate_transition(&issue, "DONE", Some(&transition), Some(&context));
            prop_assert_eq!(result.reason, Some(first));
        }

        /// Repeated evaluation yields identical verdicts.
        #[test]
        fn evaluation_is_idempotent(
            issue in any_issue(),
            target in any_status(),
            rules in prop::collection::vec(any_rule(), 0..5),
            allowed in any::<bool>(),
            role in any_role(),
            count in proptest::option::of(0usize..10),
            wip_limit in proptest::option::of(0u32..10),
        ) {
            let transition = TransitionConfig {
                from: issue.status.clone(),
                to: target.clone(),
                allowed,
                rules,
            };
            let context = ValidationContext { user_role: role, target_column_count: count, wip_limit };
            let first = validate_transition(&issue, &target, Some(&transition), Some(&context));
            let second = validate_transition(&issue, &target, Some(&transition), Some(&context));
            prop_assert_eq!(first.clone(), second);
            prop_assert_eq!(first.allowed, first.reason.is_none());
        }
    }
}
