//! Workflow rule engine and transition side effects.
//!
//! The engine is a pure decision core: it never performs I/O, never keeps
//! state, and never fails. Every denial is returned in-band as a
//! [`ValidationResult`] carrying a reason suitable for direct display.
//!
//! Callers evaluate against an occupancy snapshot. Two evaluations made from
//! the same snapshot can both be allowed before either move is committed, so
//! a column may transiently overshoot its WIP limit. Callers that need the
//! limit to hold must recount occupancy after every applied move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{is_truthy, IssueData, Rule, RuleType, TransitionConfig};

/// Role that bypasses every role restriction.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Reason given when a transition is disabled outright.
pub const EXPLICITLY_BLOCKED_REASON: &str = "Transition is explicitly blocked by workflow.";

/// Per-evaluation inputs supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    /// Role of the acting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Number of issues already in the destination status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column_count: Option<usize>,
    /// Limit for the destination column from a project-wide policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
}

impl ValidationContext {
    /// Create a context for an acting role with no occupancy information.
    pub fn for_role(role: impl Into<String>) -> Self {
        ValidationContext {
            user_role: Some(role.into()),
            ..Default::default()
        }
    }
}

/// Verdict returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    /// Create an allowing verdict.
    pub fn allow() -> Self {
        ValidationResult {
            allowed: true,
            reason: None,
        }
    }

    /// Create a denying verdict.
    pub fn deny(reason: impl Into<String>) -> Self {
        ValidationResult {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Find the configuration governing a `(from, to)` pair.
///
/// Status identifiers compare exactly and case-sensitively.
pub fn find_transition_config<'a>(
    transitions: &'a [TransitionConfig],
    from: &str,
    to: &str,
) -> Option<&'a TransitionConfig> {
    transitions
        .iter()
        .find(|transition| transition.matches(from, to))
}

/// Decide whether an issue may move to a target status.
///
/// # Arguments
/// * `issue` - Issue being moved.
/// * `target_status` - Destination status, used in denial messages.
/// * `transition_config` - Configuration already resolved for
///   `(issue.status, target_status)`, if one exists.
/// * `context` - Acting role and destination occupancy, if known.
///
/// # Returns
/// The first denial encountered, or an allowing verdict.
pub fn validate_transition(
    issue: &IssueData,
    target_status: &str,
    transition_config: Option<&TransitionConfig>,
    context: Option<&ValidationContext>,
) -> ValidationResult {
    let Some(transition) = transition_config else {
        return check_context_wip_limit(target_status, context)
            .unwrap_or_else(ValidationResult::allow);
    };

    if !transition.allowed {
        return ValidationResult::deny(EXPLICITLY_BLOCKED_REASON);
    }

    for rule in &transition.rules {
        if let Some(denial) = evaluate_rule(rule, issue, target_status, context) {
            return denial;
        }
    }

    check_context_wip_limit(target_status, context).unwrap_or_else(ValidationResult::allow)
}

/// Evaluate a single rule, returning a denial when it fails.
pub fn evaluate_rule(
    rule: &Rule,
    issue: &IssueData,
    target_status: &str,
    context: Option<&ValidationContext>,
) -> Option<ValidationResult> {
    match rule.rule_type {
        RuleType::RestrictRole => {
            let role = context.and_then(|context| context.user_role.as_deref());
            if role == Some(ADMIN_ROLE) || role == Some(rule.value.as_str()) {
                return None;
            }
            Some(deny_with(rule, || {
                format!(
                    "Only users with role '{}' can perform this transition.",
                    rule.value
                )
            }))
        }
        RuleType::RequiredField => {
            let field_name = rule.value.trim();
            if field_name.is_empty() {
                return None;
            }
            if is_truthy(&issue.field(field_name)) {
                return None;
            }
            Some(deny_with(rule, || {
                format!("Field '{field_name}' is required to move to {target_status}.")
            }))
        }
        RuleType::WipLimit => {
            let limit = parse_wip_limit(&rule.value);
            let count = context.and_then(|context| context.target_column_count)?;
            if limit <= 0 || (count as i64) < limit {
                return None;
            }
            Some(deny_with(rule, || wip_limit_reason(target_status, limit)))
        }
        // Recognized but not implemented yet: always passes.
        RuleType::BlockerCheck | RuleType::ParentCheck => None,
    }
}

/// Parse a WIP rule payload the way `parseInt(value, 10)` does.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, and text with no leading digits yields 0.
pub fn parse_wip_limit(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |total, digit| {
            total
                .saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn check_context_wip_limit(
    target_status: &str,
    context: Option<&ValidationContext>,
) -> Option<ValidationResult> {
    let context = context?;
    let limit = context.wip_limit.filter(|limit| *limit > 0)?;
    let count = context.target_column_count?;
    if count < limit as usize {
        return None;
    }
    Some(ValidationResult::deny(wip_limit_reason(
        target_status,
        i64::from(limit),
    )))
}

fn wip_limit_reason(target_status: &str, limit: i64) -> String {
    format!("Column '{target_status}' has reached its WIP limit of {limit}.")
}

fn deny_with(rule: &Rule, default_message: impl FnOnce() -> String) -> ValidationResult {
    match rule.message.as_deref() {
        Some(message) if !message.is_empty() => ValidationResult::deny(message),
        _ => ValidationResult::deny(default_message()),
    }
}

/// Apply the side effects of a status change.
///
/// # Arguments
/// * `issue` - Issue being moved.
/// * `new_status` - Status being applied.
/// * `done_status` - Terminal column of the board, if any.
/// * `current_utc_time` - Current UTC timestamp.
///
/// # Returns
/// A copy of the issue with the new status and timestamps applied.
pub fn apply_status_change(
    issue: &IssueData,
    new_status: &str,
    done_status: Option<&str>,
    current_utc_time: DateTime<Utc>,
) -> IssueData {
    let mut updated_issue = issue.clone();
    updated_issue.status = new_status.to_string();
    updated_issue.updated_at = Some(current_utc_time);
    if done_status == Some(new_status) {
        updated_issue.resolved_at = Some(current_utc_time);
    } else if done_status == Some(issue.status.as_str()) {
        updated_issue.resolved_at = None;
    }
    updated_issue
}
