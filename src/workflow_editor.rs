//! Editing operations for transition and rule configuration.
//!
//! These keep the collection invariants the engine relies on: one
//! configuration per `(from, to)` pair, no self-transitions, and rule ids
//! that stay stable for the lifetime of a rule.

use uuid::Uuid;

use crate::error::BoardgateError;
use crate::models::{Rule, RuleType, TransitionConfig, WorkflowConfiguration};

/// Fields of a rule to create or replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub rule_type: RuleType,
    pub value: String,
    pub message: Option<String>,
}

/// Create or update the configuration for a pair.
///
/// Existing rules are kept when the pair is already configured.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` for self-transitions or empty
/// status identifiers.
pub fn set_transition<'a>(
    configuration: &'a mut WorkflowConfiguration,
    from: &str,
    to: &str,
    allowed: bool,
) -> Result<&'a mut TransitionConfig, BoardgateError> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(BoardgateError::WorkflowEdit(
            "transition statuses must not be empty".to_string(),
        ));
    }
    if from == to {
        return Err(BoardgateError::WorkflowEdit(format!(
            "self-transition '{from}' cannot be configured"
        )));
    }
    let index = match position_of(configuration, from, to) {
        Some(index) => index,
        None => {
            configuration
                .transitions
                .push(TransitionConfig::new(from, to));
            configuration.transitions.len() - 1
        }
    };
    let transition = &mut configuration.transitions[index];
    transition.allowed = allowed;
    Ok(transition)
}

/// Remove the configuration for a pair.
///
/// # Returns
/// The removed configuration.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` if the pair is not configured.
pub fn remove_transition(
    configuration: &mut WorkflowConfiguration,
    from: &str,
    to: &str,
) -> Result<TransitionConfig, BoardgateError> {
    let index = position_of(configuration, from, to).ok_or_else(|| not_configured(from, to))?;
    Ok(configuration.transitions.remove(index))
}

/// Append a rule to a pair, creating an allowed transition if needed.
///
/// # Returns
/// The generated rule id.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` if the pair cannot be configured.
pub fn add_rule(
    configuration: &mut WorkflowConfiguration,
    from: &str,
    to: &str,
    draft: RuleDraft,
) -> Result<String, BoardgateError> {
    let transition = match position_of(configuration, from, to) {
        Some(index) => &mut configuration.transitions[index],
        None => set_transition(configuration, from, to, true)?,
    };
    let identifier = generate_rule_id(transition);
    transition.rules.push(Rule {
        id: identifier.clone(),
        rule_type: draft.rule_type,
        value: draft.value,
        message: draft.message,
    });
    Ok(identifier)
}

/// Replace the payload of an existing rule, keeping its id and position.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` if the pair or rule is missing.
pub fn update_rule(
    configuration: &mut WorkflowConfiguration,
    from: &str,
    to: &str,
    rule_id: &str,
    draft: RuleDraft,
) -> Result<(), BoardgateError> {
    let transition = transition_mut(configuration, from, to)?;
    let rule = transition
        .rules
        .iter_mut()
        .find(|rule| rule.id == rule_id)
        .ok_or_else(|| rule_not_found(rule_id))?;
    rule.rule_type = draft.rule_type;
    rule.value = draft.value;
    rule.message = draft.message;
    Ok(())
}

/// Remove a rule by id.
///
/// # Returns
/// The removed rule.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` if the pair or rule is missing.
pub fn remove_rule(
    configuration: &mut WorkflowConfiguration,
    from: &str,
    to: &str,
    rule_id: &str,
) -> Result<Rule, BoardgateError> {
    let transition = transition_mut(configuration, from, to)?;
    let index = transition
        .rules
        .iter()
        .position(|rule| rule.id == rule_id)
        .ok_or_else(|| rule_not_found(rule_id))?;
    Ok(transition.rules.remove(index))
}

/// Move a rule to a new position in its evaluation order.
///
/// Positions past the end move the rule last.
///
/// # Errors
/// Returns `BoardgateError::WorkflowEdit` if the pair or rule is missing.
pub fn move_rule(
    configuration: &mut WorkflowConfiguration,
    from: &str,
    to: &str,
    rule_id: &str,
    new_position: usize,
) -> Result<(), BoardgateError> {
    let transition = transition_mut(configuration, from, to)?;
    let index = transition
        .rules
        .iter()
        .position(|rule| rule.id == rule_id)
        .ok_or_else(|| rule_not_found(rule_id))?;
    let rule = transition.rules.remove(index);
    let target = new_position.min(transition.rules.len());
    transition.rules.insert(target, rule);
    Ok(())
}

fn generate_rule_id(transition: &TransitionConfig) -> String {
    loop {
        let candidate = Uuid::new_v4().to_string();
        if !transition.rules.iter().any(|rule| rule.id == candidate) {
            return candidate;
        }
    }
}

fn position_of(configuration: &WorkflowConfiguration, from: &str, to: &str) -> Option<usize> {
    configuration
        .transitions
        .iter()
        .position(|transition| transition.matches(from, to))
}

fn transition_mut<'a>(
    configuration: &'a mut WorkflowConfiguration,
    from: &str,
    to: &str,
) -> Result<&'a mut TransitionConfig, BoardgateError> {
    configuration
        .transitions
        .iter_mut()
        .find(|transition| transition.matches(from, to))
        .ok_or_else(|| not_configured(from, to))
}

fn not_configured(from: &str, to: &str) -> BoardgateError {
    BoardgateError::WorkflowEdit(format!("no transition configured from '{from}' to '{to}'"))
}

fn rule_not_found(rule_id: &str) -> BoardgateError {
    BoardgateError::WorkflowEdit(format!("rule '{rule_id}' not found"))
}
