//! Configuration loading and validation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::config::default_workflow_configuration;
use crate::error::BoardgateError;
use crate::models::{RuleType, WorkflowConfiguration, ISSUE_FIELD_NAMES};
use crate::workflows::parse_wip_limit;

/// Load a workflow configuration from disk.
///
/// # Arguments
///
/// * `path` - Path to the configuration file.
///
/// # Errors
///
/// Returns `BoardgateError::Configuration` if the configuration is invalid.
pub fn load_workflow_configuration(path: &Path) -> Result<WorkflowConfiguration, BoardgateError> {
    let contents = fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            BoardgateError::Configuration("configuration file not found".to_string())
        } else {
            BoardgateError::Io(error.to_string())
        }
    })?;
    parse_workflow_configuration(&contents)
}

/// Parse and validate configuration text.
///
/// Top-level keys override the defaults; a missing key keeps its default.
///
/// # Errors
///
/// Returns `BoardgateError::Configuration` if the text is not a valid
/// configuration.
pub fn parse_workflow_configuration(
    contents: &str,
) -> Result<WorkflowConfiguration, BoardgateError> {
    let raw_value: Value = if contents.trim().is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        serde_yaml::from_str(contents)
            .map_err(|error| BoardgateError::Configuration(map_configuration_error(&error)))?
    };
    let merged_value = merge_with_defaults(raw_value)?;
    let configuration: WorkflowConfiguration = serde_yaml::from_value(merged_value)
        .map_err(|error| BoardgateError::Configuration(map_configuration_error(&error)))?;

    let errors = validate_workflow_configuration(&configuration);
    if !errors.is_empty() {
        return Err(BoardgateError::Configuration(errors.join("; ")));
    }

    Ok(configuration)
}

/// Validate structural rules beyond schema validation.
///
/// # Arguments
///
/// * `configuration` - Loaded configuration.
///
/// # Returns
///
/// A list of validation errors.
pub fn validate_workflow_configuration(configuration: &WorkflowConfiguration) -> Vec<String> {
    let mut errors = Vec::new();

    if configuration.statuses.is_empty() {
        errors.push("statuses must not be empty".to_string());
    }
    if configuration
        .statuses
        .iter()
        .any(|status| status.trim().is_empty())
    {
        errors.push("status identifiers must not be empty".to_string());
    }
    let mut seen_statuses = HashSet::new();
    for status in &configuration.statuses {
        if !seen_statuses.insert(status.as_str()) {
            errors.push(format!("duplicate status '{status}'"));
        }
    }

    if configuration.issues_file.trim().is_empty() {
        errors.push("issues_file must not be empty".to_string());
    }

    let mut seen_pairs = HashSet::new();
    for transition in &configuration.transitions {
        if transition.from.trim().is_empty() || transition.to.trim().is_empty() {
            errors.push("transition statuses must not be empty".to_string());
        }
        if transition.from == transition.to {
            errors.push(format!(
                "self-transition '{}' cannot be configured",
                transition.from
            ));
        }
        if !seen_pairs.insert((transition.from.as_str(), transition.to.as_str())) {
            errors.push(format!(
                "duplicate transition from '{}' to '{}'",
                transition.from, transition.to
            ));
        }
        let mut seen_rule_ids = HashSet::new();
        for rule in &transition.rules {
            if rule.id.trim().is_empty() {
                errors.push(format!(
                    "rule on '{}' -> '{}' is missing an id",
                    transition.from, transition.to
                ));
            } else if !seen_rule_ids.insert(rule.id.as_str()) {
                errors.push(format!(
                    "duplicate rule id '{}' on '{}' -> '{}'",
                    rule.id, transition.from, transition.to
                ));
            }
        }
    }

    errors
}

/// Report rule payloads that are non-binding or easy to get wrong.
///
/// Warnings never change evaluation: malformed payloads still fail open at
/// runtime.
///
/// # Arguments
///
/// * `configuration` - Loaded configuration.
///
/// # Returns
///
/// A list of human-readable warnings.
pub fn lint_workflow_configuration(configuration: &WorkflowConfiguration) -> Vec<String> {
    let mut warnings = Vec::new();
    let known_statuses: HashSet<&str> = configuration
        .statuses
        .iter()
        .map(String::as_str)
        .collect();

    for (status, limit) in &configuration.wip_limits {
        if !known_statuses.contains(status.as_str()) {
            warnings.push(format!("WIP limit set for unknown status '{status}'"));
        }
        if *limit == 0 {
            warnings.push(format!("WIP limit for '{status}' is 0 and has no effect"));
        }
    }

    for transition in &configuration.transitions {
        let pair = format!("'{}' -> '{}'", transition.from, transition.to);
        for status in [&transition.from, &transition.to] {
            if !known_statuses.contains(status.as_str()) {
                warnings.push(format!("transition {pair} references unknown status '{status}'"));
            }
        }
        if !transition.allowed && !transition.rules.is_empty() {
            warnings.push(format!(
                "transition {pair} is blocked; its rules are never evaluated"
            ));
        }
        for rule in &transition.rules {
            let label = format!("rule '{}' on {pair}", rule.id);
            match rule.rule_type {
                RuleType::RestrictRole => {
                    if rule.value.trim().is_empty() {
                        warnings.push(format!(
                            "{label} has no role; only ADMIN can pass it"
                        ));
                    }
                }
                RuleType::RequiredField => {
                    let field_name = rule.value.trim();
                    if field_name.is_empty() {
                        warnings.push(format!("{label} names no field and has no effect"));
                    } else if !ISSUE_FIELD_NAMES.contains(&field_name) {
                        warnings.push(format!(
                            "{label} names custom field '{field_name}'; issues without it are denied"
                        ));
                    }
                }
                RuleType::WipLimit => {
                    if parse_wip_limit(&rule.value) <= 0 {
                        warnings.push(format!(
                            "{label} has limit '{}' which never denies",
                            rule.value
                        ));
                    }
                }
                RuleType::BlockerCheck | RuleType::ParentCheck => {
                    warnings.push(format!(
                        "{label} uses {} which is not implemented and always passes",
                        rule.rule_type
                    ));
                }
            }
        }
    }

    warnings
}

fn map_configuration_error(error: &serde_yaml::Error) -> String {
    let message = error.to_string();
    if message.contains("unknown field") {
        return "unknown configuration fields".to_string();
    }
    if message.contains("unknown variant") {
        return format!("unknown rule type: {message}");
    }
    message
}

fn merge_with_defaults(value: Value) -> Result<Value, BoardgateError> {
    let mut defaults = serde_yaml::to_value(default_workflow_configuration())
        .map_err(|error| BoardgateError::Io(error.to_string()))?;
    let overrides = match value {
        Value::Null => Mapping::new(),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(BoardgateError::Configuration(
                "configuration must be a mapping".to_string(),
            ))
        }
    };

    if let Value::Mapping(ref mut default_map) = defaults {
        for (key, value) in overrides {
            default_map.insert(key, value);
        }
    }
    Ok(defaults)
}
