//! Default configuration for new Boardgate boards.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::BoardgateError;
use crate::models::{Rule, RuleType, TransitionConfig, WorkflowConfiguration};

/// File name of the board configuration.
pub const CONFIGURATION_FILENAME: &str = ".boardgate.yml";

/// Return the default workflow configuration.
pub fn default_workflow_configuration() -> WorkflowConfiguration {
    let statuses = ["TODO", "IN_PROGRESS", "IN_REVIEW", "DONE"]
        .into_iter()
        .map(str::to_string)
        .collect();

    let transitions = vec![
        TransitionConfig::new("TODO", "IN_PROGRESS"),
        TransitionConfig::new("IN_PROGRESS", "TODO"),
        TransitionConfig {
            from: "IN_PROGRESS".to_string(),
            to: "IN_REVIEW".to_string(),
            allowed: true,
            rules: vec![Rule {
                id: "default-review-assignee".to_string(),
                rule_type: RuleType::RequiredField,
                value: "assigneeId".to_string(),
                message: None,
            }],
        },
        TransitionConfig::new("IN_REVIEW", "IN_PROGRESS"),
        TransitionConfig {
            from: "IN_REVIEW".to_string(),
            to: "DONE".to_string(),
            allowed: true,
            rules: vec![Rule {
                id: "default-done-reviewer".to_string(),
                rule_type: RuleType::RestrictRole,
                value: "QA".to_string(),
                message: None,
            }],
        },
        TransitionConfig {
            from: "TODO".to_string(),
            to: "DONE".to_string(),
            allowed: false,
            rules: Vec::new(),
        },
    ];

    WorkflowConfiguration {
        statuses,
        transitions,
        wip_limits: BTreeMap::new(),
        issues_file: "issues.json".to_string(),
    }
}

/// Write the default configuration to disk.
///
/// # Arguments
///
/// * `path` - Path to the .boardgate.yml file.
///
/// # Errors
///
/// Returns `BoardgateError::Io` if writing fails.
pub fn write_default_configuration(path: &Path) -> Result<(), BoardgateError> {
    write_configuration(&default_workflow_configuration(), path)
}

/// Write a configuration to disk as YAML.
///
/// # Errors
///
/// Returns `BoardgateError::Io` if serialization or writing fails.
pub fn write_configuration(
    configuration: &WorkflowConfiguration,
    path: &Path,
) -> Result<(), BoardgateError> {
    let contents = serde_yaml::to_string(configuration)
        .map_err(|error| BoardgateError::Io(error.to_string()))?;
    std::fs::write(path, contents).map_err(|error| BoardgateError::Io(error.to_string()))
}
