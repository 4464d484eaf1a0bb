//! Board service: the caller side of the rule engine.
//!
//! A board owns the issue list and the workflow snapshot, resolves the
//! transition configuration for a move, assembles the validation context from
//! live column occupancy, and applies the status change only when the engine
//! allows it.

use chrono::{DateTime, Utc};

use crate::error::BoardgateError;
use crate::issue_files::find_issue;
use crate::models::{IssueData, WorkflowConfiguration};
use crate::workflows::{
    apply_status_change, find_transition_config, validate_transition, ValidationContext,
    ValidationResult,
};

/// Outcome of a move request.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub verdict: ValidationResult,
    /// The updated issue when the move was applied.
    pub issue: Option<IssueData>,
}

/// Issues and workflow configuration for one board.
#[derive(Debug, Clone)]
pub struct Board {
    pub configuration: WorkflowConfiguration,
    pub issues: Vec<IssueData>,
}

impl Board {
    pub fn new(configuration: WorkflowConfiguration, issues: Vec<IssueData>) -> Self {
        Board {
            configuration,
            issues,
        }
    }

    /// Number of issues currently in a status.
    pub fn column_count(&self, status: &str) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.status == status)
            .count()
    }

    /// Last configured status, treated as the board's done column.
    pub fn done_status(&self) -> Option<&str> {
        self.configuration.statuses.last().map(String::as_str)
    }

    /// Build the validation context for a move into `target_status`.
    pub fn build_context(&self, user_role: Option<&str>, target_status: &str) -> ValidationContext {
        ValidationContext {
            user_role: user_role.map(str::to_string),
            target_column_count: Some(self.column_count(target_status)),
            wip_limit: self.configuration.wip_limits.get(target_status).copied(),
        }
    }

    /// Evaluate a move without applying it.
    ///
    /// Moves to the issue's current status are not validated.
    ///
    /// # Errors
    /// Returns `BoardgateError::IssueOperation` if the issue does not exist.
    pub fn evaluate_move(
        &self,
        identifier: &str,
        target_status: &str,
        user_role: Option<&str>,
    ) -> Result<ValidationResult, BoardgateError> {
        let issue = find_issue(&self.issues, identifier)?;
        Ok(self.evaluate_issue(issue, target_status, user_role))
    }

    /// Evaluate a move and apply it when allowed.
    ///
    /// Occupancy is recounted from the board's own issue list on every call,
    /// so sequential moves observe each other. A move to the current status
    /// is allowed and leaves the issue untouched.
    ///
    /// # Errors
    /// Returns `BoardgateError::IssueOperation` if the issue does not exist.
    pub fn move_issue(
        &mut self,
        identifier: &str,
        target_status: &str,
        user_role: Option<&str>,
        current_utc_time: DateTime<Utc>,
    ) -> Result<MoveOutcome, BoardgateError> {
        let position = self
            .issues
            .iter()
            .position(|issue| issue.identifier == identifier)
            .ok_or_else(|| BoardgateError::IssueOperation("not found".to_string()))?;
        let current = &self.issues[position];
        let verdict = self.evaluate_issue(current, target_status, user_role);
        if !verdict.allowed {
            log::info!(
                "move of {identifier} to {target_status} denied: {}",
                verdict.reason.as_deref().unwrap_or_default()
            );
            return Ok(MoveOutcome {
                verdict,
                issue: None,
            });
        }
        if current.status == target_status {
            return Ok(MoveOutcome {
                verdict,
                issue: Some(current.clone()),
            });
        }

        let updated = apply_status_change(
            current,
            target_status,
            self.done_status(),
            current_utc_time,
        );
        log::info!("moved {identifier} from {} to {target_status}", current.status);
        self.issues[position] = updated.clone();
        Ok(MoveOutcome {
            verdict,
            issue: Some(updated),
        })
    }

    fn evaluate_issue(
        &self,
        issue: &IssueData,
        target_status: &str,
        user_role: Option<&str>,
    ) -> ValidationResult {
        if issue.status == target_status {
            log::debug!(
                "{} is already in {target_status}; nothing to validate",
                issue.identifier
            );
            return ValidationResult::allow();
        }
        let transition =
            find_transition_config(&self.configuration.transitions, &issue.status, target_status);
        let context = self.build_context(user_role, target_status);
        let verdict = validate_transition(issue, target_status, transition, Some(&context));
        log::debug!(
            "evaluated {}: {} -> {target_status} (configured: {}, occupancy: {:?}, limit: {:?}) = {}",
            issue.identifier,
            issue.status,
            transition.is_some(),
            context.target_column_count,
            context.wip_limit,
            verdict.allowed
        );
        verdict
    }
}
