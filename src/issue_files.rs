//! Issue file input/output helpers.

use std::fs;
use std::path::Path;

use crate::error::BoardgateError;
use crate::models::IssueData;

/// Read the issue list from a JSON file.
///
/// A missing file is treated as an empty board.
///
/// # Arguments
/// * `issues_path` - Path to the issue JSON file.
///
/// # Errors
/// Returns `BoardgateError::Io` if reading or parsing fails.
pub fn read_issues_from_file(issues_path: &Path) -> Result<Vec<IssueData>, BoardgateError> {
    if !issues_path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read(issues_path).map_err(|error| BoardgateError::Io(error.to_string()))?;
    let issues: Vec<IssueData> =
        serde_json::from_slice(&contents).map_err(|error| BoardgateError::Io(error.to_string()))?;
    Ok(issues)
}

/// Write the issue list to a JSON file with pretty formatting.
///
/// # Arguments
/// * `issues` - Issues to serialize.
/// * `issues_path` - Path to the issue JSON file.
///
/// # Errors
/// Returns `BoardgateError::Io` if writing fails.
pub fn write_issues_to_file(issues: &[IssueData], issues_path: &Path) -> Result<(), BoardgateError> {
    let contents =
        serde_json::to_string_pretty(issues).map_err(|error| BoardgateError::Io(error.to_string()))?;
    fs::write(issues_path, contents).map_err(|error| BoardgateError::Io(error.to_string()))
}

/// Find an issue by identifier.
///
/// # Errors
/// Returns `BoardgateError::IssueOperation` if the issue cannot be found.
pub fn find_issue<'a>(
    issues: &'a [IssueData],
    identifier: &str,
) -> Result<&'a IssueData, BoardgateError> {
    issues
        .iter()
        .find(|issue| issue.identifier == identifier)
        .ok_or_else(|| BoardgateError::IssueOperation("not found".to_string()))
}
