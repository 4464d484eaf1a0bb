//! Verdict formatting for command output.

use owo_colors::{AnsiColors, OwoColorize};
use serde::Serialize;

use crate::error::BoardgateError;
use crate::models::IssueData;
use crate::workflows::ValidationResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerdictReport<'a> {
    issue_id: &'a str,
    from: &'a str,
    to: &'a str,
    #[serde(flatten)]
    verdict: &'a ValidationResult,
}

/// Render a single-line verdict for a move.
///
/// When `use_color_override` is `None`, color is determined by NO_COLOR and
/// stdout TTY (interactive).
pub fn format_verdict(
    issue: &IssueData,
    target_status: &str,
    verdict: &ValidationResult,
    use_color_override: Option<bool>,
) -> String {
    let use_color = use_color_override.unwrap_or_else(should_use_color);
    let (label, color) = if verdict.allowed {
        ("allowed", AnsiColors::Green)
    } else {
        ("denied", AnsiColors::Red)
    };
    let move_part = format!("{} {} -> {}", issue.identifier, issue.status, target_status);
    let label_part = paint(label, color, use_color);
    match verdict.reason.as_deref() {
        Some(reason) => format!("{label_part} {move_part}: {reason}"),
        None => format!("{label_part} {move_part}"),
    }
}

/// Render a verdict as JSON.
///
/// # Errors
/// Returns `BoardgateError::Io` if serialization fails.
pub fn format_verdict_json(
    issue: &IssueData,
    target_status: &str,
    verdict: &ValidationResult,
) -> Result<String, BoardgateError> {
    let report = VerdictReport {
        issue_id: &issue.identifier,
        from: &issue.status,
        to: target_status,
        verdict,
    };
    serde_json::to_string_pretty(&report).map_err(|error| BoardgateError::Io(error.to_string()))
}

/// Render configuration warnings, one per line.
pub fn format_warnings(warnings: &[String], use_color_override: Option<bool>) -> String {
    let use_color = use_color_override.unwrap_or_else(should_use_color);
    warnings
        .iter()
        .map(|warning| format!("{} {warning}", paint("warning:", AnsiColors::Yellow, use_color)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn should_use_color() -> bool {
    use std::io::IsTerminal;
    // Disable colors if NO_COLOR is set or if stdout is not a TTY
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn paint(text: &str, color: AnsiColors, use_color: bool) -> String {
    if use_color {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_denial_with_reason() {
        let issue = IssueData::new("tsk-1", "TODO");
        let verdict = ValidationResult::deny("Transition is explicitly blocked by workflow.");
        assert_eq!(
            format_verdict(&issue, "DONE", &verdict, Some(false)),
            "denied tsk-1 TODO -> DONE: Transition is explicitly blocked by workflow."
        );
    }

    #[test]
    fn json_report_omits_reason_when_allowed() {
        let issue = IssueData::new("tsk-1", "TODO");
        let rendered =
            format_verdict_json(&issue, "IN_PROGRESS", &ValidationResult::allow()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["allowed"], serde_json::Value::Bool(true));
        assert_eq!(value["issueId"], "tsk-1");
        assert!(value.get("reason").is_none());
    }
}
