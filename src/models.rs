//! Boardgate data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Wire names of the built-in issue fields that rules may reference.
pub const ISSUE_FIELD_NAMES: &[&str] = &[
    "id",
    "title",
    "type",
    "status",
    "assigneeId",
    "storyPoints",
    "dueDate",
    "description",
    "priority",
    "labels",
    "parentId",
    "sprintId",
    "createdAt",
    "updatedAt",
    "resolvedAt",
];

/// Issue data representation.
///
/// Keys that are not built-in fields are collected into `custom`, so the
/// issue behaves as an open field bag for rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueData {
    #[serde(rename = "id")]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_issue_type")]
    pub issue_type: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    /// Kept as written; boards store both dates and full timestamps here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
}

fn default_issue_type() -> String {
    "task".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl IssueData {
    /// Create an issue with only an identifier and a status set.
    pub fn new(identifier: impl Into<String>, status: impl Into<String>) -> Self {
        IssueData {
            identifier: identifier.into(),
            title: String::new(),
            issue_type: default_issue_type(),
            status: status.into(),
            assignee_id: None,
            story_points: None,
            due_date: None,
            description: None,
            priority: None,
            labels: Vec::new(),
            parent_id: None,
            sprint_id: None,
            created_at: None,
            updated_at: None,
            resolved_at: None,
            custom: BTreeMap::new(),
        }
    }

    /// Look up a field by its wire name.
    ///
    /// Built-in fields resolve to their value, other names through the
    /// custom map. Unset and unknown fields are `Value::Null`.
    pub fn field(&self, name: &str) -> Value {
        match name {
            "id" => Value::from(self.identifier.clone()),
            "title" => Value::from(self.title.clone()),
            "type" => Value::from(self.issue_type.clone()),
            "status" => Value::from(self.status.clone()),
            "assigneeId" => optional_string(&self.assignee_id),
            "storyPoints" => self.story_points.map(Value::from).unwrap_or(Value::Null),
            "dueDate" => optional_string(&self.due_date),
            "description" => optional_string(&self.description),
            "priority" => optional_string(&self.priority),
            "labels" => Value::from(self.labels.clone()),
            "parentId" => optional_string(&self.parent_id),
            "sprintId" => optional_string(&self.sprint_id),
            "createdAt" => optional_timestamp(&self.created_at),
            "updatedAt" => optional_timestamp(&self.updated_at),
            "resolvedAt" => optional_timestamp(&self.resolved_at),
            _ => self.custom.get(name).cloned().unwrap_or(Value::Null),
        }
    }
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map(Value::from).unwrap_or(Value::Null)
}

fn optional_timestamp(value: &Option<DateTime<Utc>>) -> Value {
    value
        .map(|timestamp| Value::from(timestamp.to_rfc3339()))
        .unwrap_or(Value::Null)
}

/// Test a field value for presence the way a browser would test it.
///
/// `null`, `false`, `0`, `NaN` and the empty string are falsy. Everything
/// else is truthy, including `"0"` and empty arrays or objects.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number
            .as_f64()
            .map(|float| float != 0.0 && !float.is_nan())
            .unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Kinds of rule that can be attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    RestrictRole,
    RequiredField,
    BlockerCheck,
    ParentCheck,
    WipLimit,
}

impl RuleType {
    /// All rule types in declaration order.
    pub const ALL: [RuleType; 5] = [
        RuleType::RestrictRole,
        RuleType::RequiredField,
        RuleType::BlockerCheck,
        RuleType::ParentCheck,
        RuleType::WipLimit,
    ];

    /// Wire name of the rule type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::RestrictRole => "RESTRICT_ROLE",
            RuleType::RequiredField => "REQUIRED_FIELD",
            RuleType::BlockerCheck => "BLOCKER_CHECK",
            RuleType::ParentCheck => "PARENT_CHECK",
            RuleType::WipLimit => "WIP_LIMIT",
        }
    }

    /// Whether the engine evaluates this rule type.
    pub fn is_implemented(&self) -> bool {
        !matches!(self, RuleType::BlockerCheck | RuleType::ParentCheck)
    }
}

impl Display for RuleType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace('-', "_");
        RuleType::ALL
            .into_iter()
            .find(|rule_type| rule_type.as_str() == normalized)
            .ok_or_else(|| format!("unknown rule type '{value}'"))
    }
}

/// One validation check attached to a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    /// Role name, field name, or base-10 limit depending on `rule_type`.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Configuration for one ordered pair of statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub from: String,
    pub to: String,
    #[serde(default = "default_allowed")]
    pub allowed: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_allowed() -> bool {
    true
}

impl TransitionConfig {
    /// Create an allowed transition with no rules.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        TransitionConfig {
            from: from.into(),
            to: to.into(),
            allowed: true,
            rules: Vec::new(),
        }
    }

    /// Whether this configuration governs the given pair.
    pub fn matches(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

/// Workflow configuration loaded from .boardgate.yml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfiguration {
    /// Board columns, in display order.
    pub statuses: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
    /// Project-wide WIP limit per column.
    #[serde(default)]
    pub wip_limits: BTreeMap<String, u32>,
    pub issues_file: String,
}
