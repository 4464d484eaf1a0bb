use std::path::PathBuf;

use cucumber::{given, then};

use boardgate::config::{write_configuration, CONFIGURATION_FILENAME};
use boardgate::config_loader::load_workflow_configuration;
use boardgate::issue_files::{find_issue, read_issues_from_file, write_issues_to_file};
use boardgate::models::{IssueData, WorkflowConfiguration};
use boardgate::workflows::find_transition_config;

use crate::step_definitions::initialization_steps::BoardgateWorld;

fn configuration_path(world: &BoardgateWorld) -> PathBuf {
    world
        .working_directory
        .as_ref()
        .expect("cwd")
        .join(CONFIGURATION_FILENAME)
}

fn load_configuration(world: &BoardgateWorld) -> WorkflowConfiguration {
    load_workflow_configuration(&configuration_path(world)).expect("load configuration")
}

fn issues_path(world: &BoardgateWorld) -> PathBuf {
    let configuration = load_configuration(world);
    world
        .working_directory
        .as_ref()
        .expect("cwd")
        .join(configuration.issues_file)
}

fn add_issue(world: &BoardgateWorld, issue: IssueData) {
    let path = issues_path(world);
    let mut issues = read_issues_from_file(&path).expect("read issues");
    issues.push(issue);
    write_issues_to_file(&issues, &path).expect("write issues");
}

#[given(expr = "an issue {string} with status {string}")]
fn given_issue_with_status(world: &mut BoardgateWorld, identifier: String, status: String) {
    add_issue(world, IssueData::new(identifier, status));
}

#[given(expr = "an issue {string} with status {string} assigned to {string}")]
fn given_assigned_issue(
    world: &mut BoardgateWorld,
    identifier: String,
    status: String,
    assignee: String,
) {
    let mut issue = IssueData::new(identifier, status);
    issue.assignee_id = Some(assignee);
    add_issue(world, issue);
}

#[given(expr = "the column {string} has a WIP limit of {int}")]
fn given_column_wip_limit(world: &mut BoardgateWorld, status: String, limit: u32) {
    let mut configuration = load_configuration(world);
    configuration.wip_limits.insert(status, limit);
    write_configuration(&configuration, &configuration_path(world)).expect("write configuration");
}

#[then(expr = "issue {string} should have status {string}")]
fn then_issue_has_status(world: &mut BoardgateWorld, identifier: String, status: String) {
    let issues = read_issues_from_file(&issues_path(world)).expect("read issues");
    let issue = find_issue(&issues, &identifier).expect("issue");
    assert_eq!(issue.status, status);
}

#[then(expr = "the transition from {string} to {string} should have {int} rule(s)")]
fn then_transition_rule_count(world: &mut BoardgateWorld, from: String, to: String, count: usize) {
    let configuration = load_configuration(world);
    let transition =
        find_transition_config(&configuration.transitions, &from, &to).expect("transition");
    assert_eq!(transition.rules.len(), count);
}

#[then(expr = "the transition from {string} to {string} should be blocked")]
fn then_transition_blocked(world: &mut BoardgateWorld, from: String, to: String) {
    let configuration = load_configuration(world);
    let transition =
        find_transition_config(&configuration.transitions, &from, &to).expect("transition");
    assert!(!transition.allowed);
}

#[then(expr = "the JSON verdict should deny with {string}")]
fn then_json_verdict_denies(world: &mut BoardgateWorld, reason: String) {
    let stdout = world.stdout.as_deref().expect("stdout");
    let verdict: serde_json::Value = serde_json::from_str(stdout).expect("parse verdict");
    assert_eq!(verdict["allowed"], serde_json::Value::Bool(false));
    assert_eq!(verdict["reason"].as_str(), Some(reason.as_str()));
}
