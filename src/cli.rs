//! CLI command definitions.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use crate::board::Board;
use crate::config::{write_configuration, write_default_configuration, CONFIGURATION_FILENAME};
use crate::config_loader::{lint_workflow_configuration, load_workflow_configuration};
use crate::error::BoardgateError;
use crate::issue_files::{find_issue, read_issues_from_file, write_issues_to_file};
use crate::models::{RuleType, WorkflowConfiguration};
use crate::verdict_display::{format_verdict, format_verdict_json, format_warnings};
use crate::workflow_editor::{
    add_rule, move_rule, remove_rule, remove_transition, set_transition, update_rule, RuleDraft,
};

/// Boardgate CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "boardgate", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize a board in the current directory.
    Init,
    /// Check whether an issue may move to a status.
    Check {
        /// Issue identifier.
        identifier: String,
        /// Target status.
        #[arg(long)]
        to: String,
        /// Role of the acting user.
        #[arg(long)]
        role: Option<String>,
        /// Emit JSON output.
        #[arg(long)]
        json: bool,
    },
    /// Move an issue to a status when the workflow allows it.
    Move {
        /// Issue identifier.
        identifier: String,
        /// Target status.
        #[arg(long)]
        to: String,
        /// Role of the acting user.
        #[arg(long)]
        role: Option<String>,
    },
    /// Report rules that will never take effect.
    Lint,
    /// Manage transitions.
    Transition {
        #[command(subcommand)]
        command: TransitionCommands,
    },
    /// Manage transition rules.
    Rule {
        #[command(subcommand)]
        command: RuleCommands,
    },
}

#[derive(Debug, Subcommand)]
enum TransitionCommands {
    /// Configure a transition.
    Set {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
        /// Block the transition outright.
        #[arg(long)]
        blocked: bool,
    },
    /// Remove a transition configuration.
    Remove {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
    },
}

#[derive(Debug, Subcommand)]
enum RuleCommands {
    /// Append a rule to a transition.
    Add {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
        /// Rule type (RESTRICT_ROLE, REQUIRED_FIELD, WIP_LIMIT, BLOCKER_CHECK, PARENT_CHECK).
        #[arg(long = "type", value_name = "TYPE")]
        rule_type: RuleType,
        /// Role, field name, or limit.
        #[arg(long, default_value = "")]
        value: String,
        /// Custom denial message.
        #[arg(long)]
        message: Option<String>,
    },
    /// Replace a rule's type, value and message.
    Update {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
        /// Rule identifier.
        rule_id: String,
        /// Rule type.
        #[arg(long = "type", value_name = "TYPE")]
        rule_type: RuleType,
        /// Role, field name, or limit.
        #[arg(long, default_value = "")]
        value: String,
        /// Custom denial message.
        #[arg(long)]
        message: Option<String>,
    },
    /// Remove a rule from a transition.
    Remove {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
        /// Rule identifier.
        rule_id: String,
    },
    /// Change a rule's position in evaluation order.
    Move {
        /// Source status.
        from: String,
        /// Target status.
        to: String,
        /// Rule identifier.
        rule_id: String,
        /// Zero-based position.
        #[arg(long)]
        position: usize,
    },
}

fn is_help_request(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion
    )
}

/// Output produced by a CLI command.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Run the CLI with explicit arguments.
///
/// # Arguments
///
/// * `args` - Command line arguments.
/// * `cwd` - Working directory for the command.
///
/// # Errors
///
/// Returns `BoardgateError` if execution fails.
pub fn run_from_args<I, T>(args: I, cwd: &Path) -> Result<(), BoardgateError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let output = run_from_args_with_output(args, cwd)?;
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    Ok(())
}

/// Run the CLI with explicit arguments and capture stdout output.
///
/// # Arguments
///
/// * `args` - Command line arguments.
/// * `cwd` - Working directory for the command.
///
/// # Errors
///
/// Returns `BoardgateError` if execution fails.
pub fn run_from_args_with_output<I, T>(
    args: I,
    cwd: &Path,
) -> Result<CommandOutput, BoardgateError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error.render().to_string();
            if is_help_request(error.kind()) {
                return Ok(CommandOutput { stdout: rendered });
            }
            return Err(BoardgateError::IssueOperation(rendered));
        }
    };
    let stdout = execute_command(cli.command, cwd)?;
    Ok(CommandOutput {
        stdout: stdout.unwrap_or_default(),
    })
}

/// Run the CLI using process arguments.
///
/// # Errors
///
/// Returns `BoardgateError` if execution fails.
pub fn run_from_env() -> Result<(), BoardgateError> {
    run_from_args(std::env::args_os(), Path::new("."))
}

fn execute_command(command: Commands, root: &Path) -> Result<Option<String>, BoardgateError> {
    let configuration_path = root.join(CONFIGURATION_FILENAME);
    match command {
        Commands::Init => {
            if configuration_path.exists() {
                return Err(BoardgateError::Configuration(
                    "already initialized".to_string(),
                ));
            }
            write_default_configuration(&configuration_path)?;
            let configuration = load_workflow_configuration(&configuration_path)?;
            let issues_path = issues_path(root, &configuration);
            if !issues_path.exists() {
                write_issues_to_file(&[], &issues_path)?;
            }
            Ok(None)
        }
        Commands::Check {
            identifier,
            to,
            role,
            json,
        } => {
            let board = load_board(root, &configuration_path)?;
            let verdict = board.evaluate_move(&identifier, &to, role.as_deref())?;
            let issue = find_issue(&board.issues, &identifier)?;
            if json {
                return Ok(Some(format_verdict_json(issue, &to, &verdict)?));
            }
            let line = format_verdict(issue, &to, &verdict, None);
            if !verdict.allowed {
                return Err(BoardgateError::InvalidTransition(line));
            }
            Ok(Some(line))
        }
        Commands::Move {
            identifier,
            to,
            role,
        } => {
            let mut board = load_board(root, &configuration_path)?;
            let original = find_issue(&board.issues, &identifier)?.clone();
            let outcome = board.move_issue(&identifier, &to, role.as_deref(), Utc::now())?;
            let line = format_verdict(&original, &to, &outcome.verdict, None);
            if !outcome.verdict.allowed {
                return Err(BoardgateError::InvalidTransition(line));
            }
            write_issues_to_file(&board.issues, &issues_path(root, &board.configuration))?;
            Ok(Some(line))
        }
        Commands::Lint => {
            let configuration = load_workflow_configuration(&configuration_path)?;
            let warnings = lint_workflow_configuration(&configuration);
            if warnings.is_empty() {
                return Ok(Some("no warnings".to_string()));
            }
            Ok(Some(format_warnings(&warnings, None)))
        }
        Commands::Transition { command } => {
            let mut configuration = load_workflow_configuration(&configuration_path)?;
            match command {
                TransitionCommands::Set { from, to, blocked } => {
                    set_transition(&mut configuration, &from, &to, !blocked)?;
                }
                TransitionCommands::Remove { from, to } => {
                    remove_transition(&mut configuration, &from, &to)?;
                }
            }
            write_configuration(&configuration, &configuration_path)?;
            Ok(None)
        }
        Commands::Rule { command } => {
            let mut configuration = load_workflow_configuration(&configuration_path)?;
            let stdout = match command {
                RuleCommands::Add {
                    from,
                    to,
                    rule_type,
                    value,
                    message,
                } => {
                    let draft = RuleDraft {
                        rule_type,
                        value,
                        message,
                    };
                    Some(add_rule(&mut configuration, &from, &to, draft)?)
                }
                RuleCommands::Update {
                    from,
                    to,
                    rule_id,
                    rule_type,
                    value,
                    message,
                } => {
                    let draft = RuleDraft {
                        rule_type,
                        value,
                        message,
                    };
                    update_rule(&mut configuration, &from, &to, &rule_id, draft)?;
                    None
                }
                RuleCommands::Remove { from, to, rule_id } => {
                    remove_rule(&mut configuration, &from, &to, &rule_id)?;
                    None
                }
                RuleCommands::Move {
                    from,
                    to,
                    rule_id,
                    position,
                } => {
                    move_rule(&mut configuration, &from, &to, &rule_id, position)?;
                    None
                }
            };
            write_configuration(&configuration, &configuration_path)?;
            Ok(stdout)
        }
    }
}

fn issues_path(root: &Path, configuration: &WorkflowConfiguration) -> PathBuf {
    root.join(&configuration.issues_file)
}

fn load_board(root: &Path, configuration_path: &Path) -> Result<Board, BoardgateError> {
    let configuration = load_workflow_configuration(configuration_path)?;
    for warning in lint_workflow_configuration(&configuration) {
        log::warn!("{warning}");
    }
    let issues = read_issues_from_file(&issues_path(root, &configuration))?;
    Ok(Board::new(configuration, issues))
}
