use std::path::PathBuf;

use cucumber::{given, then, when, World};
use tempfile::TempDir;

use boardgate::cli::run_from_args_with_output;

#[derive(Debug, Default, World)]
pub struct BoardgateWorld {
    pub temp_dir: Option<TempDir>,
    pub working_directory: Option<PathBuf>,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

pub fn run_cli(world: &mut BoardgateWorld, command: &str) {
    let args = shell_words::split(command).expect("parse command");
    let cwd = world
        .working_directory
        .as_ref()
        .expect("working directory not set");

    match run_from_args_with_output(args, cwd.as_path()) {
        Ok(output) => {
            world.exit_code = Some(0);
            world.stdout = Some(output.stdout);
            world.stderr = Some(String::new());
        }
        Err(error) => {
            world.exit_code = Some(1);
            world.stdout = Some(String::new());
            world.stderr = Some(error.to_string());
        }
    }
}

fn prepare_directory(world: &mut BoardgateWorld) {
    let temp_dir = TempDir::new().expect("tempdir");
    world.working_directory = Some(temp_dir.path().to_path_buf());
    world.temp_dir = Some(temp_dir);
}

#[given("an empty directory")]
fn given_empty_directory(world: &mut BoardgateWorld) {
    prepare_directory(world);
}

#[given("a board initialized with the default workflow")]
fn given_initialized_board(world: &mut BoardgateWorld) {
    prepare_directory(world);
    run_cli(world, "boardgate init");
    assert_eq!(world.exit_code, Some(0), "init failed: {:?}", world.stderr);
}

#[when(expr = "I run {string}")]
fn when_run_command(world: &mut BoardgateWorld, command: String) {
    run_cli(world, &command);
}

#[then("the command should succeed")]
fn then_command_succeeds(world: &mut BoardgateWorld) {
    assert_eq!(world.exit_code, Some(0), "stderr: {:?}", world.stderr);
}

#[then("the command should fail")]
fn then_command_fails(world: &mut BoardgateWorld) {
    assert_eq!(world.exit_code, Some(1), "stdout: {:?}", world.stdout);
}

#[then(expr = "stdout should contain {string}")]
fn then_stdout_contains(world: &mut BoardgateWorld, text: String) {
    let stdout = world.stdout.as_deref().unwrap_or_default();
    assert!(stdout.contains(&text), "stdout was: {stdout}");
}

#[then(expr = "stderr should contain {string}")]
fn then_stderr_contains(world: &mut BoardgateWorld, text: String) {
    let stderr = world.stderr.as_deref().unwrap_or_default();
    assert!(stderr.contains(&text), "stderr was: {stderr}");
}

#[then(expr = "a {string} file should exist")]
fn then_file_exists(world: &mut BoardgateWorld, name: String) {
    let cwd = world.working_directory.as_ref().expect("cwd");
    assert!(cwd.join(name).is_file());
}
