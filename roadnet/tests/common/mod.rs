//! Shared integration-test harness for running the `roadnet` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Fixture path as a `String`, for use as a command-line argument.
#[allow(clippy::missing_panics_doc)]
pub fn fixture_arg(name: &str) -> String {
    fixture_path(name)
        .to_str()
        .expect("non-UTF-8 fixture path")
        .to_string()
}

/// Runs `roadnet` with `args` and waits for it to exit.
///
/// The environment variables that change defaults are cleared so the
/// host environment cannot leak into the test.
#[allow(clippy::missing_panics_doc)]
pub fn run(args: &[&str]) -> Output {
    run_with_env(args, &[])
}

/// Like [`run`], with extra environment variables.
#[allow(clippy::missing_panics_doc)]
pub fn run_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_roadnet"));
    command
        .args(args)
        .env_remove("ROADNET_BACKEND")
        .env_remove("ROADNET_COLOR")
        .env_remove("ROADNET_LOG_FORMAT")
        .env_remove("ROADNET_LOG_LEVEL")
        .env_remove("ROADNET_MAX_PHASE_RINGS")
        .env_remove("ROADNET_MAX_RULES_FILE_SIZE")
        .env_remove("MULTILANE_RESOURCE_ROOT")
        .env_remove("MALIPUT_MALIDRIVE_RESOURCE_ROOT")
        .env_remove("MALIPUT_OSM_RESOURCE_ROOT");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("failed to run roadnet")
}

/// Stdout of a finished process as UTF-8.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished process as UTF-8.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Asserts a zero exit status, printing stderr otherwise.
#[allow(clippy::missing_panics_doc)]
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "expected success, got {:?}\nstderr:\n{}",
        output.status.code(),
        stderr(output)
    );
}
