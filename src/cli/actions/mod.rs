pub mod replay;
pub mod run;

use crate::profile::Report;
use anyhow::{anyhow, Context, Result};
use std::{env, path::PathBuf};
use tokio::process::Command;
use tracing::error;

#[derive(Debug)]
pub enum Action {
    Run {
        playbook: PathBuf,
        summary_only: Option<bool>,
    },
    Replay {
        events: PathBuf,
        summary_only: Option<bool>,
    },
}

/// Runs `cmd` through the user's shell and returns its exit code.
async fn execute_shell_command(cmd: &str) -> Result<i32> {
    let shell = env::var("SHELL").unwrap_or_else(|_| "sh".to_string());
    let output = Command::new(shell).arg("-c").arg(cmd).output().await?;

    exit_code(output.status)
}

/// Runs `cmd` without a shell, splitting the program and its arguments on
/// whitespace, and returns its exit code.
async fn execute_command(cmd: &str) -> Result<i32> {
    let mut parts = cmd.split_whitespace();
    let program = parts.next().context("Empty command")?;

    let output = Command::new(program)
        .args(parts)
        .output()
        .await
        .with_context(|| format!("Failed to execute: {program}"))?;

    exit_code(output.status)
}

/// Combines the outcome of a run with printing its recap. A run failure is
/// returned ahead of a recap failure, which is then only logged.
fn finish(outcome: Result<()>, recap: Result<Report>) -> Result<()> {
    let recap = recap.context("Failed to print the recap");

    match (outcome, recap) {
        (Err(e), Err(recap_error)) => {
            error!("{:#}", recap_error);
            Err(e)
        }
        (Err(e), Ok(_)) => Err(e),
        (Ok(()), recap) => recap.map(|_| ()),
    }
}

fn exit_code(status: std::process::ExitStatus) -> Result<i32> {
    match status.code() {
        Some(code) => Ok(code),
        None => Err(anyhow!("Process terminated by signal")),
    }
}
