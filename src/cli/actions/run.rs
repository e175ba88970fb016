use crate::{
    cli::{
        actions::{execute_command, execute_shell_command, finish, Action},
        config::{resolve_summary_only, Module, Playbook, Task},
    },
    profile::{CallbackOptions, Clock, ProfileRoles, Sink, SystemClock, TaskStart, WriterSink},
};
use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Handle the run action
#[instrument(skip(action))]
pub async fn handle(action: Action) -> Result<()> {
    let Action::Run {
        playbook,
        summary_only,
    } = action
    else {
        return Err(anyhow!("run: unexpected action"));
    };

    let playbook = Playbook::new(&playbook)?;

    let options = CallbackOptions {
        summary_only: resolve_summary_only(summary_only, playbook.summary_only),
    };

    info!(
        playbook = playbook.name.as_deref().unwrap_or_default(),
        tasks = playbook.tasks.len(),
        summary_only = options.summary_only,
        "starting run"
    );

    let mut callback = ProfileRoles::new(options, WriterSink::stdout(), SystemClock);

    let outcome = run_playbook(&playbook, &mut callback).await;

    // The recap is printed even when a task failed
    let recap = callback.on_stats();

    finish(outcome, recap)
}

/// Runs every task in order, then each notified handler once.
pub async fn run_playbook<S: Sink, C: Clock>(
    playbook: &Playbook,
    callback: &mut ProfileRoles<S, C>,
) -> Result<()> {
    let mut notified: Vec<&str> = Vec::new();

    for task in &playbook.tasks {
        callback.on_task_start(task_start(task))?;

        if run_task(task, callback).await? {
            for handler in &task.notify {
                if !notified.contains(&handler.as_str()) {
                    notified.push(handler);
                }
            }
        }
    }

    for handler in playbook
        .handlers
        .iter()
        .filter(|handler| matches!(handler.name.as_deref(), Some(name) if notified.contains(&name)))
    {
        callback.on_handler_task_start(task_start(handler))?;

        run_task(handler, callback).await?;
    }

    Ok(())
}

fn task_start(task: &Task) -> TaskStart<'_> {
    TaskStart {
        role: task.role.as_deref(),
        action: task.action(),
    }
}

/// Returns whether the task succeeded. A failure is an error unless the task
/// ignores errors.
async fn run_task<S: Sink, C: Clock>(
    task: &Task,
    callback: &mut ProfileRoles<S, C>,
) -> Result<bool> {
    let name = task.display_name();

    debug!(task = name, action = task.action(), "running task");

    let result = match &task.module {
        Module::Shell(cmd) => execute_shell_command(cmd).await,
        Module::Command(cmd) => execute_command(cmd).await,
        Module::Pause { seconds } => match Duration::try_from_secs_f64(*seconds) {
            Ok(pause) => {
                tokio::time::sleep(pause).await;
                Ok(0)
            }
            Err(e) => Err(e.into()),
        },
        Module::Debug { msg } => callback
            .sink_mut()
            .display(&format!("ok: [{name}] => \"msg\": \"{msg}\""))
            .map(|()| 0)
            .map_err(Into::into),
    };

    let failure = match result {
        Ok(0) => return Ok(true),
        Ok(code) => anyhow!("Task '{}' failed with exit code {}", name, code),
        Err(e) => e.context(format!("Task '{name}' failed")),
    };

    if task.ignore_errors {
        warn!(task = name, "ignoring error: {:#}", failure);
        Ok(false)
    } else {
        error!(task = name, "{:#}", failure);
        Err(failure)
    }
}
