use crate::profile::{
    aggregator::Aggregator,
    clock::Clock,
    format::filled,
    report::Report,
    sink::Sink,
};
use anyhow::{Context, Result};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackOptions {
    /// Skip the progress line printed on every task start.
    pub summary_only: bool,
}

/// What the callback needs to know about a starting task.
#[derive(Debug, Clone, Copy)]
pub struct TaskStart<'a> {
    pub role: Option<&'a str>,
    pub action: &'a str,
}

impl<'a> TaskStart<'a> {
    /// Tasks are profiled under their role; tasks outside any role under
    /// their action.
    pub fn unit(&self) -> &'a str {
        self.role.unwrap_or(self.action)
    }
}

/// Profiles roles from task lifecycle events and prints the recap when the
/// run ends.
pub struct ProfileRoles<S: Sink, C: Clock> {
    aggregator: Aggregator,
    options: CallbackOptions,
    sink: S,
    clock: C,
}

impl<S: Sink, C: Clock> ProfileRoles<S, C> {
    /// The run is considered started when the callback is created.
    pub fn new(options: CallbackOptions, sink: S, clock: C) -> Self {
        Self {
            aggregator: Aggregator::starting_at(clock.now()),
            options,
            sink,
            clock,
        }
    }

    pub fn on_task_start(&mut self, task: TaskStart<'_>) -> Result<()> {
        self.record_task(task)
    }

    pub fn on_handler_task_start(&mut self, task: TaskStart<'_>) -> Result<()> {
        self.record_task(task)
    }

    /// Prints the recap and returns the final report.
    #[instrument(skip(self))]
    pub fn on_stats(&mut self) -> Result<Report> {
        let now = self.clock.now();

        self.sink.banner("ROLES RECAP")?;
        self.sink.display(&self.aggregator.progress_line(now))?;
        self.sink.display(&filled("", '='))?;

        let report = self.aggregator.finalize_at(now);

        for line in report.lines() {
            self.sink.display(&line)?;
        }

        Ok(report)
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn record_task(&mut self, task: TaskStart<'_>) -> Result<()> {
        let now = self.clock.now();

        if !self.options.summary_only {
            self.sink.display(&self.aggregator.progress_line(now))?;
        }

        let unit = task.unit();

        debug!(unit, action = task.action, "task start");

        self.aggregator
            .begin_at(unit, now)
            .with_context(|| format!("Failed to profile task with action '{}'", task.action))
    }
}
