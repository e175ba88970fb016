use crate::{
    cli::{
        actions::{finish, Action},
        config::resolve_summary_only,
    },
    profile::{CallbackOptions, ProfileRoles, ReplayClock, Sink, TaskStart, WriterSink},
};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
};
use tracing::{debug, info, instrument, warn};

/// One recorded lifecycle event, e.g.
/// `{"time": "2024-06-01T08:00:00Z", "event": "task_start", "role": "common", "action": "shell"}`
#[derive(Debug, Deserialize, Clone)]
pub struct Event {
    #[serde(deserialize_with = "parse_time")]
    pub time: DateTime<Local>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    TaskStart {
        role: Option<String>,
        #[serde(default)]
        action: Option<String>,
    },
    HandlerTaskStart {
        role: Option<String>,
        #[serde(default)]
        action: Option<String>,
    },
    Stats,
}

impl EventKind {
    /// The task a start event describes. A missing action falls back to the
    /// role; blank values count as missing.
    pub fn task_start(&self) -> Result<TaskStart<'_>> {
        let (role, action) = match self {
            Self::TaskStart { role, action } | Self::HandlerTaskStart { role, action } => {
                (non_blank(role), non_blank(action))
            }
            Self::Stats => return Err(anyhow!("stats is not a task event")),
        };

        let action = action
            .or(role)
            .ok_or_else(|| anyhow!("task event needs a role or an action"))?;

        Ok(TaskStart { role, action })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

/// Parses an RFC 3339 timestamp into local time.
fn parse_time<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|time| time.with_timezone(&Local))
        .map_err(serde::de::Error::custom)
}

/// Handle the replay action
#[instrument(skip(action))]
pub fn handle(action: Action) -> Result<()> {
    let Action::Replay {
        events,
        summary_only,
    } = action
    else {
        return Err(anyhow!("replay: unexpected action"));
    };

    let file = File::open(&events).with_context(|| format!("Failed to open {}", events.display()))?;

    let events = read_events(BufReader::new(file))?;

    info!(events = events.len(), "replaying event log");

    let options = CallbackOptions {
        summary_only: resolve_summary_only(summary_only, None),
    };

    replay(&events, options, WriterSink::stdout())
}

/// Reads one JSON event per line, skipping blank lines.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let context = || format!("Failed to parse event on line {}", lineno + 1);

        let event: Event = serde_json::from_str(&line).with_context(context)?;

        if event.kind != EventKind::Stats {
            event.kind.task_start().with_context(context)?;
        }

        events.push(event);
    }

    Ok(events)
}

/// Feeds the events to the callback as if they were happening now. The run
/// starts at the first event; without a `stats` event it ends at the last one.
/// The recap is printed even when an event is rejected.
pub fn replay<S: Sink>(events: &[Event], options: CallbackOptions, sink: S) -> Result<()> {
    let start = events.first().map_or_else(Local::now, |event| event.time);

    let clock = ReplayClock::new(start);
    let mut callback = ProfileRoles::new(options, sink, clock.clone());

    let outcome = feed(events, &clock, &mut callback);

    let recap = callback.on_stats();

    finish(outcome, recap)
}

fn feed<S: Sink>(
    events: &[Event],
    clock: &ReplayClock,
    callback: &mut ProfileRoles<S, ReplayClock>,
) -> Result<()> {
    for (index, event) in events.iter().enumerate() {
        clock.set(event.time);

        debug!(time = %event.time, kind = ?event.kind, "replaying event");

        let context = || format!("Failed to replay event {}", index + 1);

        match &event.kind {
            EventKind::TaskStart { .. } => {
                callback
                    .on_task_start(event.kind.task_start().with_context(context)?)
                    .with_context(context)?;
            }
            EventKind::HandlerTaskStart { .. } => {
                callback
                    .on_handler_task_start(event.kind.task_start().with_context(context)?)
                    .with_context(context)?;
            }
            EventKind::Stats => {
                let ignored = events.len() - index - 1;

                if ignored > 0 {
                    warn!(ignored, "events after stats are ignored");
                }

                break;
            }
        }
    }

    Ok(())
}
