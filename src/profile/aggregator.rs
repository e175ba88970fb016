use crate::profile::{error::ProfileError, format, report::Report};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Unit currently accumulating time and when it became current.
#[derive(Debug, Clone)]
struct Interval {
    unit: String,
    start: DateTime<Local>,
}

/// Accumulates wall clock time per unit name.
///
/// At most one interval is open at a time. Starting a unit closes the open
/// interval and credits its span to the unit that was current, so the time
/// between two transitions always belongs to the earlier unit. Names may
/// repeat; their spans add up.
#[derive(Debug, Clone)]
pub struct Aggregator {
    run_start: DateTime<Local>,
    last_transition: DateTime<Local>,
    open: Option<Interval>,
    totals: HashMap<String, f64>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Anchors the run start and the last transition at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Local>) -> Self {
        Self {
            run_start: now,
            last_transition: now,
            open: None,
            totals: HashMap::new(),
        }
    }

    /// Makes `unit` current as of the wall clock.
    /// # Errors
    /// Will return an error if `unit` is empty or only whitespace
    pub fn begin(&mut self, unit: &str) -> Result<(), ProfileError> {
        self.begin_at(unit, Local::now())
    }

    /// Closes the open interval at `now` and opens one for `unit`.
    /// # Errors
    /// Will return an error if `unit` is empty or only whitespace, in which
    /// case nothing is recorded
    pub fn begin_at(&mut self, unit: &str, now: DateTime<Local>) -> Result<(), ProfileError> {
        if unit.trim().is_empty() {
            return Err(ProfileError::InvalidArgument(format!(
                "unit name must not be empty: {unit:?}"
            )));
        }

        self.close(now);

        debug!(unit, "unit started");

        self.open = Some(Interval {
            unit: unit.to_string(),
            start: now,
        });
        self.last_transition = now;

        Ok(())
    }

    /// Closes the open interval against the wall clock and returns the report.
    pub fn finalize(&mut self) -> Report {
        self.finalize_at(Local::now())
    }

    /// Closes the open interval at `now`, if any, and returns the report.
    /// Calling it again without a new `begin` returns the same report.
    pub fn finalize_at(&mut self, now: DateTime<Local>) -> Report {
        self.close(now);
        self.last_transition = now;

        Report::from_totals(&self.totals)
    }

    /// Current time, time since the last transition and time since the run
    /// started, as a `*` filled line.
    pub fn progress_line(&self, now: DateTime<Local>) -> String {
        format::progress(
            &now,
            elapsed(self.last_transition, now),
            elapsed(self.run_start, now),
        )
    }

    pub fn current(&self) -> Option<&str> {
        self.open.as_ref().map(|interval| interval.unit.as_str())
    }

    pub fn total_for(&self, unit: &str) -> Option<f64> {
        self.totals.get(unit).copied()
    }

    pub fn run_start(&self) -> DateTime<Local> {
        self.run_start
    }

    fn close(&mut self, now: DateTime<Local>) {
        if let Some(interval) = self.open.take() {
            let span = elapsed(interval.start, now);

            debug!(unit = %interval.unit, seconds = span, "unit finished");

            *self.totals.entry(interval.unit).or_insert(0.0) += span;
        }
    }
}

/// Seconds from `from` to `to`. A clock stepping backwards counts as zero.
fn elapsed(from: DateTime<Local>, to: DateTime<Local>) -> f64 {
    match (to - from).to_std() {
        Ok(span) => span.as_secs_f64(),
        Err(_) => {
            warn!(%from, %to, "clock went backwards, counting span as zero");
            0.0
        }
    }
}
