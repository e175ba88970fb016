use chrono::{DateTime, Local};
use std::{cell::Cell, rc::Rc};

/// Source of wall clock timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that reports whatever time it was last set to. Clones share the same
/// instant, so one handle can drive a callback that owns another.
#[derive(Debug, Clone)]
pub struct ReplayClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ReplayClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: chrono::TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}
