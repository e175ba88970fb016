//! Elapsed time aggregation per unit of work (a role, or the task's action
//! when no role applies) and the callback that feeds it from task lifecycle
//! events.

pub mod aggregator;
pub mod callback;
pub mod clock;
pub mod error;
pub mod format;
pub mod report;
pub mod sink;

pub use self::aggregator::Aggregator;
pub use self::callback::{CallbackOptions, ProfileRoles, TaskStart};
pub use self::clock::{Clock, ReplayClock, SystemClock};
pub use self::error::ProfileError;
pub use self::report::{Report, ReportEntry};
pub use self::sink::{Sink, WriterSink};
