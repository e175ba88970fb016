//! Console formatting shared by the progress lines and the recap.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Target width of filled and banner lines.
pub const LINE_WIDTH: usize = 79;

/// Minimum number of fill characters, even when the message overflows.
const MIN_FILL: usize = 3;

/// Wall clock rendering used in progress lines.
pub const TIME_FORMAT: &str = "%A %d %B %Y  %H:%M:%S %z";

/// Formats fractional seconds as `H:MM:SS.mmm`.
///
/// Milliseconds are rounded before being split, so no field ever carries over
/// (59.9996 seconds renders as `0:01:00.000`, never `0:00:60.000`). Negative
/// and NaN inputs render as zero.
pub fn seconds_to_str(t: f64) -> String {
    let millis = (t.max(0.0) * 1000.0).round() as u64;

    let (seconds, ms) = (millis / 1000, millis % 1000);
    let (minutes, s) = (seconds / 60, seconds % 60);
    let (hours, m) = (minutes / 60, minutes % 60);

    format!("{hours}:{m:02}:{s:02}.{ms:03}")
}

/// Pads `msg` with `fill` up to [`LINE_WIDTH`] and appends a trailing space.
pub fn filled(msg: &str, fill: char) -> String {
    let (msg, width) = if msg.is_empty() {
        (String::new(), LINE_WIDTH)
    } else {
        let msg = format!("{msg} ");
        let width = LINE_WIDTH.saturating_sub(msg.chars().count());
        (msg, width)
    };

    let filler: String = std::iter::repeat(fill).take(width.max(MIN_FILL)).collect();

    format!("{msg}{filler} ")
}

/// Section header in the style of the other run summaries: the trimmed
/// message followed by a run of `*`.
pub fn banner(msg: &str) -> String {
    let msg = msg.trim();
    let stars = LINE_WIDTH.saturating_sub(msg.chars().count()).max(MIN_FILL);

    format!("{msg} {}", "*".repeat(stars))
}

/// One recap row: the name dash-padded to 70 columns, then the seconds
/// right-aligned in 9 columns.
pub fn report_line(name: &str, seconds: f64) -> String {
    format!("{:-<70}{:->9}", format!("{name} "), format!(" {seconds:.2}s"))
}

/// Progress line body: current time, time since the previous transition and
/// time since the run started.
pub fn progress<Tz>(now: &DateTime<Tz>, since_last: f64, since_start: f64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    filled(
        &format!(
            "{} ({}){}{}",
            now.format(TIME_FORMAT),
            seconds_to_str(since_last),
            " ".repeat(7),
            seconds_to_str(since_start)
        ),
        '*',
    )
}
