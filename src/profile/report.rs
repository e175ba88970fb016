use crate::profile::format::{filled, report_line};
use std::{cmp::Ordering, collections::HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub unit: String,
    pub seconds: f64,
}

/// Per unit totals, largest first, plus the grand total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    pub total: f64,
}

impl Report {
    /// Builds a report from accumulated totals. Equal totals are ordered by
    /// unit name so the output is stable between runs.
    pub fn from_totals(totals: &HashMap<String, f64>) -> Self {
        let mut entries: Vec<ReportEntry> = totals
            .iter()
            .map(|(unit, seconds)| ReportEntry {
                unit: unit.clone(),
                seconds: *seconds,
            })
            .collect();

        entries.sort_by(|a, b| match b.seconds.total_cmp(&a.seconds) {
            Ordering::Equal => a.unit.cmp(&b.unit),
            ordering => ordering,
        });

        // starts at +0.0 so an empty report prints `0.00s`
        let total = entries
            .iter()
            .fold(0.0, |total, entry| total + entry.seconds);

        Self { entries, total }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, unit: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.unit == unit)
            .map(|entry| entry.seconds)
    }

    /// Recap rows: one per unit, the `~` separator and the `total` row.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|entry| report_line(&entry.unit, entry.seconds))
            .collect();

        lines.push(filled("", '~'));
        lines.push(report_line("total", self.total));

        lines
    }
}
