use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use clap::parser::ValueSource;
use std::path::PathBuf;

/// Helper function to get subcommand matches
pub fn get_subcommand_matches<'a>(
    matches: &'a clap::ArgMatches,
    subcommand: &str,
) -> Result<&'a clap::ArgMatches> {
    matches
        .subcommand_matches(subcommand)
        .context("arguments not found")
}

/// `summary_only` only when set explicitly, so the playbook can still decide.
fn summary_only(matches: &clap::ArgMatches) -> Option<bool> {
    match matches.value_source("summary-only") {
        Some(ValueSource::CommandLine | ValueSource::EnvVariable) => {
            matches.get_one::<bool>("summary-only").copied()
        }
        _ => None,
    }
}

fn get_path(matches: &clap::ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .with_context(|| format!("missing argument: {name}"))
}

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let summary_only = summary_only(matches);

    match matches.subcommand_name() {
        Some("run") => Ok(Action::Run {
            playbook: get_path(get_subcommand_matches(matches, "run")?, "playbook")?,
            summary_only,
        }),

        Some("replay") => Ok(Action::Replay {
            events: get_path(get_subcommand_matches(matches, "replay")?, "events")?,
            summary_only,
        }),

        _ => Err(anyhow!("no subcommand given")),
    }
}
