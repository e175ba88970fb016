use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        BoolishValueParser, ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};
use std::{fs, path::PathBuf};

pub const SUMMARY_ONLY_ENV: &str = "PROFILE_ROLES_SUMMARY_ONLY";

pub fn validator_is_file() -> ValueParser {
    ValueParser::from(move |s: &str| -> std::result::Result<PathBuf, String> {
        if let Ok(metadata) = fs::metadata(s) {
            if metadata.is_file() {
                return Ok(PathBuf::from(s));
            }
        }

        Err(format!("Invalid file path of file does not exists: '{s}'"))
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("profile-roles")
        .about("Per-role elapsed time profiling for sequential task runs ⏱")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("summary-only")
                .long("summary-only")
                .help("Only show the recap, not a progress line per task")
                .env(SUMMARY_ONLY_ENV)
                .value_parser(BoolishValueParser::new())
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase verbosity, -vv for debug")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run a playbook and profile its roles")
                .arg(
                    Arg::new("playbook")
                        .help("Path to the playbook file")
                        .default_value("playbook.yml")
                        .value_parser(validator_is_file())
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Profile roles from a recorded event log (JSON lines)")
                .arg(
                    Arg::new("events")
                        .help("Path to the event log")
                        .required(true)
                        .value_parser(validator_is_file())
                        .value_name("FILE"),
                ),
        )
}
