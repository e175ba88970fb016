use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use profile_roles::profile::format::{banner, filled, report_line};
use std::io::Write;
use tempfile::NamedTempFile;

const EVENTS: &str = r#"{"time": "2024-06-01T08:00:00Z", "event": "task_start", "role": "common", "action": "apt"}
{"time": "2024-06-01T08:00:02Z", "event": "task_start", "action": "shell"}
{"time": "2024-06-01T08:00:05Z", "event": "task_start", "role": "common", "action": "copy"}
{"time": "2024-06-01T08:00:09Z", "event": "stats"}
"#;

fn write_temp(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn cmd() -> Result<Command> {
    let mut cmd = Command::cargo_bin("profile-roles")?;
    cmd.env_remove("PROFILE_ROLES_SUMMARY_ONLY");
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_replay_report() -> Result<()> {
    let events = write_temp(EVENTS)?;

    let output = cmd()?
        .arg("replay")
        .arg(events.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output)?;
    let lines: Vec<&str> = stdout.lines().collect();

    // three progress lines, blank, banner, progress, separator, two units,
    // separator, total
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], banner("ROLES RECAP"));
    assert_eq!(lines[6], filled("", '='));
    assert_eq!(lines[7], report_line("common", 6.0));
    assert_eq!(lines[8], report_line("shell", 3.0));
    assert_eq!(lines[9], filled("", '~'));
    assert_eq!(lines[10], report_line("total", 9.0));

    Ok(())
}

#[test]
fn test_replay_summary_only_env() -> Result<()> {
    let events = write_temp(EVENTS)?;

    let output = cmd()?
        .env("PROFILE_ROLES_SUMMARY_ONLY", "true")
        .arg("replay")
        .arg(events.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output)?;
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "");
    assert_eq!(lines[1], banner("ROLES RECAP"));
    assert_eq!(lines[7], report_line("total", 9.0));

    Ok(())
}

#[test]
fn test_run_playbook() -> Result<()> {
    let playbook = write_temp(
        r#"---
name: site
tasks:
  - role: common
    shell: "true"
    notify: [restart web]
  - name: say hello
    debug:
      msg: hello
  - role: db
    pause:
      seconds: 0.1
handlers:
  - name: restart web
    role: web
    command: "true"
"#,
    )?;

    cmd()?
        .arg("run")
        .arg(playbook.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ROLES RECAP"))
        .stdout(predicate::str::contains("ok: [say hello] => \"msg\": \"hello\""))
        .stdout(predicate::str::is_match(r"(?m)^common -+ \d+\.\d{2}s$")?)
        .stdout(predicate::str::is_match(r"(?m)^db -+ \d+\.\d{2}s$")?)
        .stdout(predicate::str::is_match(r"(?m)^web -+ \d+\.\d{2}s$")?)
        .stdout(predicate::str::is_match(r"(?m)^debug -+ \d+\.\d{2}s$")?)
        .stdout(predicate::str::is_match(r"(?m)^total -+ \d+\.\d{2}s$")?);

    Ok(())
}

#[test]
fn test_run_summary_only_from_playbook() -> Result<()> {
    let playbook = write_temp(
        r#"---
summary_only: true
tasks:
  - role: common
    shell: "true"
"#,
    )?;

    cmd()?
        .arg("run")
        .arg(playbook.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\nROLES RECAP"));

    // the command line overrides the playbook
    cmd()?
        .env("PROFILE_ROLES_SUMMARY_ONLY", "no")
        .arg("run")
        .arg(playbook.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\nROLES RECAP").not());

    Ok(())
}

#[test]
fn test_run_failure_still_reports() -> Result<()> {
    let playbook = write_temp(
        r#"---
tasks:
  - role: broken
    shell: "exit 2"
  - role: skipped
    shell: "true"
"#,
    )?;

    cmd()?
        .arg("--summary-only")
        .arg("run")
        .arg(playbook.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("ROLES RECAP"))
        .stdout(predicate::str::is_match(r"(?m)^broken -+ \d+\.\d{2}s$")?)
        .stdout(predicate::str::contains("skipped").not())
        .stderr(predicate::str::contains("exit code 2"));

    Ok(())
}

#[test]
fn test_missing_file() -> Result<()> {
    cmd()?
        .arg("replay")
        .arg("does-not-exist.jsonl")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.jsonl"));

    Ok(())
}
