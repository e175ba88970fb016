use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{collections::HashSet, fs::File, path::Path, time::Duration};
use strum::{AsRefStr, VariantNames};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Playbook {
    pub name: Option<String>,
    pub summary_only: Option<bool>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub handlers: Vec<Task>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Task {
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub notify: Vec<String>,
    #[serde(default)]
    pub ignore_errors: bool,
    #[serde(flatten)]
    pub module: Module,
    /// Keys left over once the module is taken, checked by `validate`
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

/// The work a task performs. The variant name doubles as the task's action.
#[derive(Debug, Deserialize, Clone, AsRefStr, VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Module {
    /// Run through `$SHELL -c`
    Shell(String),
    /// Run directly, arguments split on whitespace
    Command(String),
    Pause { seconds: f64 },
    Debug { msg: String },
}

impl Task {
    pub fn action(&self) -> &str {
        self.module.as_ref()
    }

    /// Name used in logs: the task name, else the action.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.action())
    }
}

impl Playbook {
    pub fn new(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        let playbook: Self =
            serde_yaml::from_reader(file).context("Failed to parse playbook file")?;

        playbook.validate()?;

        Ok(playbook)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let playbook: Self = serde_yaml::from_str(contents).context("Failed to parse playbook")?;

        playbook.validate()?;

        Ok(playbook)
    }

    pub fn get_handler(&self, name: &str) -> Option<&Task> {
        self.handlers
            .iter()
            .find(|handler| handler.name.as_deref() == Some(name))
    }

    fn validate(&self) -> Result<()> {
        let mut handler_names = HashSet::new();

        for handler in &self.handlers {
            let name = handler
                .name
                .as_deref()
                .ok_or_else(|| anyhow!("Handlers must have a name"))?;

            if !handler_names.insert(name) {
                return Err(anyhow!("Duplicate handler: {}", name));
            }
        }

        for task in self.tasks.iter().chain(self.handlers.iter()) {
            if let Some(role) = &task.role {
                if role.trim().is_empty() {
                    return Err(anyhow!(
                        "Empty role in task '{}'",
                        task.display_name()
                    ));
                }
            }

            if let Module::Pause { seconds } = task.module {
                Duration::try_from_secs_f64(seconds).with_context(|| {
                    format!(
                        "Invalid pause in task '{}': {}",
                        task.display_name(),
                        seconds
                    )
                })?;
            }

            for key in task.extra.keys() {
                let key = key.as_str().unwrap_or_default();

                if Module::VARIANTS.contains(&key) {
                    return Err(anyhow!(
                        "Task '{}' has more than one module: {} and {}",
                        task.display_name(),
                        task.action(),
                        key
                    ));
                }

                warn!(task = task.display_name(), key, "ignoring unknown task key");
            }
        }

        for task in &self.tasks {
            for handler in &task.notify {
                if !handler_names.contains(handler.as_str()) {
                    return Err(anyhow!(
                        "Task '{}' notifies unknown handler: {}",
                        task.display_name(),
                        handler
                    ));
                }
            }
        }

        Ok(())
    }
}

/// `summary_only` from the command line (flag or environment) wins over the
/// playbook, which wins over the default.
pub fn resolve_summary_only(cli: Option<bool>, playbook: Option<bool>) -> bool {
    cli.or(playbook).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PLAYBOOK: &str = r#"---
name: site
summary_only: true
tasks:
  - name: install packages
    role: common
    shell: "true"
    notify:
      - restart web
  - command: echo hello
  - name: wait
    pause:
      seconds: 0.5
  - debug:
      msg: done
    ignore_errors: true
handlers:
  - name: restart web
    role: web
    shell: "true"
"#;

    fn write_playbook(contents: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_parse() -> Result<()> {
        let file = write_playbook(PLAYBOOK)?;
        let playbook = Playbook::new(file.path())?;

        assert_eq!(playbook.name.as_deref(), Some("site"));
        assert_eq!(playbook.summary_only, Some(true));
        assert_eq!(playbook.tasks.len(), 4);
        assert_eq!(playbook.handlers.len(), 1);

        let first = &playbook.tasks[0];
        assert_eq!(first.role.as_deref(), Some("common"));
        assert_eq!(first.action(), "shell");
        assert_eq!(first.notify, vec!["restart web"]);
        assert!(!first.ignore_errors);

        let second = &playbook.tasks[1];
        assert_eq!(second.action(), "command");
        assert_eq!(second.display_name(), "command");
        assert!(matches!(&second.module, Module::Command(cmd) if cmd == "echo hello"));

        assert!(matches!(playbook.tasks[2].module, Module::Pause { seconds } if seconds == 0.5));
        assert_eq!(playbook.tasks[3].action(), "debug");
        assert!(playbook.tasks[3].ignore_errors);

        let handler = playbook.get_handler("restart web");
        assert_eq!(handler.and_then(|h| h.role.as_deref()), Some("web"));
        assert!(playbook.get_handler("missing").is_none());

        Ok(())
    }

    #[test]
    fn test_unknown_handler() -> Result<()> {
        let file = write_playbook(
            r#"---
tasks:
  - shell: "true"
    notify: [nope]
"#,
        )?;

        let err = Playbook::new(file.path()).unwrap_err();
        assert!(err.to_string().contains("unknown handler: nope"));

        Ok(())
    }

    #[test]
    fn test_unnamed_handler() -> Result<()> {
        let file = write_playbook(
            r#"---
handlers:
  - shell: "true"
"#,
        )?;

        assert!(Playbook::new(file.path()).is_err());

        Ok(())
    }

    #[test]
    fn test_empty_role() -> Result<()> {
        let file = write_playbook(
            r#"---
tasks:
  - role: "  "
    shell: "true"
"#,
        )?;

        assert!(Playbook::new(file.path()).is_err());

        Ok(())
    }

    #[test]
    fn test_missing_module() -> Result<()> {
        let file = write_playbook(
            r#"---
tasks:
  - name: nothing to do
"#,
        )?;

        assert!(Playbook::new(file.path()).is_err());

        Ok(())
    }

    #[test]
    fn test_negative_pause() -> Result<()> {
        let file = write_playbook(
            r#"---
tasks:
  - pause:
      seconds: -1
"#,
        )?;

        assert!(Playbook::new(file.path()).is_err());

        Ok(())
    }

    #[test]
    fn test_pause_too_long() -> Result<()> {
        let file = write_playbook(
            r#"---
tasks:
  - pause:
      seconds: 1e30
"#,
        )?;

        let err = Playbook::new(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid pause"));

        Ok(())
    }

    #[test]
    fn test_more_than_one_module() {
        let err = Playbook::parse(
            r#"---
tasks:
  - shell: "true"
    command: "false"
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("more than one module"));
    }

    #[test]
    fn test_unknown_key_is_ignored() -> Result<()> {
        let playbook = Playbook::parse(
            r#"---
tasks:
  - shell: "true"
    tags: [setup]
"#,
        )?;

        assert_eq!(playbook.tasks[0].action(), "shell");

        Ok(())
    }

    #[test]
    fn test_empty_playbook() -> Result<()> {
        let file = write_playbook("---\nname: empty\n")?;
        let playbook = Playbook::new(file.path())?;

        assert!(playbook.tasks.is_empty());
        assert!(playbook.handlers.is_empty());
        assert_eq!(playbook.summary_only, None);

        Ok(())
    }

    #[test]
    fn test_resolve_summary_only() {
        assert!(!resolve_summary_only(None, None));
        assert!(resolve_summary_only(None, Some(true)));
        assert!(!resolve_summary_only(Some(false), Some(true)));
        assert!(resolve_summary_only(Some(true), Some(false)));
    }
}
