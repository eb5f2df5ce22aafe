use std::env;
use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use log::{debug, info, warn};
use nix::unistd::setsid;
use crate::config::Config;
use crate::error::LaunchError;
use crate::exec::parse_exec;
use crate::model::{Action, LaunchCommand};

/// Environment variables naming an interpreter environment whose `bin`
/// directories must not leak into launched applications.
const INTERPRETER_ENV_VARS: &[&str] = &["VIRTUAL_ENV", "CONDA_PREFIX"];

const FALLBACK_TERMINAL: &[&str] = &["xterm", "-e"];

/// Interprets `Action`s.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    terminal: Option<Vec<String>>,
}

impl Executor {
    pub fn new(terminal: Option<&str>) -> Self {
        let terminal = terminal.and_then(|t| match parse_exec(t) {
            Ok(argv) => Some(argv),
            Err(e) => {
                warn!("Ignoring terminal command {:?}: {}", t, e);
                None
            }
        });
        Self { terminal }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.general.terminal.as_deref())
    }

    pub fn run(&self, action: &Action) -> Result<(), LaunchError> {
        match action {
            Action::Launch(command) => self.launch(command),
            Action::Print(text) => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", text)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }

    /// The full argv that will be spawned, terminal wrapper included.
    pub fn command_line(&self, command: &LaunchCommand) -> Vec<String> {
        let mut argv = Vec::new();
        if command.terminal {
            argv.extend(self.terminal_prefix());
        }
        argv.extend(command.argv.iter().cloned());
        argv
    }

    fn terminal_prefix(&self) -> Vec<String> {
        if let Some(terminal) = &self.terminal {
            return terminal.clone();
        }
        match env::var("TERMINAL") {
            Ok(term) if !term.is_empty() => vec![term, "-e".to_string()],
            _ => FALLBACK_TERMINAL.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Starts the process detached in its own session and returns without
    /// waiting for it.
    fn launch(&self, launch: &LaunchCommand) -> Result<(), LaunchError> {
        let argv = self.command_line(launch);
        let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

        let mut command = Command::new(program);
        command.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = &launch.working_dir {
            command.current_dir(dir);
        }

        let roots = interpreter_roots();
        for var in INTERPRETER_ENV_VARS {
            command.env_remove(var);
        }
        if let Ok(path) = env::var("PATH") {
            command.env("PATH", sanitized_path(&path, &roots));
        }

        // SAFETY: setsid is async-signal-safe and touches no shared state.
        unsafe {
            command.pre_exec(|| {
                setsid()?;
                Ok(())
            });
        }

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;
        info!("Launched {:?} (pid {})", argv, child.id());

        // Reap the child so it does not linger as a zombie.
        thread::spawn(move || match child.wait() {
            Ok(status) => debug!("Launched process exited with {}", status),
            Err(e) => debug!("Could not wait for launched process: {}", e),
        });
        Ok(())
    }
}

fn interpreter_roots() -> Vec<PathBuf> {
    INTERPRETER_ENV_VARS
        .iter()
        .filter_map(|var| env::var_os(var))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `path` without empty or duplicate entries and without anything inside
/// `excluded_roots`.
pub fn sanitized_path(path: &str, excluded_roots: &[PathBuf]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for entry in path.split(':') {
        if entry.is_empty() || kept.contains(&entry) {
            continue;
        }
        if excluded_roots.iter().any(|root| Path::new(entry).starts_with(root)) {
            debug!("Dropping {:?} from PATH", entry);
            continue;
        }
        kept.push(entry);
    }
    kept.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(argv: &[&str], terminal: bool) -> LaunchCommand {
        LaunchCommand {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            terminal,
            working_dir: None,
        }
    }

    #[test]
    fn terminal_entries_are_wrapped() {
        let executor = Executor::new(Some("foot --app-id 'launched term' -e"));
        assert_eq!(
            executor.command_line(&launch(&["htop"], true)),
            vec!["foot", "--app-id", "launched term", "-e", "htop"]
        );
        assert_eq!(executor.command_line(&launch(&["gimp"], false)), vec!["gimp"]);
    }

    #[test]
    fn path_drops_virtualenv_entries() {
        let roots = vec![PathBuf::from("/home/u/.venv"), PathBuf::from("/opt/conda")];
        assert_eq!(
            sanitized_path("/home/u/.venv/bin:/usr/bin::/opt/conda/bin:/bin:/usr/bin", &roots),
            "/usr/bin:/bin"
        );
        assert_eq!(sanitized_path("/usr/bin:/home/u/.venvx/bin", &roots), "/usr/bin:/home/u/.venvx/bin");
    }

    #[test]
    fn launching_does_not_wait() {
        let executor = Executor::default();
        executor.run(&Action::Launch(launch(&["sleep", "5"], false))).unwrap();
    }

    #[test]
    fn spawn_failure_is_reported() {
        let executor = Executor::default();
        let err = executor
            .run(&Action::Launch(launch(&["/nonexistent/launchpad-app"], false)))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(matches!(
            executor.run(&Action::Launch(launch(&[], false))),
            Err(LaunchError::EmptyCommand)
        ));
    }
}
