use std::collections::BTreeSet;
use std::path::PathBuf;

/// One launchable application (or one desktop action of an application).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,                // Display name, primary sort key
    pub generic_name: String,        // Empty when the descriptor has none
    pub command: Vec<String>,        // argv, field codes already expanded
    pub terminal: bool,
    pub keywords: BTreeSet<String>,  // Not used for scoring yet
    pub hidden: bool,                // Always false for catalog members
    pub working_dir: Option<PathBuf>,
}

impl AppEntry {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            generic_name: String::new(),
            command,
            terminal: false,
            keywords: BTreeSet::new(),
            hidden: false,
            working_dir: None,
        }
    }

    pub fn launch_command(&self) -> LaunchCommand {
        LaunchCommand {
            argv: self.command.clone(),
            terminal: self.terminal,
            working_dir: self.working_dir.clone(),
        }
    }
}

/// A process to start, inspectable before it is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub argv: Vec<String>,
    pub terminal: bool,
    pub working_dir: Option<PathBuf>,
}

/// What activating a result does. Interpreted by `executor::Executor::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Launch(LaunchCommand),
    Print(String),
}

/// A displayable row handed to the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedResult {
    pub display_text: String,
    pub secondary_text: Option<String>,
    pub action: Action,
}

impl RankedResult {
    pub fn text(line: impl Into<String>) -> Self {
        let line = line.into();
        Self {
            display_text: line.clone(),
            secondary_text: None,
            action: Action::Print(line),
        }
    }
}

impl From<&AppEntry> for RankedResult {
    fn from(entry: &AppEntry) -> Self {
        Self {
            display_text: entry.name.clone(),
            secondary_text: (!entry.generic_name.is_empty()).then(|| entry.generic_name.clone()),
            action: Action::Launch(entry.launch_command()),
        }
    }
}
