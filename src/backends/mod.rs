use crate::config::Config;
use crate::error::ParseError;
use crate::exec::parse_exec;
use crate::model::RankedResult;
use crate::router::BackendKind;
use log::{debug, warn};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::Arc;

pub mod files;

pub use files::FileBackend;

/// A non-app search: text in, displayable rows out.
pub trait Backend: Send + Sync {
    fn search(&self, text: &str) -> Vec<RankedResult>;
}

/// Runs an external program with the query as its last argument; each
/// non-empty line of its output is one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn parse(command_line: &str) -> Result<Self, ParseError> {
        let mut argv = parse_exec(command_line)?;
        let program = argv.remove(0);
        Ok(Self { program, args: argv })
    }
}

impl Backend for CommandBackend {
    fn search(&self, text: &str) -> Vec<RankedResult> {
        if text.is_empty() {
            return Vec::new();
        }

        debug!("Running {} {:?} {:?}", self.program, self.args, text);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(RankedResult::text)
                .collect(),
            Ok(output) => {
                warn!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Could not run {}: {}", self.program, e);
                Vec::new()
            }
        }
    }
}

pub type Backends = HashMap<BackendKind, Arc<dyn Backend>>;

pub fn backends_from_config(config: &Config) -> Backends {
    let mut backends: Backends = HashMap::new();
    for (kind, command) in [
        (BackendKind::Dictionary, &config.backends.dictionary),
        (BackendKind::Calculator, &config.backends.calculator),
    ] {
        let Some(command) = command else { continue };
        match CommandBackend::parse(command) {
            Ok(backend) => {
                backends.insert(kind, Arc::new(backend));
            }
            Err(e) => warn!("Ignoring {:?} backend {:?}: {}", kind, command, e),
        }
    }
    if let Some(files) = FileBackend::from_config(&config.files) {
        backends.insert(BackendKind::Files, Arc::new(files));
    }
    backends
}
