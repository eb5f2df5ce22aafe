use std::path::PathBuf;
use thiserror::Error;

/// A single descriptor group (or Exec value) that cannot become an entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed entry: missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("malformed entry: empty Exec command")]
    EmptyCommand,
    #[error("malformed entry: unterminated quote in Exec `{0}`")]
    UnterminatedQuote(String),
    #[error("malformed entry: dangling backslash in Exec `{0}`")]
    DanglingEscape(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no application directories: $XDG_DATA_DIRS is unset and {0:?} does not exist")]
    Configuration(PathBuf),
    #[error("no catalog source produced entries")]
    NoSources,
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("nothing to activate")]
    NothingSelected,
    #[error("empty command line")]
    EmptyCommand,
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
