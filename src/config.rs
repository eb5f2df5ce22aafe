use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use anyhow::Result;
use std::fs;

use crate::router::BackendKind;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub prefixes: PrefixConfig,
    #[serde(default)]
    pub backends: BackendConfig,
    #[serde(default)]
    pub sources: SourceConfig,
    #[serde(default)]
    pub files: FileSearchConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeneralConfig {
    /// Wrapper for `Terminal=true` entries, e.g. "foot -e".
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub desktop_actions_enabled: bool,
    /// Also score the query against GenericName.
    #[serde(default)]
    pub match_generic_name: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PrefixConfig {
    #[serde(default = "default_dictionary_prefixes")]
    pub dictionary: Vec<String>,
    #[serde(default = "default_calculator_prefixes")]
    pub calculator: Vec<String>,
    #[serde(default = "default_file_prefixes")]
    pub files: Vec<String>,
}

fn default_dictionary_prefixes() -> Vec<String> { vec!["!d".to_string()] }
fn default_calculator_prefixes() -> Vec<String> { vec!["/".to_string()] }
fn default_file_prefixes() -> Vec<String> { vec!["~".to_string()] }

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary_prefixes(),
            calculator: default_calculator_prefixes(),
            files: default_file_prefixes(),
        }
    }
}

impl PrefixConfig {
    /// Prefixes in router priority order.
    pub fn routes(&self) -> Vec<(String, BackendKind)> {
        self.dictionary
            .iter()
            .map(|p| (p.clone(), BackendKind::Dictionary))
            .chain(self.calculator.iter().map(|p| (p.clone(), BackendKind::Calculator)))
            .chain(self.files.iter().map(|p| (p.clone(), BackendKind::Files)))
            .collect()
    }
}

/// Command lines of the external collaborators. The query is appended as
/// the last argument.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BackendConfig {
    pub dictionary: Option<String>,
    pub calculator: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_data_dir")]
    pub default_data_dir: PathBuf,
    #[serde(default = "default_true")]
    pub include_user_dir: bool,
}

fn default_data_dir() -> PathBuf { PathBuf::from("/usr/share/") }
fn default_true() -> bool { true }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_data_dir: default_data_dir(),
            include_user_dir: true,
        }
    }
}

/// Local file search. Directories are relative to the home directory.
#[derive(Deserialize, Debug, Clone)]
pub struct FileSearchConfig {
    #[serde(default = "default_search_directories")]
    pub search_directories: Vec<PathBuf>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_file_limit")]
    pub limit: usize,
}

fn default_search_directories() -> Vec<PathBuf> {
    ["Desktop", "Documents", "Downloads"].iter().map(PathBuf::from).collect()
}
fn default_max_depth() -> usize { 6 }
fn default_file_limit() -> usize { 50 }

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            search_directories: default_search_directories(),
            max_depth: default_max_depth(),
            limit: default_file_limit(),
        }
    }
}

pub fn config_path() -> PathBuf {
    match ProjectDirs::from("org", "launchpad", "launchpad") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
