use crate::config::Config;
use crate::desktop_entry::parse_desktop_entries;
use crate::error::CatalogError;
use crate::model::AppEntry;
use crate::sources::Source;
use directories::BaseDirs;
use log::{debug, info, warn};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DESKTOP_EXTENSION: &str = "desktop";

/// Where to look for `applications/` directories.
#[derive(Debug, Clone)]
pub enum DataDirs {
    /// `$XDG_DATA_DIRS`, falling back to `default_dir`. `user_dir` (usually
    /// `$XDG_DATA_HOME`) is searched first when present.
    Xdg {
        default_dir: PathBuf,
        user_dir: Option<PathBuf>,
    },
    /// Application directories used as-is.
    Fixed(Vec<PathBuf>),
}

pub struct DesktopSource {
    data_dirs: DataDirs,
    actions_enabled: bool,
}

impl DesktopSource {
    pub fn new(data_dirs: DataDirs, actions_enabled: bool) -> Self {
        Self { data_dirs, actions_enabled }
    }

    pub fn from_config(config: &Config) -> Self {
        let user_dir = if config.sources.include_user_dir {
            BaseDirs::new().map(|dirs| dirs.data_dir().to_path_buf())
        } else {
            None
        };
        Self::new(
            DataDirs::Xdg {
                default_dir: config.sources.default_data_dir.clone(),
                user_dir,
            },
            config.general.desktop_actions_enabled,
        )
    }

    pub fn application_dirs(&self) -> Result<Vec<PathBuf>, CatalogError> {
        match &self.data_dirs {
            DataDirs::Fixed(dirs) => Ok(dirs.clone()),
            DataDirs::Xdg { default_dir, user_dir } => resolve_application_dirs(
                env::var("XDG_DATA_DIRS").ok().as_deref(),
                default_dir,
                user_dir.as_deref(),
            ),
        }
    }

    fn scan_dir(&self, dir: &Path, entries: &mut Vec<AppEntry>) {
        if !dir.is_dir() {
            warn!("Application directory {:?} is missing or not a directory, skipping", dir);
            return;
        }

        debug!("Scanning desktop files in {:?}", dir);
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!("Could not read an entry of {:?}: {}", dir, e);
                    continue;
                }
            };
            let path = item.path();
            if !item.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(DESKTOP_EXTENSION)
            {
                continue;
            }

            match fs::read(path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    entries.extend(parse_desktop_entries(&content, self.actions_enabled));
                }
                Err(e) => warn!("Could not open {:?}: {}", path, e),
            }
        }
    }
}

impl Source for DesktopSource {
    fn name(&self) -> &str {
        "desktop"
    }

    fn scan(&self) -> Result<Vec<AppEntry>, CatalogError> {
        let mut entries = Vec::new();
        for dir in self.application_dirs()? {
            self.scan_dir(&dir, &mut entries);
        }
        info!("DesktopSource: found {} entries", entries.len());
        Ok(entries)
    }
}

/// Turns the data-dir settings into the list of `applications/` directories,
/// user directory first, duplicates removed.
pub fn resolve_application_dirs(
    xdg_data_dirs: Option<&str>,
    default_dir: &Path,
    user_dir: Option<&Path>,
) -> Result<Vec<PathBuf>, CatalogError> {
    let system: Vec<PathBuf> = match xdg_data_dirs.filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .split(':')
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect(),
        None => {
            warn!("$XDG_DATA_DIRS is not set, falling back to {:?}", default_dir);
            if !default_dir.exists() {
                return Err(CatalogError::Configuration(default_dir.to_path_buf()));
            }
            vec![default_dir.to_path_buf()]
        }
    };

    let mut dirs: Vec<PathBuf> = Vec::new();
    for data_dir in user_dir.map(Path::to_path_buf).into_iter().chain(system) {
        let apps = data_dir.join("applications");
        if !dirs.contains(&apps) {
            dirs.push(apps);
        }
    }
    debug!("Application directories: {:?}", dirs);
    Ok(dirs)
}
