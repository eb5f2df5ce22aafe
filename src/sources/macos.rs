use crate::error::CatalogError;
use crate::model::AppEntry;
use crate::sources::Source;
use directories::BaseDirs;
use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `.app` bundles, launched through `open`.
pub struct MacAppsSource {
    dirs: Vec<PathBuf>,
}

impl MacAppsSource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn system() -> Self {
        let mut dirs = vec![PathBuf::from("/Applications")];
        if let Some(base) = BaseDirs::new() {
            dirs.push(base.home_dir().join("Applications"));
        }
        dirs.push(PathBuf::from("/System/Applications"));
        Self::new(dirs)
    }
}

fn is_bundle(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("app")
}

impl Source for MacAppsSource {
    fn name(&self) -> &str {
        "macos"
    }

    fn scan(&self) -> Result<Vec<AppEntry>, CatalogError> {
        let mut entries = Vec::new();

        for dir in &self.dirs {
            if !dir.is_dir() {
                warn!("Application directory {:?} does not exist, skipping", dir);
                continue;
            }

            let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name().into_iter();
            while let Some(item) = walker.next() {
                let item = match item {
                    Ok(item) => item,
                    Err(e) => {
                        warn!("Could not read an entry of {:?}: {}", dir, e);
                        continue;
                    }
                };
                if !is_bundle(item.path()) {
                    continue;
                }
                // Bundles are directories, their contents are not apps.
                if item.file_type().is_dir() {
                    walker.skip_current_dir();
                }

                let Some(name) = item.path().file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                entries.push(AppEntry::new(
                    name,
                    vec!["open".to_string(), item.path().to_string_lossy().to_string()],
                ));
            }
        }

        info!("MacAppsSource: found {} entries", entries.len());
        Ok(entries)
    }
}
