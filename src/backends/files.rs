use crate::backends::Backend;
use crate::config::FileSearchConfig;
use crate::matcher::{QueryCell, Rankable, Scorer};
use crate::model::{Action, LaunchCommand, RankedResult};
use directories::BaseDirs;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
struct FileHit {
    name: String,
    path: PathBuf,
}

impl Rankable for FileHit {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Files under a set of directories, ranked by file name and opened with the
/// desktop's default handler.
pub struct FileBackend {
    roots: Vec<PathBuf>,
    max_depth: usize,
    limit: usize,
    files: Mutex<Option<Arc<[FileHit]>>>,
}

impl FileBackend {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize, limit: usize) -> Self {
        Self {
            roots,
            max_depth,
            limit,
            files: Mutex::new(None),
        }
    }

    pub fn from_config(config: &FileSearchConfig) -> Option<Self> {
        let Some(base) = BaseDirs::new() else {
            warn!("No home directory, file search is disabled");
            return None;
        };
        let roots = config
            .search_directories
            .iter()
            .map(|dir| base.home_dir().join(dir))
            .collect();
        Some(Self::new(roots, config.max_depth, config.limit))
    }

    // Walked once; the lock is held so concurrent searches share one walk.
    fn files(&self) -> Arc<[FileHit]> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = files.as_ref() {
            return Arc::clone(found);
        }

        let start = Instant::now();
        let mut found = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                debug!("File search directory {:?} does not exist, skipping", root);
                continue;
            }
            let walker = WalkDir::new(root)
                .max_depth(self.max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

            for item in walker {
                let item = match item {
                    Ok(item) => item,
                    Err(e) => {
                        debug!("Skipping unreadable path under {:?}: {}", root, e);
                        continue;
                    }
                };
                if !item.file_type().is_file() {
                    continue;
                }
                found.push(FileHit {
                    name: item.file_name().to_string_lossy().into_owned(),
                    path: item.into_path(),
                });
            }
        }

        info!("FileBackend: found {} files in {:?}", found.len(), start.elapsed());
        let found: Arc<[FileHit]> = found.into();
        *files = Some(Arc::clone(&found));
        found
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn opener() -> &'static str {
    if cfg!(target_os = "macos") { "open" } else { "xdg-open" }
}

fn open_file(path: &Path) -> Action {
    Action::Launch(LaunchCommand {
        argv: vec![opener().to_string(), path.to_string_lossy().into_owned()],
        terminal: false,
        working_dir: None,
    })
}

impl Backend for FileBackend {
    fn search(&self, text: &str) -> Vec<RankedResult> {
        if text.is_empty() {
            return Vec::new();
        }

        let files = self.files();
        let scorer = Scorer::new(QueryCell::new(text), false);
        scorer
            .rank(&files[..])
            .into_iter()
            .take(self.limit)
            .map(|i| {
                let hit = &files[i];
                RankedResult {
                    display_text: hit.name.clone(),
                    secondary_text: Some(hit.path.to_string_lossy().into_owned()),
                    action: open_file(&hit.path),
                }
            })
            .collect()
    }
}
