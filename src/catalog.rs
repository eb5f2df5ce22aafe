use crate::error::CatalogError;
use crate::model::AppEntry;
use crate::sources::Source;
use log::{info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// The full entry set, built from every source on first use and kept until
/// `invalidate` is called. Building only reads the filesystem.
pub struct Catalog {
    sources: Vec<Box<dyn Source>>,
    cache: Mutex<Option<Arc<[AppEntry]>>>,
}

impl Catalog {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        Self {
            sources,
            cache: Mutex::new(None),
        }
    }

    /// Entries from all sources, in source order then discovery order.
    /// Fails only when no source could run at all.
    pub fn get_entries(&self) -> Result<Arc<[AppEntry]>, CatalogError> {
        // Held across the build so concurrent first calls scan once.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = cache.as_ref() {
            return Ok(Arc::clone(entries));
        }

        let start = Instant::now();
        let mut entries = Vec::new();
        let mut first_error = None;
        let mut scanned = false;

        for source in &self.sources {
            match source.scan() {
                Ok(found) => {
                    scanned = true;
                    entries.extend(found.into_iter().filter(|e| !e.hidden));
                }
                Err(e) => {
                    warn!("Source {} failed: {}", source.name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if !scanned {
            return Err(first_error.unwrap_or(CatalogError::NoSources));
        }

        info!("Catalog: {} entries in {:?}", entries.len(), start.elapsed());
        let entries: Arc<[AppEntry]> = entries.into();
        *cache = Some(Arc::clone(&entries));
        Ok(entries)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Drops the cached entries; the next `get_entries` rescans.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
