use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::CatalogError;
use crate::matcher::{QueryCell, Scorer};
use crate::model::{AppEntry, RankedResult};
use crate::sources::platform_sources;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// App search state. Idle until the first `start`, then Active: the catalog
/// is loaded once and later keystrokes only re-sort the existing result set.
pub struct SearchSession {
    catalog: Catalog,
    scorer: Scorer,
    active: Mutex<Option<InvalidateHandle>>,
}

impl SearchSession {
    pub fn new(catalog: Catalog, match_generic_name: bool) -> Self {
        Self {
            catalog,
            scorer: Scorer::new(QueryCell::default(), match_generic_name),
            active: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Catalog::new(platform_sources(config)),
            config.general.match_generic_name,
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &QueryCell {
        self.scorer.query()
    }

    pub fn is_active(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Replaces the live query. Nothing is re-sorted until the handle from
    /// `start` is invalidated.
    pub fn update_query(&self, query: &str) {
        self.scorer.query().set(query);
    }

    /// Loads the catalog and ranks it for `query`. Once active, further calls
    /// leave the query and the results alone and hand back the existing handle.
    pub fn start(&self, query: &str) -> Result<(Vec<RankedResult>, InvalidateHandle), CatalogError> {
        let mut active = self.lock_active();
        if let Some(handle) = active.as_ref() {
            debug!("Search session already active, ignoring start({:?})", query);
            return Ok((handle.results(), handle.clone()));
        }

        self.update_query(query);
        let handle = self.activate(&mut active)?;
        Ok((handle.results(), handle))
    }

    /// Starts the session if needed, otherwise re-sorts for the live query.
    pub fn refresh(&self) -> Result<Vec<RankedResult>, CatalogError> {
        let mut active = self.lock_active();
        if let Some(handle) = (*active).clone() {
            drop(active);
            return Ok(handle.invalidate());
        }
        Ok(self.activate(&mut active)?.results())
    }

    fn activate(&self, slot: &mut Option<InvalidateHandle>) -> Result<InvalidateHandle, CatalogError> {
        let entries = self.catalog.get_entries()?;
        let handle = InvalidateHandle {
            results: Arc::new(ResultSet::new(entries, self.scorer.clone())),
        };
        handle.results.resort();
        *slot = Some(handle.clone());
        Ok(handle)
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<InvalidateHandle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Re-sorts an existing result set against whatever query is live.
#[derive(Clone)]
pub struct InvalidateHandle {
    results: Arc<ResultSet>,
}

impl InvalidateHandle {
    /// Re-applies the comparator; no catalog access.
    pub fn invalidate(&self) -> Vec<RankedResult> {
        self.results.resort();
        self.results()
    }

    /// The matching results in their current order.
    pub fn results(&self) -> Vec<RankedResult> {
        self.results.visible()
    }
}

struct ResultSet {
    entries: Arc<[AppEntry]>,
    scorer: Scorer,
    order: Mutex<SortedOrder>,
}

struct SortedOrder {
    indices: Vec<usize>,
    query: Arc<str>,
}

impl ResultSet {
    fn new(entries: Arc<[AppEntry]>, scorer: Scorer) -> Self {
        let indices = (0..entries.len()).collect();
        Self {
            entries,
            scorer,
            order: Mutex::new(SortedOrder { indices, query: Arc::from("") }),
        }
    }

    fn resort(&self) {
        let start = Instant::now();
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let SortedOrder { indices, query } = &mut *order;
        *query = self.scorer.sort_indices(&self.entries, indices);
        debug!("Sorted {} entries for {:?} in {:?}", indices.len(), query, start.elapsed());
    }

    fn visible(&self) -> Vec<RankedResult> {
        let order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let results: Vec<RankedResult> = order
            .indices
            .iter()
            .map(|&i| &self.entries[i])
            .take_while(|entry| self.scorer.score(&order.query, *entry) > 0)
            .map(RankedResult::from)
            .collect();
        info!("SearchSession: query={:?}, matches={}", order.query, results.len());
        results
    }
}
