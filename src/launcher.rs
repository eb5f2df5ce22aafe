use crate::backends::{Backends, backends_from_config};
use crate::config::Config;
use crate::error::LaunchError;
use crate::executor::Executor;
use crate::model::RankedResult;
use crate::router::{BackendKind, Router};
use crate::searcher::{SearchOutcome, Searcher};
use crate::state::SearchSession;
use calloop::channel::Sender;
use log::{debug, error, warn};
use std::sync::Arc;
use std::thread::JoinHandle;

pub type ResultBatch = Vec<RankedResult>;

/// What the UI talks to. Lives on the UI thread; searches run on workers and
/// come back through the channel handed to `new`, to be fed to `on_results`.
pub struct Launcher {
    router: Router,
    session: Arc<SearchSession>,
    backends: Backends,
    searcher: Searcher<ResultBatch>,
    executor: Executor,
    results: Vec<RankedResult>,
    selected_index: usize,
}

impl Launcher {
    pub fn new(
        router: Router,
        session: Arc<SearchSession>,
        backends: Backends,
        executor: Executor,
        sender: Sender<SearchOutcome<ResultBatch>>,
    ) -> Self {
        Self {
            router,
            session,
            backends,
            searcher: Searcher::new(sender),
            executor,
            results: Vec::new(),
            selected_index: 0,
        }
    }

    pub fn from_config(config: &Config, sender: Sender<SearchOutcome<ResultBatch>>) -> Self {
        Self::new(
            Router::new(config.prefixes.routes()),
            Arc::new(SearchSession::from_config(config)),
            backends_from_config(config),
            Executor::from_config(config),
            sender,
        )
    }

    pub fn session(&self) -> &Arc<SearchSession> {
        &self.session
    }

    /// Starts a background search for the new input, superseding any search
    /// still running.
    pub fn on_query_changed(&mut self, text: &str) -> JoinHandle<()> {
        let route = self.router.route(text);
        debug!("Routing {:?} to {:?} as {:?}", text, route.backend, route.text);

        match route.backend {
            BackendKind::Apps => {
                self.session.update_query(route.text);
                let session = Arc::clone(&self.session);
                self.searcher.spawn(move |token| {
                    if token.is_superseded() {
                        return Vec::new();
                    }
                    session.refresh().unwrap_or_else(|e| {
                        error!("App search unavailable: {}", e);
                        Vec::new()
                    })
                })
            }
            kind => {
                let backend = self.backends.get(&kind).cloned();
                let text = route.text.to_string();
                self.searcher.spawn(move |_| match backend {
                    Some(backend) => backend.search(&text),
                    None => {
                        warn!("No {:?} backend configured", kind);
                        Vec::new()
                    }
                })
            }
        }
    }

    /// Accepts a finished search. Returns false, leaving the displayed
    /// results untouched, when a newer search has started since.
    pub fn on_results(&mut self, outcome: SearchOutcome<ResultBatch>) -> bool {
        if !self.searcher.is_current(outcome.generation) {
            debug!("Discarding results of stale search {}", outcome.generation);
            return false;
        }
        self.results = outcome.value;
        self.selected_index = 0;
        true
    }

    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.results.is_empty() {
            self.selected_index = 0;
            return;
        }

        let len = self.results.len() as i32;
        let new_index = (self.selected_index as i32 + delta).rem_euclid(len);
        self.selected_index = new_index as usize;
    }

    pub fn get_selected(&self) -> Option<&RankedResult> {
        self.results.get(self.selected_index)
    }

    /// Runs the action of the result at `index`, or of the selected one.
    pub fn on_activate(&self, index: Option<usize>) -> Result<(), LaunchError> {
        let index = index.unwrap_or(self.selected_index);
        let result = self.results.get(index).ok_or(LaunchError::NothingSelected)?;
        self.executor.run(&result.action).inspect_err(|e| {
            error!("Could not activate {:?}: {}", result.display_text, e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use calloop::channel::channel;

    #[test]
    fn selection_wraps_around() {
        let (tx, _rx) = channel();
        let mut launcher = Launcher::new(
            Router::default(),
            Arc::new(SearchSession::new(Catalog::new(Vec::new()), false)),
            Backends::new(),
            Executor::default(),
            tx,
        );
        launcher.move_selection(1);
        assert_eq!(launcher.selected_index(), 0);

        let outcome = SearchOutcome {
            generation: 0,
            value: vec![RankedResult::text("a"), RankedResult::text("b"), RankedResult::text("c")],
        };
        assert!(launcher.on_results(outcome));
        launcher.move_selection(-1);
        assert_eq!(launcher.get_selected().unwrap().display_text, "c");
        launcher.move_selection(2);
        assert_eq!(launcher.get_selected().unwrap().display_text, "b");
    }

    #[test]
    fn activating_nothing_is_an_error() {
        let (tx, _rx) = channel();
        let launcher = Launcher::new(
            Router::default(),
            Arc::new(SearchSession::new(Catalog::new(Vec::new()), false)),
            Backends::new(),
            Executor::default(),
            tx,
        );
        assert!(matches!(launcher.on_activate(None), Err(LaunchError::NothingSelected)));
    }
}
