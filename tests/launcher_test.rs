use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use calloop::EventLoop;
use calloop::channel::{Channel, Event, channel};
use launchpad::backends::{Backend, Backends};
use launchpad::catalog::Catalog;
use launchpad::error::CatalogError;
use launchpad::executor::Executor;
use launchpad::launcher::{Launcher, ResultBatch};
use launchpad::model::{AppEntry, RankedResult};
use launchpad::router::{BackendKind, Router};
use launchpad::searcher::SearchOutcome;
use launchpad::sources::Source;
use launchpad::state::SearchSession;

#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<String>>,
}

impl Backend for Recording {
    fn search(&self, text: &str) -> Vec<RankedResult> {
        self.seen.lock().unwrap().push(text.to_string());
        vec![RankedResult::text(format!("{text}: a domesticated canid"))]
    }
}

struct Fixed(Vec<AppEntry>);

impl Source for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn scan(&self) -> Result<Vec<AppEntry>, CatalogError> {
        Ok(self.0.clone())
    }
}

/// Blocks the first scan until the test lets it go.
struct Gated {
    gate: Mutex<mpsc::Receiver<()>>,
    entries: Vec<AppEntry>,
}

impl Source for Gated {
    fn name(&self) -> &str {
        "gated"
    }

    fn scan(&self) -> Result<Vec<AppEntry>, CatalogError> {
        self.gate.lock().unwrap().recv().ok();
        Ok(self.entries.clone())
    }
}

fn apps() -> Vec<AppEntry> {
    vec![
        AppEntry::new("Firefox", vec!["firefox".into()]),
        AppEntry::new("Files", vec!["nautilus".into()]),
    ]
}

fn launcher(
    source: Box<dyn Source>,
    dictionary: Arc<Recording>,
) -> (Launcher, Channel<SearchOutcome<ResultBatch>>) {
    let (tx, rx) = channel();
    let mut backends = Backends::new();
    backends.insert(BackendKind::Dictionary, dictionary as Arc<dyn Backend>);
    let launcher = Launcher::new(
        Router::new(vec![("!d".to_string(), BackendKind::Dictionary)]),
        Arc::new(SearchSession::new(Catalog::new(vec![source]), false)),
        backends,
        Executor::default(),
        tx,
    );
    (launcher, rx)
}

/// Delivers queued outcomes the way the UI thread would.
fn deliver(launcher: &mut Launcher, rx: Channel<SearchOutcome<ResultBatch>>) -> usize {
    let accepted = Rc::new(Cell::new(0));
    let counter = Rc::clone(&accepted);
    let mut event_loop: EventLoop<Launcher> = EventLoop::try_new().unwrap();
    event_loop
        .handle()
        .insert_source(rx, move |event, _, launcher: &mut Launcher| {
            if let Event::Msg(outcome) = event {
                if launcher.on_results(outcome) {
                    counter.set(counter.get() + 1);
                }
            }
        })
        .unwrap();
    event_loop
        .dispatch(Some(Duration::from_millis(100)), launcher)
        .unwrap();
    accepted.get()
}

fn shown(launcher: &Launcher) -> Vec<&str> {
    launcher.results().iter().map(|r| r.display_text.as_str()).collect()
}

#[test]
fn prefixed_input_reaches_the_backend_stripped() {
    let dictionary = Arc::new(Recording::default());
    let (mut launcher, rx) = launcher(Box::new(Fixed(apps())), Arc::clone(&dictionary));

    launcher.on_query_changed("!d dog").join().unwrap();
    assert_eq!(deliver(&mut launcher, rx), 1);

    assert_eq!(*dictionary.seen.lock().unwrap(), vec!["dog"]);
    assert_eq!(shown(&launcher), vec!["dog: a domesticated canid"]);
}

#[test]
fn plain_input_searches_apps() {
    let dictionary = Arc::new(Recording::default());
    let (mut launcher, rx) = launcher(Box::new(Fixed(apps())), Arc::clone(&dictionary));

    launcher.on_query_changed("file").join().unwrap();
    deliver(&mut launcher, rx);

    assert!(dictionary.seen.lock().unwrap().is_empty());
    assert_eq!(shown(&launcher), vec!["Files", "Firefox"]);
    assert!(launcher.session().is_active());
}

#[test]
fn slow_app_search_never_overwrites_a_newer_one() {
    let (release, gate) = mpsc::channel();
    let dictionary = Arc::new(Recording::default());
    let (mut launcher, rx) = launcher(
        Box::new(Gated { gate: Mutex::new(gate), entries: apps() }),
        Arc::clone(&dictionary),
    );

    let a = launcher.on_query_changed("fire");
    let b = launcher.on_query_changed("!d dog");
    b.join().unwrap();
    release.send(()).unwrap();
    a.join().unwrap();

    assert_eq!(deliver(&mut launcher, rx), 1);
    assert_eq!(shown(&launcher), vec!["dog: a domesticated canid"]);

    let stale = SearchOutcome { generation: 1, value: vec![RankedResult::text("Firefox")] };
    assert!(!launcher.on_results(stale));
    assert_eq!(shown(&launcher), vec!["dog: a domesticated canid"]);
}
