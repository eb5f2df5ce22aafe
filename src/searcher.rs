use calloop::channel::Sender;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

/// A finished search, tagged with the generation that produced it.
#[derive(Debug)]
pub struct SearchOutcome<T> {
    pub generation: u64,
    pub value: T,
}

/// Lets a running job notice that it has been superseded.
#[derive(Debug, Clone)]
pub struct SearchToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl SearchToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_superseded(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }
}

/// Runs searches on worker threads. Each `spawn` supersedes the ones before
/// it, and a superseded job's output never reaches the channel.
pub struct Searcher<T> {
    current: Arc<AtomicU64>,
    sender: Sender<SearchOutcome<T>>,
}

impl<T: Send + 'static> Searcher<T> {
    pub fn new(sender: Sender<SearchOutcome<T>>) -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            sender,
        }
    }

    /// Runs `job` on a worker thread as the newest search.
    pub fn spawn<F>(&self, job: F) -> JoinHandle<()>
    where
        F: FnOnce(&SearchToken) -> T + Send + 'static,
    {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let token = SearchToken {
            generation,
            current: Arc::clone(&self.current),
        };
        let sender = self.sender.clone();

        thread::spawn(move || {
            let value = job(&token);
            if token.is_superseded() {
                debug!("Search {} was superseded, dropping its results", generation);
                return;
            }
            if sender.send(SearchOutcome { generation, value }).is_err() {
                debug!("Search {} finished after the receiver closed", generation);
            }
        })
    }

    /// Whether `generation` is still the newest search.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::SeqCst) == generation
    }

    /// Supersedes whatever is in flight without starting anything new.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;
    use calloop::channel::{Event, channel};
    use std::sync::mpsc;
    use std::time::Duration;

    fn drain(rx: calloop::channel::Channel<SearchOutcome<&'static str>>) -> Vec<&'static str> {
        let mut event_loop: EventLoop<Vec<&'static str>> = EventLoop::try_new().unwrap();
        event_loop
            .handle()
            .insert_source(rx, |event, _, shown: &mut Vec<&'static str>| {
                if let Event::Msg(outcome) = event {
                    shown.push(outcome.value);
                }
            })
            .unwrap();
        let mut shown = Vec::new();
        event_loop.dispatch(Some(Duration::from_millis(100)), &mut shown).unwrap();
        shown
    }

    #[test]
    fn stale_search_finishing_last_is_dropped() {
        let (tx, rx) = channel();
        let searcher = Searcher::new(tx);
        let (release, wait) = mpsc::channel::<()>();

        let a = searcher.spawn(move |_| {
            wait.recv().ok();
            "A"
        });
        let b = searcher.spawn(|_| "B");
        b.join().unwrap();
        release.send(()).unwrap();
        a.join().unwrap();

        assert_eq!(drain(rx), vec!["B"]);
    }

    #[test]
    fn token_sees_newer_searches() {
        let (tx, _rx) = channel::<SearchOutcome<()>>();
        let searcher = Searcher::new(tx);
        let (release, wait) = mpsc::channel::<()>();
        let (seen_tx, seen) = mpsc::channel::<bool>();

        let first = searcher.spawn(move |token| {
            wait.recv().ok();
            seen_tx.send(token.is_superseded()).ok();
        });
        assert!(searcher.is_current(1));
        searcher.spawn(|_| ()).join().unwrap();
        assert!(!searcher.is_current(1));
        release.send(()).unwrap();
        first.join().unwrap();
        assert!(seen.recv().unwrap());
    }

    #[test]
    fn cancel_drops_the_running_search() {
        let (tx, rx) = channel();
        let searcher = Searcher::new(tx);
        let (release, wait) = mpsc::channel::<()>();
        let job = searcher.spawn(move |_| {
            wait.recv().ok();
            "late"
        });
        searcher.cancel();
        release.send(()).unwrap();
        job.join().unwrap();
        assert!(drain(rx).is_empty());
    }
}
