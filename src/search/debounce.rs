use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Quiet period after the last keystroke before a lookup fires.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Queries shorter than this clear the results without a request.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search backend error: {0}")]
    Backend(String),
}

/// Remote lookup behind the debouncer. Implemented by the catalog's
/// person and title searches; tests plug in fakes.
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn search(&self, query: &str) -> Result<Vec<Self::Item>, SearchError>;
}

/// Trailing-debounce wrapper around a [`SearchBackend`].
///
/// Each keystroke bumps a generation counter. The lookup task sleeps
/// out the quiet period and only issues the request if its generation
/// is still current; after the response arrives it checks again, so a
/// slow response for a superseded query can never overwrite results
/// from a later one. In-flight requests are not cancelled, their
/// results are just discarded.
///
/// A failed lookup for the current generation is logged and published
/// on the error channel so the caller can show a retry prompt; the
/// next settled lookup clears it.
pub struct DebouncedSearch<B: SearchBackend> {
    backend: Arc<B>,
    generation: Arc<AtomicU64>,
    results: watch::Sender<Vec<B::Item>>,
    error: watch::Sender<Option<SearchError>>,
}

impl<B: SearchBackend> DebouncedSearch<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (results, _) = watch::channel(Vec::new());
        let (error, _) = watch::channel(None);
        Self {
            backend,
            generation: Arc::new(AtomicU64::new(0)),
            results,
            error,
        }
    }

    /// Feed the current query text. Schedules a lookup for after the
    /// quiet period; any earlier pending lookup is superseded.
    pub fn input(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.chars().count() < MIN_QUERY_LEN {
            self.results.send_replace(Vec::new());
            self.error.send_replace(None);
            return;
        }

        let query = query.to_string();
        let backend = Arc::clone(&self.backend);
        let latest = Arc::clone(&self.generation);
        let results = self.results.clone();
        let error = self.error.clone();

        tokio::spawn(async move {
            tokio::time::sleep(QUIET_PERIOD).await;

            if latest.load(Ordering::SeqCst) != generation {
                // A later keystroke superseded this one before the
                // quiet period ran out.
                return;
            }

            let outcome = backend.search(&query).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!(query = %query, "discarding stale search response");
                return;
            }

            match outcome {
                Ok(items) => {
                    results.send_replace(items);
                    error.send_replace(None);
                }
                Err(e) => {
                    warn!(query = %query, "search failed: {}", e);
                    error.send_replace(Some(e));
                }
            }
        });
    }

    /// Subscribe to result updates.
    pub fn subscribe(&self) -> watch::Receiver<Vec<B::Item>> {
        self.results.subscribe()
    }

    /// Snapshot of the current results.
    pub fn current(&self) -> Vec<B::Item> {
        self.results.borrow().clone()
    }

    /// Subscribe to lookup-failure updates.
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<SearchError>> {
        self.error.subscribe()
    }

    /// The failure from the most recent settled lookup, if any.
    pub fn last_error(&self) -> Option<SearchError> {
        self.error.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        // query -> simulated response latency
        delay_for: fn(&str) -> Duration,
        // query -> whether the lookup fails
        fail_for: fn(&str) -> bool,
    }

    impl FakeBackend {
        fn instant() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                delay_for: |_| Duration::ZERO,
                fail_for: |_| false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        type Item = String;

        async fn search(&self, query: &str) -> Result<Vec<String>, SearchError> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = (self.delay_for)(query);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if (self.fail_for)(query) {
                return Err(SearchError::Backend("boom".into()));
            }
            Ok(vec![format!("result for {query}")])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_request() {
        let backend = Arc::new(FakeBackend::instant());
        let search = DebouncedSearch::new(Arc::clone(&backend));

        search.input("a");
        search.input("ab");
        search.input("abc");

        tokio::time::sleep(QUIET_PERIOD * 2).await;

        assert_eq!(backend.calls(), vec!["abc".to_string()]);
        assert_eq!(search.current(), vec!["result for abc".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_without_request() {
        let backend = Arc::new(FakeBackend::instant());
        let search = DebouncedSearch::new(Arc::clone(&backend));

        search.input("ab");
        tokio::time::sleep(QUIET_PERIOD * 2).await;
        assert!(!search.current().is_empty());

        search.input("a");
        tokio::time::sleep(QUIET_PERIOD * 2).await;

        assert!(search.current().is_empty());
        assert_eq!(backend.calls(), vec!["ab".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_does_not_overwrite() {
        let backend = Arc::new(FakeBackend {
            calls: Mutex::new(Vec::new()),
            // the superseded query responds much later than the new one
            delay_for: |q| {
                if q == "slow" {
                    Duration::from_secs(5)
                } else {
                    Duration::ZERO
                }
            },
            fail_for: |_| false,
        });
        let search = DebouncedSearch::new(Arc::clone(&backend));

        search.input("slow");
        // let the quiet period elapse so the request is actually issued
        tokio::time::sleep(QUIET_PERIOD + Duration::from_millis(50)).await;

        search.input("fast");
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(backend.calls(), vec!["slow".to_string(), "fast".to_string()]);
        assert_eq!(search.current(), vec!["result for fast".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_is_observable() {
        let backend = Arc::new(FakeBackend {
            calls: Mutex::new(Vec::new()),
            delay_for: |_| Duration::ZERO,
            fail_for: |q| q == "matrix",
        });
        let search = DebouncedSearch::new(Arc::clone(&backend));
        assert!(search.last_error().is_none());

        search.input("matrix");
        tokio::time::sleep(QUIET_PERIOD * 2).await;

        assert!(search.current().is_empty());
        assert!(search.last_error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn next_settled_lookup_clears_the_error() {
        let backend = Arc::new(FakeBackend {
            calls: Mutex::new(Vec::new()),
            delay_for: |_| Duration::ZERO,
            fail_for: |q| q == "matrix",
        });
        let search = DebouncedSearch::new(Arc::clone(&backend));

        search.input("matrix");
        tokio::time::sleep(QUIET_PERIOD * 2).await;
        assert!(search.last_error().is_some());

        search.input("matrix reloaded");
        tokio::time::sleep(QUIET_PERIOD * 2).await;

        assert!(search.last_error().is_none());
        assert_eq!(
            search.current(),
            vec!["result for matrix reloaded".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_during_quiet_period_restarts_timer() {
        let backend = Arc::new(FakeBackend::instant());
        let search = DebouncedSearch::new(Arc::clone(&backend));

        search.input("ab");
        tokio::time::sleep(Duration::from_millis(200)).await;
        search.input("abc");
        tokio::time::sleep(Duration::from_millis(200)).await;

        // 400ms total, but no single query has been quiet for 300ms yet
        // except the superseded one, which must not fire.
        assert!(backend.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(backend.calls(), vec!["abc".to_string()]);
    }
}
