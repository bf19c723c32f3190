use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::cache::LikedCache;

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("liked-movies request failed with status {0}: {1}")]
    Status(u16, String),
    #[error("liked-movies request failed: {0}")]
    Transport(String),
}

/// Remote per-user liked-movie store.
#[async_trait]
pub trait LikeBackend: Send + Sync {
    async fn fetch_liked(&self) -> Result<Vec<String>, LikeError>;
    async fn set_liked(&self, movie_id: &str, liked: bool) -> Result<(), LikeError>;
}

/// The liked-movie set, reconciled between the local cache and the
/// remote per-user store.
///
/// This store is the sole mutator; everything that renders like state
/// reads snapshots or subscribes for change notifications. Toggles go
/// remote-first: the local set and cache only change after the remote
/// upsert succeeds, and a failed upsert is logged and dropped, never
/// retried. Without an authenticated backend, toggles are silent no-ops.
pub struct LikeStore {
    cache: LikedCache,
    backend: Option<Arc<dyn LikeBackend>>,
    set: ArcSwap<Vec<String>>,
    version: watch::Sender<u64>,
    // serializes toggles and remote sync against each other
    write: Mutex<()>,
}

impl LikeStore {
    /// Hydrate from the local cache; `backend` is `None` for anonymous
    /// sessions.
    pub fn new(cache: LikedCache, backend: Option<Arc<dyn LikeBackend>>) -> Self {
        let initial = cache.load();
        let (version, _) = watch::channel(0);
        Self {
            cache,
            backend,
            set: ArcSwap::from_pointee(initial),
            version,
            write: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.set.load_full()
    }

    pub fn is_liked(&self, movie_id: &str) -> bool {
        self.set.load().iter().any(|id| id == movie_id)
    }

    /// Change notifications; the payload is a bare version counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Replace the working set with server truth. Called once
    /// authentication resolves; anonymous sessions keep the cached set.
    pub async fn sync_remote(&self) -> Result<(), LikeError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };

        let remote = backend.fetch_liked().await?;
        let _guard = self.write.lock().await;
        info!("liked-movies set replaced from server ({} entries)", remote.len());
        self.replace(remote);
        Ok(())
    }

    /// Like (`liked = true`) or unlike (`liked = false`) a movie.
    ///
    /// Idempotent on the set: liking an already-liked id and unliking an
    /// absent id change nothing. Failures are logged and dropped.
    pub async fn toggle(&self, movie_id: &str, liked: bool) {
        let Some(backend) = &self.backend else {
            debug!("ignoring like toggle for {movie_id}: not signed in");
            return;
        };

        if let Err(e) = backend.set_liked(movie_id, liked).await {
            warn!("failed to {} movie {}: {}", if liked { "like" } else { "unlike" }, movie_id, e);
            return;
        }

        let _guard = self.write.lock().await;
        let current = self.set.load();
        let already = current.iter().any(|id| id == movie_id);

        let updated = if liked && !already {
            let mut next = current.as_ref().clone();
            next.push(movie_id.to_string());
            next
        } else if !liked && already {
            current
                .iter()
                .filter(|id| id.as_str() != movie_id)
                .cloned()
                .collect()
        } else {
            return;
        };

        self.replace(updated);
    }

    fn replace(&self, ids: Vec<String>) {
        if let Err(e) = self.cache.store(&ids) {
            warn!("failed to persist liked-movies cache: {}", e);
        }
        self.set.store(Arc::new(ids));
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeBackend {
        remote: StdMutex<Vec<String>>,
        calls: StdMutex<Vec<(String, bool)>>,
        fail: StdMutex<bool>,
    }

    impl FakeBackend {
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LikeBackend for FakeBackend {
        async fn fetch_liked(&self) -> Result<Vec<String>, LikeError> {
            if *self.fail.lock().unwrap() {
                return Err(LikeError::Status(500, "server error".into()));
            }
            Ok(self.remote.lock().unwrap().clone())
        }

        async fn set_liked(&self, movie_id: &str, liked: bool) -> Result<(), LikeError> {
            self.calls.lock().unwrap().push((movie_id.to_string(), liked));
            if *self.fail.lock().unwrap() {
                return Err(LikeError::Status(500, "server error".into()));
            }
            Ok(())
        }
    }

    fn store_with(backend: Option<Arc<dyn LikeBackend>>) -> (LikeStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedCache::new(dir.path());
        (LikeStore::new(cache, backend), dir)
    }

    #[tokio::test]
    async fn anonymous_toggle_is_a_silent_noop() {
        // An anonymous store holds no backend at all, so no upsert can
        // be issued; the set and cache must both stay empty.
        let (store, dir) = store_with(None);

        store.toggle("603", true).await;

        assert!(store.snapshot().is_empty());
        assert!(LikedCache::new(dir.path()).load().is_empty());
    }

    #[tokio::test]
    async fn like_is_idempotent_on_the_set() {
        let backend = Arc::new(FakeBackend::default());
        let (store, _dir) = store_with(Some(backend.clone()));

        store.toggle("603", true).await;
        store.toggle("603", true).await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.iter().filter(|id| *id == "603").count(), 1);
        // both calls still hit the remote store
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn unlike_absent_id_is_a_noop() {
        let backend = Arc::new(FakeBackend::default());
        let (store, _dir) = store_with(Some(backend.clone()));

        store.toggle("603", false).await;
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_leaves_local_state_untouched() {
        let backend = Arc::new(FakeBackend::default());
        let (store, dir) = store_with(Some(backend.clone()));
        store.toggle("603", true).await;

        *backend.fail.lock().unwrap() = true;
        store.toggle("550", true).await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.as_ref(), &vec!["603".to_string()]);

        // the cache was not rewritten either
        let cache = LikedCache::new(dir.path());
        assert_eq!(cache.load(), vec!["603".to_string()]);
    }

    #[tokio::test]
    async fn toggle_persists_full_set_to_cache() {
        let backend = Arc::new(FakeBackend::default());
        let (store, dir) = store_with(Some(backend.clone()));

        store.toggle("603", true).await;
        store.toggle("550", true).await;
        store.toggle("603", false).await;

        let cache = LikedCache::new(dir.path());
        assert_eq!(cache.load(), vec!["550".to_string()]);
    }

    #[tokio::test]
    async fn hydrates_from_cache_then_server_truth_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LikedCache::new(dir.path());
        cache.store(&["1".to_string(), "2".to_string()]).unwrap();

        let backend = Arc::new(FakeBackend::default());
        *backend.remote.lock().unwrap() = vec!["9".to_string()];

        let store = LikeStore::new(cache, Some(backend));
        assert_eq!(store.snapshot().as_ref(), &vec!["1".to_string(), "2".to_string()]);

        store.sync_remote().await.unwrap();
        assert_eq!(store.snapshot().as_ref(), &vec!["9".to_string()]);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let backend = Arc::new(FakeBackend::default());
        let (store, _dir) = store_with(Some(backend));
        let mut rx = store.subscribe();
        let before = *rx.borrow();

        store.toggle("603", true).await;

        rx.changed().await.unwrap();
        assert!(*rx.borrow() > before);
    }
}
