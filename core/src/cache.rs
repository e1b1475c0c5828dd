use crate::{LookupError, Post};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// A remote read keyed by free text: default results for a query, or candidate search.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<Post>, LookupError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    Absent,
    Pending,
    Ready(Arc<Vec<Post>>),
    Failed(String),
}

impl CacheState {
    pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }

    pub fn posts(&self) -> Option<&[Post]> {
        match self {
            Self::Ready(posts) => Some(posts.as_slice()),
            _ => None,
        }
    }
}

/// Memoizes one lookup per key for the life of a session.
///
/// Each key owns a watch channel: the fetch task holds the sender and is the
/// only writer of that slot, so a late reply for an abandoned query can never
/// land in another key. At most one fetch is outstanding per key. All methods
/// that may start a fetch must be called inside a Tokio runtime.
pub struct ResultCache {
    name: &'static str,
    lookup: Arc<dyn Lookup>,
    slots: Mutex<HashMap<String, watch::Receiver<CacheState>>>,
}

impl ResultCache {
    pub fn new(name: &'static str, lookup: Arc<dyn Lookup>) -> Self {
        Self { name, lookup, slots: Mutex::new(HashMap::new()) }
    }

    /// Current state of `key` without starting anything.
    pub fn state(&self, key: &str) -> CacheState {
        self.slots.lock().get(key).map(|rx| rx.borrow().clone()).unwrap_or(CacheState::Absent)
    }

    /// Start a fetch for `key` if it has never been requested, and return its state.
    pub fn request(&self, key: &str) -> CacheState {
        let rx = self.subscribe(key);
        let state = rx.borrow().clone();
        state
    }

    /// Like [`request`](Self::request), but hands back the slot's receiver so the
    /// caller can wait for it to settle without holding any lock.
    pub fn subscribe(&self, key: &str) -> watch::Receiver<CacheState> {
        let mut slots = self.slots.lock();
        if let Some(rx) = slots.get(key) {
            return rx.clone();
        }
        let rx = self.spawn_fetch(key);
        slots.insert(key.to_string(), rx.clone());
        rx
    }

    /// Fetch `key` again if its last attempt failed. Other states are returned as is.
    pub fn retry(&self, key: &str) -> CacheState {
        let mut slots = self.slots.lock();
        if let Some(rx) = slots.get(key) {
            let state = rx.borrow().clone();
            if !matches!(state, CacheState::Failed(_)) {
                return state;
            }
        }
        tracing::info!(cache = self.name, key, "retrying lookup");
        let rx = self.spawn_fetch(key);
        slots.insert(key.to_string(), rx);
        CacheState::Pending
    }

    /// Request `key` and wait until it is no longer pending.
    pub async fn resolve(&self, key: &str) -> CacheState {
        settled(self.subscribe(key)).await
    }

    pub fn len(&self) -> usize { self.slots.lock().len() }
    pub fn is_empty(&self) -> bool { self.slots.lock().is_empty() }

    fn spawn_fetch(&self, key: &str) -> watch::Receiver<CacheState> {
        let (tx, rx) = watch::channel(CacheState::Pending);
        let lookup = self.lookup.clone();
        let name = self.name;
        let key = key.to_string();
        tracing::debug!(cache = name, key = %key, "lookup pending");

        tokio::spawn(async move {
            let next = match lookup.fetch(&key).await {
                Ok(posts) => {
                    tracing::debug!(cache = name, key = %key, hits = posts.len(), "lookup ready");
                    CacheState::Ready(Arc::new(posts))
                }
                Err(err) => {
                    tracing::warn!(cache = name, key = %key, error = %err, "lookup failed");
                    CacheState::Failed(err.to_string())
                }
            };
            tx.send_replace(next);
        });
        rx
    }
}

/// Wait for a slot to leave `Pending`.
pub async fn settled(mut rx: watch::Receiver<CacheState>) -> CacheState {
    let settled = rx.wait_for(|state| !state.is_pending()).await.map(|state| state.clone());
    // The sender only disappears early if the fetch task was torn down.
    settled.unwrap_or_else(|_| rx.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Lookup for Counting {
        async fn fetch(&self, query: &str) -> Result<Vec<Post>, LookupError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if query == "broken" && n == 0 {
                return Err(LookupError::Status { status: 502 });
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok(vec![Post::new(1, query)])
        }
    }

    fn cache() -> (Arc<Counting>, ResultCache) {
        let lookup = Arc::new(Counting { calls: AtomicUsize::new(0) });
        (lookup.clone(), ResultCache::new("test", lookup))
    }

    #[tokio::test]
    async fn one_fetch_per_key() {
        let (lookup, cache) = cache();
        assert_eq!(cache.state("rust"), CacheState::Absent);
        assert_eq!(cache.request("rust"), CacheState::Pending);
        assert_eq!(cache.request("rust"), CacheState::Pending);

        let state = cache.resolve("rust").await;
        assert_eq!(state.posts().map(|p| p[0].title.as_str()), Some("rust"));
        cache.request("rust");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_settle_and_can_be_retried() {
        let (lookup, cache) = cache();
        let state = cache.resolve("broken").await;
        assert!(matches!(state, CacheState::Failed(ref msg) if msg.contains("502")));

        // A plain request does not refetch a failed key.
        assert!(matches!(cache.request("broken"), CacheState::Failed(_)));
        assert_eq!(cache.retry("broken"), CacheState::Pending);
        assert!(cache.resolve("broken").await.posts().is_some());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_, cache) = cache();
        cache.request("a");
        let b = cache.resolve("b").await;
        let a = cache.resolve("a").await;
        assert_eq!(a.posts().map(|p| p[0].title.clone()), Some("a".to_string()));
        assert_eq!(b.posts().map(|p| p[0].title.clone()), Some("b".to_string()));
        assert_eq!(cache.len(), 2);
    }
}
