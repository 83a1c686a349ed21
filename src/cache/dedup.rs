//! Single-flight request de-duplication.
//!
//! While a request for a key is in flight, later callers for the same key
//! await the same shared future instead of starting another one. The pending
//! slot is cleared as soon as the request settles, successfully or not, so the
//! next caller after settlement starts a fresh request.

use super::errors::CacheResult;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

type PendingOutcome<T> = Shared<BoxFuture<'static, CacheResult<T>>>;

pub struct RequestDeduplicator<T: Clone> {
    pending: Arc<DashMap<String, PendingOutcome<T>>>,
}

impl<T> RequestDeduplicator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Run `producer` for `key` unless a run for `key` is already in flight,
    /// in which case wait for that run's outcome instead.
    ///
    /// Every caller that overlaps an in-flight run receives a clone of the same
    /// outcome, including failures. `producer` is called on first poll of the
    /// shared run, after the slot is published and no map lock is held, so it
    /// may use this deduplicator itself.
    pub async fn dedupe<F, Fut>(&self, key: &str, producer: F) -> CacheResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CacheResult<T>> + Send + 'static,
    {
        let outcome = match self.pending.entry(key.to_string()) {
            Entry::Occupied(slot) => {
                debug!(key = key, "Joining in-flight request");
                slot.get().clone()
            }
            Entry::Vacant(slot) => {
                let pending = Arc::clone(&self.pending);
                let owned_key = key.to_string();

                let settled = async move {
                    let result = producer().await;
                    pending.remove(&owned_key);
                    result
                }
                .boxed()
                .shared();

                slot.insert(settled.clone());
                debug!(key = key, "Started request");
                settled
            }
        };

        outcome.await
    }

    /// Number of keys with a request in flight
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }
}

impl<T> Default for RequestDeduplicator<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> fmt::Debug for RequestDeduplicator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDeduplicator")
            .field("in_flight", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::errors::CacheError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_run() {
        let dedup = Arc::new(RequestDeduplicator::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();
        let gate = gate.shared();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                dedup
                    .dedupe("GET /rooms", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = gate.await;
                        Ok(7)
                    })
                    .await
            }));
        }

        while dedup.in_flight() == 0 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        release.send(()).unwrap();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dedup.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_shared_then_cleared() {
        let dedup = RequestDeduplicator::<u32>::new();
        let (release, gate) = oneshot::channel::<()>();

        let first = dedup.dedupe("k", move || async move {
            let _ = gate.await;
            Err(CacheError::Timeout("upstream".to_string()))
        });
        let second = dedup.dedupe("k", || async { Ok(1) });

        let (first, second, _) = tokio::join!(first, second, async move {
            tokio::task::yield_now().await;
            let _ = release.send(());
        });

        assert_eq!(first, Err(CacheError::Timeout("upstream".to_string())));
        assert_eq!(second, first);
        assert!(!dedup.is_pending("k"));

        let retry = dedup.dedupe("k", || async { Ok(2) }).await;
        assert_eq!(retry, Ok(2));
    }

    #[tokio::test]
    async fn test_sequential_calls_are_not_deduplicated() {
        let dedup = RequestDeduplicator::<usize>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for expected in 1..=3 {
            let calls = Arc::clone(&calls);
            let value = dedup
                .dedupe("k", move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) })
                .await;
            assert_eq!(value, Ok(expected));
        }
    }

    #[tokio::test]
    async fn test_producer_may_inspect_its_own_slot() {
        let dedup = Arc::new(RequestDeduplicator::<bool>::new());
        let inner = Arc::clone(&dedup);

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            dedup.dedupe("GET /rooms", move || {
                let pending = inner.is_pending("GET /rooms");
                async move { Ok(pending) }
            }),
        )
        .await
        .expect("producer deadlocked on the pending map");

        assert_eq!(outcome, Ok(true));
        assert!(!dedup.is_pending("GET /rooms"));
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let dedup = RequestDeduplicator::<&'static str>::new();
        let (a, b) = tokio::join!(
            dedup.dedupe("a", || async { Ok("a") }),
            dedup.dedupe("b", || async { Ok("b") }),
        );
        assert_eq!(a, Ok("a"));
        assert_eq!(b, Ok("b"));
    }
}
