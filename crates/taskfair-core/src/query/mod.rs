// ── Keyed query cache with request de-duplication ──
//
// The cache is an explicit context object injected into screens, not a
// module-level global: `new` / `subscribe` / `invalidate` / `dispose`
// is the whole lifecycle. Entries are created on first subscription,
// updated on every completed fetch, and evicted when the last handle
// drops. Staleness is zero by policy: a value is never served to a new
// subscriber without a revalidating fetch also starting, which makes
// the cache a de-duplication layer rather than a reuse layer.

mod entry;
mod key;

pub use key::QueryKey;

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use taskfair_api::{ApiClient, ApiRequest};

use entry::{EntryState, Fetcher, Payload, QueryEntry};

/// Point-in-time view of a query slot, typed for one subscriber.
///
/// `is_loading` means "fetching with nothing to show yet"; once a value
/// exists, later revalidations only raise `is_fetching`. On failure
/// `data` keeps the last successful value (or stays `None` if there
/// never was one) and `error` carries the rendered message.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<String>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_error: bool,
    pub last_fetched_at: Option<Instant>,
}

impl<T> QuerySnapshot<T> {
    /// The state before any subscription exists: nothing fetched,
    /// nothing in flight.
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_error: false,
            last_fetched_at: None,
        }
    }
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_error: self.is_error,
            last_fetched_at: self.last_fetched_at,
        }
    }
}

/// Keyed query cache shared by all screens of one app instance.
///
/// Cheaply cloneable; all clones see the same entries. The map is
/// mutated only by the entries' own completion paths and by
/// [`invalidate`](Self::invalidate), the single externally triggered
/// mutation path.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    client: ApiClient,
    entries: DashMap<QueryKey, Arc<QueryEntry>>,
}

impl QueryCache {
    /// Create a cache over the given API client.
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                client,
                entries: DashMap::new(),
            }),
        }
    }

    /// The API client this cache fetches through.
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Subscribe to `key`, decoding the payload as `T`.
    ///
    /// Creates the entry on first subscription. Every subscription
    /// triggers a revalidating fetch -- or attaches to the one already
    /// in flight, so concurrent identical subscriptions share a single
    /// network round-trip and observe the same resolved value.
    pub fn subscribe<T>(&self, key: QueryKey, request: ApiRequest) -> QueryHandle<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.subscribe_with(key, request, |record: T| record)
    }

    /// Subscribe to `key`, decoding the payload as `W` and mapping it
    /// into `T` (typically wire records into domain types) before it is
    /// stored. All subscribers of the key share the mapped value.
    pub fn subscribe_with<W, T, F>(&self, key: QueryKey, request: ApiRequest, map: F) -> QueryHandle<T>
    where
        W: DeserializeOwned + Send + 'static,
        T: Send + Sync + 'static,
        F: Fn(W) -> T + Send + Sync + 'static,
    {
        let client = self.inner.client.clone();
        let map = Arc::new(map);
        let fetcher: Fetcher = Arc::new(move || {
            let client = client.clone();
            let request = request.clone();
            let map = Arc::clone(&map);
            Box::pin(async move {
                let record: W = client.execute(&request).await?;
                Ok(Arc::new(map(record)) as Payload)
            })
        });
        self.subscribe_raw(key, fetcher)
    }

    fn subscribe_raw<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        fetcher: Fetcher,
    ) -> QueryHandle<T> {
        let entry = {
            let guard = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(QueryEntry::new()));
            guard.subscribers.fetch_add(1, Ordering::AcqRel);
            Arc::clone(guard.value())
        };

        entry.set_fetcher(fetcher);
        let rx = entry.state.subscribe();

        debug!(%key, "subscribed to query");
        // Zero staleness: every new subscription revalidates.
        QueryEntry::ensure_fetch(&entry);

        QueryHandle {
            cache: self.clone(),
            key,
            entry,
            rx,
            _marker: PhantomData,
        }
    }

    /// Cache-bust `key`: doom any in-flight fetch and re-fetch if the
    /// key has subscribers. No-op for unknown keys.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.inner.entries.get(key) {
            debug!(%key, "invalidating query");
            QueryEntry::invalidate(entry.value());
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Tear down every entry, cancelling in-flight fetches. Handles
    /// that outlive the dispose keep their last state but go inert.
    pub fn dispose(&self) {
        for item in self.inner.entries.iter() {
            item.value().cancel.cancel();
        }
        self.inner.entries.clear();
        debug!("query cache disposed");
    }
}

/// A live subscription to one query slot.
///
/// Dropping the handle unsubscribes; when the last handle for a key
/// drops, the entry is evicted and any in-flight fetch cancelled.
pub struct QueryHandle<T> {
    cache: QueryCache,
    key: QueryKey,
    entry: Arc<QueryEntry>,
    rx: watch::Receiver<EntryState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> QuerySnapshot<T> {
        Self::snapshot_of(&self.rx.borrow())
    }

    /// Wait for the next state change, returning the new snapshot.
    /// Returns `None` once no further changes can arrive.
    pub async fn changed(&mut self) -> Option<QuerySnapshot<T>> {
        self.rx.changed().await.ok()?;
        let state = self.rx.borrow_and_update().clone();
        Some(Self::snapshot_of(&state))
    }

    /// Force a fetch for this key and wait for it to settle.
    ///
    /// If a fetch is already in flight the call coalesces onto it
    /// instead of issuing a duplicate; all coalesced callers resolve
    /// with the same settled snapshot.
    pub async fn refetch(&mut self) -> QuerySnapshot<T> {
        let target = QueryEntry::ensure_fetch(&self.entry);
        loop {
            {
                let state = self.rx.borrow_and_update();
                let settled = state.settled_seq >= target && !state.is_fetching;
                // A disposed cache will never settle this entry again.
                if settled || self.entry.cancel.is_cancelled() {
                    return Self::snapshot_of(&state);
                }
            }
            if self.rx.changed().await.is_err() {
                break;
            }
        }
        self.snapshot()
    }

    fn snapshot_of(state: &EntryState) -> QuerySnapshot<T> {
        let data = state
            .data
            .as_ref()
            .and_then(|d| Arc::clone(d).downcast::<T>().ok());
        QuerySnapshot {
            is_loading: state.is_fetching && data.is_none(),
            is_fetching: state.is_fetching,
            is_error: state.error.is_some(),
            error: state.error.clone(),
            last_fetched_at: state.last_fetched_at,
            data,
        }
    }
}

impl<T> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        let evicted = self.cache.inner.entries.remove_if(&self.key, |_, e| {
            // Only the entry this handle subscribed to; `dispose` may
            // have already replaced it.
            Arc::ptr_eq(e, &self.entry) && e.subscribers.fetch_sub(1, Ordering::AcqRel) == 1
        });
        if let Some((key, entry)) = evicted {
            debug!(%key, "evicting query entry");
            entry.cancel.cancel();
        }
    }
}
