// ── Per-key cache entries ──
//
// Each entry owns the state machine for one query slot:
// Idle -> Fetching -> {Success, Failure}, with Fetching re-enterable.
// The entry enforces the two invariants the whole layer rests on:
//
// 1. At most one in-flight request per key. A second caller attaches
//    to the existing flight instead of issuing a duplicate.
// 2. Every fetch carries a per-entry sequence number; a settle whose
//    sequence is no longer the latest is discarded, so a stale
//    response never clobbers fresher data.

use std::any::Any;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_core::future::BoxFuture;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;

/// Type-erased successful payload. The concrete type is fixed per key
/// by the subscribing handle, which downcasts on read.
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// Factory producing one fetch attempt. Stored on the entry so
/// invalidation can re-fetch without needing a live handle in hand.
pub(crate) type Fetcher =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Payload, taskfair_api::Error>> + Send + Sync>;

/// Observable state of one cache entry.
#[derive(Clone, Default)]
pub(crate) struct EntryState {
    pub data: Option<Payload>,
    pub error: Option<String>,
    pub is_fetching: bool,
    /// Sequence of the most recently applied settle (0 = never).
    pub settled_seq: u64,
    pub last_fetched_at: Option<Instant>,
}

pub(crate) struct QueryEntry {
    pub state: watch::Sender<EntryState>,
    /// Latest issued fetch sequence.
    seq: AtomicU64,
    /// The in-flight fetch, if any: (sequence, its cancel token).
    current: Mutex<Option<(u64, CancellationToken)>>,
    fetcher: Mutex<Option<Fetcher>>,
    /// Live handle count; the cache evicts at zero.
    pub subscribers: AtomicUsize,
    /// Cancelled on eviction; parents every per-fetch token.
    pub cancel: CancellationToken,
}

impl QueryEntry {
    pub fn new() -> Self {
        let (state, _) = watch::channel(EntryState::default());
        Self {
            state,
            seq: AtomicU64::new(0),
            current: Mutex::new(None),
            fetcher: Mutex::new(None),
            subscribers: AtomicUsize::new(0),
            cancel: CancellationToken::new(),
        }
    }

    pub fn set_fetcher(&self, fetcher: Fetcher) {
        *self.fetcher.lock().expect("query fetcher lock poisoned") = Some(fetcher);
    }

    /// Start a fetch unless one is already in flight; either way return
    /// the sequence the caller should await. This is the whole
    /// de-duplication contract: concurrent callers share one flight.
    pub fn ensure_fetch(entry: &Arc<Self>) -> u64 {
        let mut current = entry.current.lock().expect("query flight lock poisoned");
        if let Some((seq, _)) = current.as_ref() {
            return *seq;
        }

        let fetcher = entry
            .fetcher
            .lock()
            .expect("query fetcher lock poisoned")
            .clone();
        let Some(fetcher) = fetcher else {
            return entry.state.borrow().settled_seq;
        };

        let seq = entry.seq.fetch_add(1, Ordering::AcqRel) + 1;
        let token = entry.cancel.child_token();
        *current = Some((seq, token.clone()));
        drop(current);

        entry.state.send_modify(|s| s.is_fetching = true);

        let fut = fetcher();
        let entry = Arc::clone(entry);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                () = token.cancelled() => None,
                result = fut => Some(result),
            };
            entry.settle(seq, outcome);
        });

        seq
    }

    /// Doom any in-flight fetch and, if anyone is still subscribed,
    /// start a fresh one. The externally triggered mutation path.
    pub fn invalidate(entry: &Arc<Self>) {
        {
            let mut current = entry.current.lock().expect("query flight lock poisoned");
            if let Some((seq, token)) = current.take() {
                debug!(seq, "dooming in-flight fetch");
                token.cancel();
            }
            // Bump past the doomed fetch so a racing settle is stale.
            entry.seq.fetch_add(1, Ordering::AcqRel);
        }

        if entry.subscribers.load(Ordering::Acquire) > 0 {
            Self::ensure_fetch(entry);
        } else {
            entry.state.send_modify(|s| s.is_fetching = false);
        }
    }

    fn settle(&self, seq: u64, outcome: Option<Result<Payload, taskfair_api::Error>>) {
        let still_fetching = {
            let mut current = self.current.lock().expect("query flight lock poisoned");
            if current.as_ref().is_some_and(|(s, _)| *s == seq) {
                *current = None;
            }
            current.is_some()
        };

        let Some(result) = outcome else {
            // Cancelled mid-flight: nothing observable beyond the flag.
            self.state.send_modify(|s| s.is_fetching = still_fetching);
            return;
        };

        let fresh = self.seq.load(Ordering::Acquire) == seq;
        if !fresh {
            debug!(seq, "discarding stale query result");
        }

        self.state.send_modify(|s| {
            s.is_fetching = still_fetching;
            if !fresh {
                return;
            }
            s.settled_seq = seq;
            match result {
                Ok(payload) => {
                    s.data = Some(payload);
                    s.error = None;
                    s.last_fetched_at = Some(Instant::now());
                }
                Err(e) => {
                    // Keep the last successful value; the error rides alongside.
                    s.error = Some(CoreError::from(e).to_string());
                }
            }
        });
    }
}
