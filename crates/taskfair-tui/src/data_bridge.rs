//! Data bridge — connects query subscriptions to TUI actions.
//!
//! Each binding runs as a background task: it owns the `QueryHandle`,
//! forwards every snapshot change as an [`Action`] through the app's
//! action channel, and drops the handle (unsubscribing) when the
//! binding is cancelled or dropped. Screens hold a [`QueryBinding`] per
//! query while focused; letting it go is the "unmount".

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use taskfair_api::ApiRequest;
use taskfair_core::query::QuerySnapshot;
use taskfair_core::QueryKey;

use crate::action::Action;
use crate::component::AppContext;

/// A live screen-to-query binding. Dropping it cancels the forwarding
/// task, which drops the underlying `QueryHandle` and unsubscribes.
pub struct QueryBinding {
    key: QueryKey,
    cancel: CancellationToken,
}

impl QueryBinding {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for QueryBinding {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Subscribe to `key`, mapping wire records into domain values, and
/// forward every snapshot to the app loop as an action.
///
/// The initial snapshot is sent immediately so the screen renders its
/// loading state without waiting for the first change.
pub fn bind_query<W, T, M, A>(
    ctx: &AppContext,
    key: QueryKey,
    request: ApiRequest,
    map: M,
    to_action: A,
) -> QueryBinding
where
    W: DeserializeOwned + Send + 'static,
    T: Send + Sync + 'static,
    M: Fn(W) -> T + Send + Sync + 'static,
    A: Fn(QuerySnapshot<T>) -> Action + Send + 'static,
{
    let mut handle = ctx.cache.subscribe_with(key.clone(), request, map);
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let action_tx = ctx.action_tx.clone();
    let bound_key = key.clone();

    tokio::spawn(async move {
        let _ = action_tx.send(to_action(handle.snapshot()));
        loop {
            tokio::select! {
                biased;

                () = token.cancelled() => break,

                snapshot = handle.changed() => match snapshot {
                    Some(snap) => {
                        let _ = action_tx.send(to_action(snap));
                    }
                    None => break,
                },
            }
        }
        debug!(key = %bound_key, "query binding shut down");
        // `handle` drops here — unsubscribe, possibly evicting the entry.
    });

    QueryBinding { key, cancel }
}
