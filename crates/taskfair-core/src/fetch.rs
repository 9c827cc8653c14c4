// ── One-shot fetch tasks ──
//
// A FetchTask runs a single request the moment it is created and
// publishes `{data, loading, error}` through a watch channel. It is
// the uncached counterpart to the query cache: owned by exactly one
// screen, destroyed when that screen lets go of it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use serde::de::DeserializeOwned;
use taskfair_api::{ApiClient, ApiRequest};

use crate::error::CoreError;

/// Observable state of a one-shot fetch.
///
/// `loading` starts `true` and flips to `false` exactly once, when the
/// request settles. Failure is data, not an exception: `error` carries
/// the rendered message and `data` stays `None`.
#[derive(Debug)]
pub struct FetchState<T> {
    pub data: Option<Arc<T>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<T> FetchState<T> {
    fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    /// Whether the request has settled (success or failure).
    pub fn is_settled(&self) -> bool {
        !self.loading
    }
}

/// A request whose lifetime is tied to its owner.
///
/// The request is issued immediately on spawn. Dropping the task
/// cancels the in-flight work: a result that arrives after the drop is
/// discarded and never mutates observable state, so owners can vanish
/// mid-flight without cleanup ceremony. Changing the request means
/// dropping the old task and spawning a new one.
pub struct FetchTask<T> {
    rx: watch::Receiver<FetchState<T>>,
    cancel: CancellationToken,
}

impl<T: Send + Sync + 'static> FetchTask<T> {
    /// Issue `request` through `client`, decoding the `data` payload as `T`.
    pub fn spawn(client: &ApiClient, request: ApiRequest) -> Self
    where
        T: DeserializeOwned,
    {
        let client = client.clone();
        Self::spawn_with(async move { client.execute(&request).await })
    }

    /// Run an arbitrary API future under fetch-state tracking.
    ///
    /// Used for calls the uniform descriptor cannot express, e.g.
    /// multipart uploads.
    pub fn spawn_with<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, taskfair_api::Error>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(FetchState::pending());
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    // Owner is gone. Let the result evaporate.
                }
                result = fut => {
                    tx.send_modify(|state| {
                        state.loading = false;
                        match result {
                            Ok(value) => state.data = Some(Arc::new(value)),
                            Err(e) => state.error = Some(CoreError::from(e).to_string()),
                        }
                    });
                }
            }
        });

        Self { rx, cancel }
    }

    /// The current state (cheap clone of Arcs and flags).
    pub fn state(&self) -> FetchState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change. Returns `None` once no further
    /// changes can arrive.
    pub async fn changed(&mut self) -> Option<FetchState<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the request settles, returning the final state.
    pub async fn settled(&mut self) -> FetchState<T> {
        loop {
            {
                let state = self.rx.borrow_and_update();
                if state.is_settled() {
                    return state.clone();
                }
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().clone();
            }
        }
    }
}

impl<T> Drop for FetchTask<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
