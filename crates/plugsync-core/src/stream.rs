// ── Reactive state streams ──
//
// Subscription handle for one plug's published state.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::PlugState;

/// A subscription to a plug's state.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct StateStream {
    current: PlugState,
    receiver: watch::Receiver<PlugState>,
}

impl StateStream {
    pub(crate) fn new(mut receiver: watch::Receiver<PlugState>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Get the state captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &PlugState {
        &self.current
    }

    /// Get the latest state (may have changed since creation).
    pub fn latest(&self) -> PlugState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next publication, returning the new state.
    /// Returns `None` once the poller has stopped.
    pub async fn changed(&mut self) -> Option<PlugState> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update().clone();
        self.current = state.clone();
        Some(state)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then each newly published state.
pub struct StateWatchStream {
    inner: WatchStream<PlugState>,
}

impl Stream for StateWatchStream {
    type Item = PlugState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
