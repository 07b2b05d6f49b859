//! Request lifecycle tracking and cancellation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Lifecycle of a single request.
///
/// `Created → Sent → {Completed | Faulted | Canceled | TimedOut}`; the last
/// four are terminal. A request that received any HTTP status, successful or
/// not, is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    /// Built but not yet handed to the transport.
    #[default]
    Created,
    /// In flight.
    Sent,
    /// A response arrived, whatever its status.
    Completed,
    /// The transport failed before a response arrived.
    Faulted,
    /// Aborted through an [`AbortHandle`].
    Canceled,
    /// The timeout elapsed first.
    TimedOut,
}

impl RequestState {
    /// Returns `true` for the four outcome states.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Created | Self::Sent)
    }
}

#[derive(Debug, Default)]
struct Lifecycle {
    state: RequestState,
    token: Option<CancellationToken>,
}

/// Cancels an in-flight request from another task.
///
/// Handles are cheap to clone and stay valid after the request finishes.
///
/// ## Examples
///
/// ```rust,ignore
/// let request = client.get(uri);
/// let handle = request.abort_handle();
///
/// tokio::spawn(async move {
///     tokio::time::sleep(Duration::from_millis(50)).await;
///     handle.abort();
/// });
///
/// let response = request.send().await?;
/// assert_eq!(response.error().unwrap().kind(), ErrorKind::Canceled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    inner: Arc<Mutex<Lifecycle>>,
}

impl AbortHandle {
    /// Cancels the request if it is in flight.
    ///
    /// Returns `true` if this call triggered cancellation. Aborting before the
    /// request is sent does nothing and logs a warning; aborting after it
    /// finished does nothing.
    pub fn abort(&self) -> bool {
        let lifecycle = self.lock();
        match (lifecycle.state, &lifecycle.token) {
            (RequestState::Sent, Some(token)) if !token.is_cancelled() => {
                debug!("aborting in-flight request");
                token.cancel();
                true
            }
            (RequestState::Created, _) => {
                warn!("abort called before the request was sent; ignoring");
                false
            }
            _ => false,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RequestState {
        self.lock().state
    }

    /// Moves to `Sent` and returns the token the executor races against.
    pub(crate) fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut lifecycle = self.lock();
        lifecycle.state = RequestState::Sent;
        lifecycle.token = Some(token.clone());
        token
    }

    /// Records the outcome and releases the token.
    pub(crate) fn finish(&self, state: RequestState) {
        let mut lifecycle = self.lock();
        lifecycle.state = state;
        lifecycle.token = None;
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
