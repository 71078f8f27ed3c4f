//! Single-flight coordination of access-token refreshes.
//!
//! The first request that needs a refresh spawns it; every request that
//! fails while it is running attaches to the same shared result instead of
//! calling the identity provider again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::AuthError;
use super::identity::IdentityProvider;
use crate::session::{SessionStore, SessionUpdate};

/// Poll interval used by [`WaitStrategy::poll`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Shared handle to an in-flight refresh.
pub type RefreshHandle = Shared<BoxFuture<'static, RefreshOutcome>>;

/// How a request waits for a refresh started by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Attach to the in-flight refresh and wake as soon as it resolves.
    #[default]
    Broadcast,
    /// Re-check the coordination flag at a fixed interval.
    Poll { interval: Duration },
}

impl WaitStrategy {
    pub fn poll() -> Self {
        Self::Poll {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Final state of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New access token stored in the session.
    Refreshed,
    /// Identity provider answered with a non-200 status.
    Rejected { status: u16 },
    /// Transport failure, bad response, or missing configuration.
    Failed(String),
    /// Session held no refresh token by the time the refresh ran.
    NoRefreshToken,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed)
    }
}

/// Whether the caller started the refresh or joined one already running.
pub enum RefreshTicket {
    Started(RefreshHandle),
    Joined(RefreshHandle),
}

impl RefreshTicket {
    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    pub fn into_handle(self) -> RefreshHandle {
        match self {
            Self::Started(handle) | Self::Joined(handle) => handle,
        }
    }
}

type Slot = Arc<Mutex<Option<RefreshHandle>>>;

/// Deduplicates concurrent refresh attempts.
///
/// At most one refresh runs at a time. The slot is released by a guard owned
/// by the refresh task, after the session update, so a waiter that sees the
/// slot empty also sees the new tokens.
pub struct RefreshCoordinator {
    identity: Option<Arc<IdentityProvider>>,
    session: Arc<dyn SessionStore>,
    in_flight: Slot,
}

impl RefreshCoordinator {
    pub fn new(identity: Option<IdentityProvider>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            identity: identity.map(Arc::new),
            session,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a refresh call is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        lock(&self.in_flight).is_some()
    }

    /// Start a refresh, or join the one already running.
    ///
    /// The refresh runs on its own task so it completes even if every
    /// caller awaiting it is cancelled. Must be called inside a tokio runtime.
    pub fn begin(&self) -> RefreshTicket {
        let mut slot = lock(&self.in_flight);
        if let Some(handle) = slot.as_ref() {
            return RefreshTicket::Joined(handle.clone());
        }

        let guard = InFlightGuard {
            slot: self.in_flight.clone(),
            session: self.session.clone(),
        };
        let identity = self.identity.clone();
        let session = self.session.clone();
        // The slot lock is held until the handle is installed, so the guard
        // cannot clear it before it is set.
        let task = tokio::spawn(async move {
            let _guard = guard;
            run_refresh(identity.as_deref(), session.as_ref()).await
        });
        let handle = async move {
            task.await
                .unwrap_or_else(|e| RefreshOutcome::Failed(format!("refresh task aborted: {e}")))
        }
        .boxed()
        .shared();

        *slot = Some(handle.clone());
        RefreshTicket::Started(handle)
    }

    /// Wait for an in-flight refresh to finish.
    pub async fn wait(&self, handle: RefreshHandle, strategy: WaitStrategy) {
        match strategy {
            WaitStrategy::Broadcast => {
                handle.await;
            }
            WaitStrategy::Poll { interval } => {
                drop(handle);
                while self.is_refreshing() {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }
}

async fn run_refresh(
    identity: Option<&IdentityProvider>,
    session: &dyn SessionStore,
) -> RefreshOutcome {
    let Some(refresh_token) = session.get().refresh_token else {
        tracing::info!("no refresh token found, logging out");
        session.set(SessionUpdate::logout());
        return RefreshOutcome::NoRefreshToken;
    };
    let Some(identity) = identity else {
        tracing::warn!("identity provider not configured, logging out");
        session.set(SessionUpdate::logout());
        return RefreshOutcome::Failed("identity provider not configured".to_string());
    };

    tracing::info!(token_url = identity.token_url(), "refreshing access token");
    match identity.refresh(&refresh_token).await {
        Ok(grant) => {
            session.set(grant.session_update());
            tracing::info!(
                rotated_refresh_token = grant.refresh_token.is_some(),
                "access token refreshed"
            );
            RefreshOutcome::Refreshed
        }
        Err(AuthError::Rejected { status, body }) => {
            tracing::warn!(status, %body, "token refresh rejected, logging out");
            session.set(SessionUpdate::logout());
            RefreshOutcome::Rejected { status }
        }
        Err(error) => {
            tracing::warn!(%error, "token refresh failed, logging out");
            session.set(SessionUpdate::logout());
            RefreshOutcome::Failed(error.to_string())
        }
    }
}

/// Releases the in-flight slot when the refresh task ends, however it ends.
struct InFlightGuard {
    slot: Slot,
    session: Arc<dyn SessionStore>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.session.set(SessionUpdate::logout());
        }
        lock(&self.slot).take();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
