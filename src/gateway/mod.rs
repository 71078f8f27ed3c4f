//! Authenticated request gateway.
//!
//! Attaches the session's bearer token to each request. A `401` triggers one
//! token refresh (shared with any other request that hits a `401` at the
//! same time) and one retry of the original request.

mod request;

pub use request::PendingRequest;

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::{RefreshCoordinator, RefreshTicket, WaitStrategy};
use crate::config::{GatewayConfig, API_TARGET};
use crate::error::{GatewayError, Result};
use crate::session::{SessionStore, SessionUpdate};
use crate::transport::{ApiResponse, ReqwestTransport, Transport};

/// HTTP client for one API target.
///
/// Clones share the session store and the refresh coordinator, so clones
/// never run overlapping refreshes.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use authgate::config::GatewayConfig;
/// use authgate::gateway::Gateway;
/// use authgate::session::InMemorySessionStore;
///
/// # async fn example() -> authgate::error::Result<()> {
/// let config = GatewayConfig::from_env();
/// let gateway = Gateway::new(&config, Arc::new(InMemorySessionStore::new()))?;
/// let response = gateway.get("/me").await?;
/// println!("{}", response.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Gateway {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    refresh: Arc<RefreshCoordinator>,
    wait: WaitStrategy,
}

impl Gateway {
    /// Gateway for the `api` target.
    pub fn new(config: &GatewayConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::for_target(config, API_TARGET, session)
    }

    /// Gateway for a named target from `config`.
    pub fn for_target(
        config: &GatewayConfig,
        target: &str,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let base_url = config.base_url(target).ok_or_else(|| {
            GatewayError::Configuration(format!("no base URL configured for target {target}"))
        })?;
        let transport = ReqwestTransport::with_timeout(config.timeout())?;
        // Token calls share the transport's client and its timeout.
        let identity = config
            .identity_provider()
            .map(|idp| idp.with_client(transport.client().clone()));
        let refresh = RefreshCoordinator::new(identity, session.clone());
        Ok(Self {
            base_url,
            transport: Arc::new(transport),
            session,
            refresh: Arc::new(refresh),
            wait: config.refresh_wait(),
        })
    }

    /// Gateway for another base URL that shares this one's session and
    /// refresh coordinator.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self.clone()
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Set `Authorization: Bearer <token>` when the session holds an access token.
    pub fn attach_credentials(&self, mut request: reqwest::Request) -> reqwest::Request {
        let Some(token) = self.session.get().access_token else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("access token is not a valid header value, sending without it"),
        }
        request
    }

    /// Send a request, refreshing the token and retrying once on `401`.
    pub async fn send(&self, mut request: PendingRequest) -> Result<ApiResponse> {
        let response = self.execute(&request).await?;
        self.handle_response(response, &mut request).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(PendingRequest::get(path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(PendingRequest::post(path).with_json(body)).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(PendingRequest::put(path).with_json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(PendingRequest::delete(path)).await
    }

    /// Pass non-401 responses through; route a first 401 to
    /// [`handle_unauthorized`](Self::handle_unauthorized).
    pub async fn handle_response(
        &self,
        response: ApiResponse,
        request: &mut PendingRequest,
    ) -> Result<ApiResponse> {
        if !response.is_unauthorized() {
            return Ok(response);
        }
        if request.is_retried() {
            return Err(unauthorized(response));
        }
        self.handle_unauthorized(response, request).await
    }

    /// Refresh (or wait for a refresh) and reissue `request` once.
    ///
    /// A request that waited on a refresh started by another request is only
    /// reissued if the session still holds an access token afterwards. When
    /// that refresh failed and logged the session out, the original `401` is
    /// returned as [`GatewayError::Unauthorized`] without a reissue.
    pub async fn handle_unauthorized(
        &self,
        response: ApiResponse,
        request: &mut PendingRequest,
    ) -> Result<ApiResponse> {
        request.mark_retried();
        info!(method = %request.method(), path = request.path(), "request unauthorized");

        if self.session.get().refresh_token.is_none() {
            info!("no refresh token found, logging out");
            self.session.set(SessionUpdate::logout());
            return Err(unauthorized(response));
        }

        match self.refresh.begin() {
            RefreshTicket::Started(handle) => {
                let outcome = handle.await;
                if !outcome.is_refreshed() {
                    debug!(?outcome, "refresh did not produce a token");
                    return Err(unauthorized(response));
                }
            }
            RefreshTicket::Joined(handle) => {
                info!("another token refresh is in flight, waiting for it to finish");
                self.refresh.wait(handle, self.wait).await;
                if !self.session.get().is_authenticated() {
                    debug!("session logged out while waiting for refresh");
                    return Err(unauthorized(response));
                }
            }
        }

        info!(path = request.path(), "retrying request with refreshed token");
        let retried = self.execute(request).await?;
        if retried.is_unauthorized() {
            return Err(unauthorized(retried));
        }
        Ok(retried)
    }

    async fn execute(&self, request: &PendingRequest) -> Result<ApiResponse> {
        let built = self.attach_credentials(request.build(&self.base_url)?);
        debug!(
            method = %request.method(),
            url = %built.url(),
            retried = request.is_retried(),
            "sending request"
        );
        self.transport.execute(built).await
    }
}

fn unauthorized(response: ApiResponse) -> GatewayError {
    GatewayError::Unauthorized {
        body: response.body,
    }
}
