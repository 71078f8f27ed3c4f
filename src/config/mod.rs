//! Configuration system (layered: code > env > defaults).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Duration;

use crate::auth::{IdentityProvider, WaitStrategy};

/// Target name of the main backend API.
pub const API_TARGET: &str = "api";
/// Target name of the account-manager service.
pub const ACCOUNT_MANAGER_TARGET: &str = "account-manager";

const DEFAULT_API_BASE_URL: &str = "http://localhost/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<GatewayConfig> = OnceLock::new();

/// Layered configuration for gateways.
///
/// Base URLs are kept per named target so one configuration can serve
/// several gateway instances.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    identity_domain: Option<String>,
    client_id: String,
    timeout: Duration,
    refresh_wait: WaitStrategy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayConfig {
    /// Defaults only: the `api` target points at `http://localhost/api`.
    pub fn new() -> Self {
        let config = Self {
            base_urls: Arc::new(RwLock::new(HashMap::new())),
            identity_domain: None,
            client_id: String::new(),
            timeout: DEFAULT_TIMEOUT,
            refresh_wait: WaitStrategy::default(),
        };
        config.set_base_url(API_TARGET, DEFAULT_API_BASE_URL);
        config
    }

    /// Load from `AUTHGATE_*` environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();

        let url_mappings = [
            ("AUTHGATE_API_BASE_URL", API_TARGET),
            ("AUTHGATE_ACCOUNT_MANAGER_BASE_URL", ACCOUNT_MANAGER_TARGET),
        ];
        for (env_var, target) in &url_mappings {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(target, url);
            }
        }

        if let Ok(domain) = std::env::var("AUTHGATE_IDP_DOMAIN") {
            config.identity_domain = Some(domain);
        }
        if let Ok(client_id) = std::env::var("AUTHGATE_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Ok(raw) = std::env::var("AUTHGATE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid AUTHGATE_TIMEOUT_SECS"),
            }
        }
        if let Ok(raw) = std::env::var("AUTHGATE_REFRESH_WAIT") {
            match parse_wait_strategy(&raw) {
                Some(strategy) => config.refresh_wait = strategy,
                None => tracing::warn!(value = %raw, "ignoring invalid AUTHGATE_REFRESH_WAIT"),
            }
        }

        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static GatewayConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_base_url(&self, target: &str, url: impl Into<String>) {
        self.base_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_string(), url.into());
    }

    pub fn base_url(&self, target: &str) -> Option<String> {
        self.base_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned()
    }

    pub fn with_base_url(self, target: &str, url: impl Into<String>) -> Self {
        self.set_base_url(target, url);
        self
    }

    pub fn with_identity_provider(
        mut self,
        domain: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.identity_domain = Some(domain.into());
        self.client_id = client_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh_wait(mut self, strategy: WaitStrategy) -> Self {
        self.refresh_wait = strategy;
        self
    }

    pub fn identity_domain(&self) -> Option<&str> {
        self.identity_domain.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn refresh_wait(&self) -> WaitStrategy {
        self.refresh_wait
    }

    /// Identity provider built from the configured domain, if any.
    pub fn identity_provider(&self) -> Option<IdentityProvider> {
        self.identity_domain
            .as_deref()
            .map(|domain| IdentityProvider::from_domain(domain, self.client_id.clone()))
    }
}

/// Parse `broadcast`, `poll`, or `poll:<millis>`.
pub fn parse_wait_strategy(value: &str) -> Option<WaitStrategy> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "broadcast" => Some(WaitStrategy::Broadcast),
        "poll" => Some(WaitStrategy::poll()),
        other => {
            let millis = other.strip_prefix("poll:")?.parse::<u64>().ok()?;
            Some(WaitStrategy::Poll {
                interval: Duration::from_millis(millis),
            })
        }
    }
}
