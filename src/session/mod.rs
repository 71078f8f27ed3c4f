//! Session state shared between the gateway and login/logout flows.

pub mod store;

pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};

use serde::{Deserialize, Serialize};

/// Credentials the gateway reads on every request.
///
/// # Example
/// ```
/// use authgate::session::SessionState;
///
/// let state = SessionState {
///     access_token: Some("access".to_string()),
///     refresh_token: Some("refresh".to_string()),
///     token_validated: false,
/// };
/// assert!(state.is_authenticated());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_validated: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Merge a partial update into this state.
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(access_token) = update.access_token {
            self.access_token = access_token;
        }
        if let Some(refresh_token) = update.refresh_token {
            self.refresh_token = refresh_token;
        }
        if let Some(validated) = update.token_validated {
            self.token_validated = validated;
        }
    }
}

/// Partial update for [`SessionStore::set`].
///
/// Fields left as `None` keep their stored value. Token fields are doubly
/// optional so an update can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub access_token: Option<Option<String>>,
    pub refresh_token: Option<Option<String>>,
    pub token_validated: Option<bool>,
}

impl SessionUpdate {
    /// Clears every credential (forced logout).
    pub fn logout() -> Self {
        Self {
            access_token: Some(None),
            refresh_token: Some(None),
            token_validated: Some(false),
        }
    }

    /// Replaces both tokens; the new access token is not yet validated.
    pub fn login(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(Some(access_token.into())),
            refresh_token: Some(refresh_token),
            token_validated: Some(false),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(Some(token.into()));
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(Some(token.into()));
        self
    }

    pub fn with_token_validated(mut self, validated: bool) -> Self {
        self.token_validated = Some(validated);
        self
    }
}
