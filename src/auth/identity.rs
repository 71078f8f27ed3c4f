use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;

use super::error::AuthError;
use crate::session::SessionUpdate;

/// Path of the OAuth token endpoint relative to the provider domain.
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth/v2/token";

/// OAuth identity provider used to exchange refresh tokens.
///
/// # Example
/// ```
/// use authgate::auth::IdentityProvider;
///
/// let idp = IdentityProvider::from_domain("https://auth.example.com/", "my-client");
/// assert_eq!(idp.token_url(), "https://auth.example.com/oauth/v2/token");
/// ```
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
}

impl IdentityProvider {
    pub fn new(token_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: token_url.into(),
            client_id: client_id.into(),
        }
    }

    pub fn from_domain(domain: &str, client_id: impl Into<String>) -> Self {
        let token_url = format!("{}{TOKEN_ENDPOINT_PATH}", domain.trim_end_matches('/'));
        Self::new(token_url, client_id)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// A non-200 status below 500 is [`AuthError::Rejected`] with the
    /// provider's body. Statuses from 500 up, transport failures, and a 200
    /// without `access_token` are reported as the other variants.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .query(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        tracing::debug!(status = status.as_u16(), "token endpoint responded");

        if status == StatusCode::OK {
            return resp.json::<TokenGrant>().await.map_err(|e| {
                AuthError::InvalidResponse(format!("token response missing access_token: {e}"))
            });
        }
        if (200..500).contains(&status.as_u16()) {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Err(AuthError::InvalidResponse(format!(
            "token endpoint failed with status {status}"
        )))
    }
}

/// Token endpoint success body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    /// Session update applied after a successful refresh.
    ///
    /// The stored refresh token is only replaced when the provider rotated it.
    pub fn session_update(&self) -> SessionUpdate {
        let update = SessionUpdate::default()
            .with_access_token(self.access_token.clone())
            .with_token_validated(true);
        match &self.refresh_token {
            Some(token) => update.with_refresh_token(token.clone()),
            None => update,
        }
    }
}
