//! Error types for authgate.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Status outside the accepted `[200, 500)` range.
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// A 401 that could not be resolved by refreshing the access token.
    #[error("Unauthorized (status 401): {body}")]
    Unauthorized { body: String },

    /// Non-200 result from [`Gateway::fetch`](crate::gateway::Gateway::fetch).
    #[error("{}", fetch_message(.status, .status_text, .body))]
    Fetch {
        status: u16,
        status_text: String,
        body: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Session storage or identity-provider failure outside the retry flow.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl GatewayError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Fetch { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the caller should treat this as an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Serialized form of a failed fetch, `{"status":..,"statusText":..,"data":..}`.
fn fetch_message(status: &u16, status_text: &str, body: &serde_json::Value) -> String {
    serde_json::json!({
        "status": status,
        "statusText": status_text,
        "data": body,
    })
    .to_string()
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GatewayError>;
