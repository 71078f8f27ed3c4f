use thiserror::Error;

/// Errors raised while talking to the identity provider or loading session state.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity provider answered the refresh with a non-200 status below 500.
    #[error("Token refresh rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is not valid: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
