use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};

use crate::error::{GatewayError, Result};

/// Request kept across a token refresh so it can be reissued unchanged.
///
/// Each send builds a fresh `reqwest::Request`, so the retry marker stays
/// with this descriptor no matter what the transport does with the request.
///
/// # Example
/// ```
/// use authgate::gateway::PendingRequest;
///
/// let request = PendingRequest::get("/users").with_query([("limit", "10")]);
/// assert_eq!(request.path(), "/users");
/// assert!(!request.is_retried());
/// ```
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Build the wire request against `base_url`, without credentials.
    pub(crate) fn build(&self, base_url: &str) -> Result<reqwest::Request> {
        let mut url = Url::parse(&join_url(base_url, &self.path))
            .map_err(|e| GatewayError::InvalidRequest(format!("{}: {e}", self.path)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let mut request = reqwest::Request::new(self.method.clone(), url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = &self.body {
            *request.body_mut() = Some(serde_json::to_vec(body)?.into());
        }
        Ok(request)
    }
}

/// Resolve `path` against `base_url`; absolute URLs are used as-is.
fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
