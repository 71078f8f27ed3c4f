//! authgate: bearer-token HTTP gateway
//!
//! Wraps an HTTP client so every request carries the session's access token.
//! When the API answers `401`, the gateway exchanges the refresh token for a
//! new access token and retries the request once. Concurrent `401`s share a
//! single refresh call.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use authgate::prelude::*;
//!
//! # async fn example() -> authgate::error::Result<()> {
//! let config = GatewayConfig::from_env();
//! let session = Arc::new(InMemorySessionStore::new());
//! session.set(SessionUpdate::login("access", Some("refresh".to_string())));
//!
//! let gateway = Gateway::new(&config, session)?;
//! let items: serde_json::Value = gateway
//!     .fetch("/items", &FetchQuery::builder().limit(20).build())
//!     .await?;
//! println!("{items}");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod prelude;
pub mod session;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
