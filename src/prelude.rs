//! Convenience re-exports for common use.

pub use crate::auth::{IdentityProvider, WaitStrategy};
pub use crate::config::GatewayConfig;
pub use crate::error::{GatewayError, Result};
pub use crate::fetch::{FetchQuery, SortOrder};
pub use crate::gateway::{Gateway, PendingRequest};
pub use crate::session::{InMemorySessionStore, SessionState, SessionStore, SessionUpdate};
pub use crate::transport::ApiResponse;
