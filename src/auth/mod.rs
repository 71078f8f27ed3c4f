//! Identity-provider client and refresh coordination.

pub mod coordinator;
pub mod error;
pub mod identity;

pub use coordinator::{
    RefreshCoordinator, RefreshHandle, RefreshOutcome, RefreshTicket, WaitStrategy,
};
pub use error::AuthError;
pub use identity::{IdentityProvider, TokenGrant};
