//! Domain entities representing core business objects.

pub mod refresh_token;

// Re-export commonly used types
pub use refresh_token::{
    RefreshToken, SessionCredential, TokenState, REMEMBERED_SESSION_DAYS, STANDARD_SESSION_DAYS,
};
