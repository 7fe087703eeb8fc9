//! Session view value object for the session-inventory endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::RefreshToken;

/// One active session as reported to the user
///
/// A session corresponds to a rotation chain; the chain's live tip is
/// what gets listed here. The raw or hashed token value is deliberately
/// absent from this view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    /// Identifier of the session's current token row
    pub id: Uuid,

    /// When this tip was issued
    pub issued_at: DateTime<Utc>,

    /// When the session expires unless rotated
    pub expires_at: DateTime<Utc>,

    /// Whether this is the session of the calling client
    pub is_current: bool,
}

impl SessionView {
    /// Builds a view from a stored token, marking it current when its
    /// hash matches the hash of the caller's presented credential
    pub fn from_token(token: &RefreshToken, current_hash: &str) -> Self {
        Self {
            id: token.id,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            is_current: token.token_hash == current_hash,
        }
    }
}
