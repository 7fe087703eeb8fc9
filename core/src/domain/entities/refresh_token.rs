//! Refresh token entities for rotating-session management.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime for a standard login (1 day)
pub const STANDARD_SESSION_DAYS: i64 = 1;

/// Session lifetime for a "remember me" login (30 days)
pub const REMEMBERED_SESSION_DAYS: i64 = 30;

/// State of a refresh token row
///
/// A token leaves `Active` exactly once: either it is rotated forward
/// (`RotatedAway`, keeping a link to its replacement) or it is revoked
/// without a successor (`Revoked`: natural expiry, logout, or a
/// security sweep). Both right-hand states are terminal. A revoked row
/// with a forward link and no revocation, or vice versa, cannot be
/// expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenState {
    /// The current tip of its rotation chain
    Active,

    /// Rotated forward; the hash of the replacement token is recorded
    RotatedAway {
        /// Hash of the token that replaced this one
        replaced_by_hash: String,
        /// When the rotation happened
        revoked_at: DateTime<Utc>,
    },

    /// Revoked with no successor (expiry, logout, or mass revocation)
    Revoked {
        /// When the revocation happened
        revoked_at: DateTime<Utc>,
    },
}

/// Refresh token entity stored in the database
///
/// The store only ever sees the SHA-256 hash of the opaque credential;
/// the raw value travels once, inside a [`SessionCredential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User this token belongs to
    pub user_id: Uuid,

    /// Hashed token value
    pub token_hash: String,

    /// When the token was issued
    pub issued_at: DateTime<Utc>,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// Session lifetime in days, fixed at login and carried unchanged
    /// through every rotation of the same chain
    pub session_duration_days: i64,

    /// Current lifecycle state
    pub state: TokenState,
}

impl RefreshToken {
    /// Creates a new chain root for a fresh login
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `token_hash` - The hashed token value
    /// * `remember` - Whether this is a "remember me" login
    pub fn new(user_id: Uuid, token_hash: String, remember: bool) -> Self {
        let days = if remember {
            REMEMBERED_SESSION_DAYS
        } else {
            STANDARD_SESSION_DAYS
        };
        Self::with_duration(user_id, token_hash, days)
    }

    /// Creates a token with an explicit session duration
    ///
    /// Used by rotation to propagate the chain's original duration into
    /// the replacement token.
    pub fn with_duration(user_id: Uuid, token_hash: String, session_duration_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            issued_at: now,
            expires_at: now + Duration::days(session_duration_days),
            session_duration_days,
            state: TokenState::Active,
        }
    }

    /// Checks if the token has passed its expiry instant
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks if the token has left the `Active` state
    pub fn is_revoked(&self) -> bool {
        !matches!(self.state, TokenState::Active)
    }

    /// Checks if the token is a live chain tip (not revoked, not expired)
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    /// Hash of the token that replaced this one, if it was rotated away
    pub fn replaced_by(&self) -> Option<&str> {
        match &self.state {
            TokenState::RotatedAway {
                replaced_by_hash, ..
            } => Some(replaced_by_hash),
            _ => None,
        }
    }

    /// When the token was revoked, if it was
    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            TokenState::Active => None,
            TokenState::RotatedAway { revoked_at, .. } => Some(*revoked_at),
            TokenState::Revoked { revoked_at } => Some(*revoked_at),
        }
    }

    /// Revokes the token without a successor
    ///
    /// Terminal states are immutable: calling this on an already
    /// rotated or revoked token is a no-op.
    pub fn revoke(&mut self) {
        if matches!(self.state, TokenState::Active) {
            self.state = TokenState::Revoked {
                revoked_at: Utc::now(),
            };
        }
    }

    /// Rotates the token forward, recording its replacement
    ///
    /// Returns `false` if the token was no longer active; the state is
    /// left untouched in that case.
    pub fn rotate_to(&mut self, replacement_hash: &str) -> bool {
        if !matches!(self.state, TokenState::Active) {
            return false;
        }
        self.state = TokenState::RotatedAway {
            replaced_by_hash: replacement_hash.to_string(),
            revoked_at: Utc::now(),
        };
        true
    }

    /// Time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Credential handed to the transport layer after a login or rotation
///
/// This is the only structure that carries the raw refresh token; it is
/// embedded in an HTTP-only cookie by the (external) transport layer
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Raw opaque refresh token value
    pub refresh_token: String,

    /// Identifier of the backing token row
    pub session_id: Uuid,

    /// When the credential expires
    pub expires_at: DateTime<Utc>,

    /// Session lifetime in days for the owning chain
    pub session_duration_days: i64,
}

impl SessionCredential {
    /// Creates a credential from a raw token value and its stored record
    pub fn new(refresh_token: String, record: &RefreshToken) -> Self {
        Self {
            refresh_token,
            session_id: record.id,
            expires_at: record.expires_at,
            session_duration_days: record.session_duration_days,
        }
    }
}
