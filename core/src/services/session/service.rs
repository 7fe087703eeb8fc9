//! Main session service implementation
//!
//! Issues, rotates, and revokes refresh tokens, and exposes the session
//! inventory built on top of them. Every operation goes through the
//! [`TokenRepository`] seam; the conditional-update contract of that
//! trait is what makes rotation safe under concurrent duplicate
//! requests.

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::{RefreshToken, SessionCredential};
use crate::domain::value_objects::SessionView;
use crate::errors::{DomainError, SessionError};
use crate::repositories::TokenRepository;

use super::config::SessionServiceConfig;

/// Outcome of presenting a refresh token for rotation
///
/// Expiry and reuse are reported as outcomes rather than errors so the
/// transport layer can give them distinct responses: a silent re-login
/// prompt for `RejectedExpired`, a forced sign-out warning for
/// `RejectedReused`. Both are unauthenticated-class results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was valid; a fresh credential replaces it
    Rotated(SessionCredential),
    /// The token was a legitimate tip that aged out
    RejectedExpired,
    /// The token was already revoked - a replay. Every session of the
    /// owning user has been revoked as a consequence.
    RejectedReused,
}

/// Service for managing rotating refresh-token sessions
pub struct SessionService<R: TokenRepository> {
    pub(crate) repository: R,
    config: SessionServiceConfig,
}

impl<R: TokenRepository> SessionService<R> {
    /// Creates a new session service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for persistence
    /// * `config` - Session service configuration
    pub fn new(repository: R, config: SessionServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Issues a brand-new session for a successful login
    ///
    /// The returned credential starts a fresh rotation chain with no
    /// relation to any prior token.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `remember` - Whether this is a "remember me" login (30 days
    ///   instead of 1)
    ///
    /// # Returns
    ///
    /// * `Ok(SessionCredential)` - Raw token for the transport layer
    /// * `Err(DomainError)` - Persistence failed
    pub async fn issue_session(
        &self,
        user_id: Uuid,
        remember: bool,
    ) -> Result<SessionCredential, DomainError> {
        let raw = self.generate_token_value();
        let record = RefreshToken::with_duration(
            user_id,
            Self::hash_token(&raw),
            self.config.duration_days(remember),
        );

        let saved = self.repository.save(record).await.map_err(|e| {
            tracing::error!("Failed to persist new session for user {}: {}", user_id, e);
            DomainError::Session(SessionError::TokenGenerationFailed)
        })?;

        tracing::info!(
            "Issued session {} for user {} ({} day{})",
            saved.id,
            user_id,
            saved.session_duration_days,
            if saved.session_duration_days == 1 { "" } else { "s" },
        );

        Ok(SessionCredential::new(raw, &saved))
    }

    /// Rotates a presented refresh token
    ///
    /// The branch order is load-bearing: revocation is checked before
    /// expiry, so presenting an expired token that was already rotated
    /// away still counts as a replay and triggers the full-session
    /// revocation, not a mere expiry rejection.
    ///
    /// # Arguments
    ///
    /// * `presented` - The raw refresh token from the caller
    ///
    /// # Returns
    ///
    /// * `Ok(RotationOutcome)` - Rotated, expired, or reused
    /// * `Err(DomainError)` - Store failure (transient; never a reuse
    ///   verdict)
    pub async fn rotate_session(&self, presented: &str) -> Result<RotationOutcome, DomainError> {
        let hash = Self::hash_token(presented);

        let Some(current) = self.repository.find_by_hash(&hash).await? else {
            // Unknown credential. Surfaced exactly like a reuse so the
            // response does not reveal whether the value ever existed.
            tracing::warn!("Rotation attempted with unknown refresh token");
            return Ok(RotationOutcome::RejectedReused);
        };

        if current.is_revoked() {
            return self.handle_replay(&current).await;
        }

        if current.is_expired() {
            // A legitimate tip that aged out: revoke it without a
            // forward link so audit can tell expiry from replay.
            self.repository.revoke(&hash).await?;
            tracing::info!(
                "Refresh token for user {} expired at {}; session ended",
                current.user_id,
                current.expires_at
            );
            return Ok(RotationOutcome::RejectedExpired);
        }

        // Valid tip: attempt the atomic rotation. The chain's original
        // session duration carries into the replacement unchanged.
        let raw = self.generate_token_value();
        let replacement = RefreshToken::with_duration(
            current.user_id,
            Self::hash_token(&raw),
            current.session_duration_days,
        );
        let record = replacement.clone();

        if self.repository.rotate(&hash, replacement).await? {
            tracing::debug!(
                "Rotated session for user {}: {} -> {}",
                current.user_id,
                current.id,
                record.id
            );
            Ok(RotationOutcome::Rotated(SessionCredential::new(raw, &record)))
        } else {
            // A concurrent request rotated this token first. For this
            // caller the row is now a revoked one, which is the replay
            // case - the conservative outcome for a race we cannot
            // attribute to a client retry versus a captured token.
            tracing::warn!(
                "Lost rotation race on token {} for user {}",
                current.id,
                current.user_id
            );
            self.handle_replay(&current).await
        }
    }

    /// Replay response: revoke the user's entire session set
    ///
    /// The system cannot know which chain is compromised, so all of
    /// them go, forcing a full re-authentication.
    async fn handle_replay(&self, token: &RefreshToken) -> Result<RotationOutcome, DomainError> {
        let revoked = self.repository.revoke_all_for_user(token.user_id).await?;
        tracing::warn!(
            "Replay of refresh token {} detected for user {}; revoked {} active token(s)",
            token.id,
            token.user_id,
            revoked
        );
        Ok(RotationOutcome::RejectedReused)
    }

    /// Ends a session (logout)
    ///
    /// Always succeeds from the caller's point of view: a missing,
    /// garbled, already-revoked, or expired token and even a store
    /// failure all report the same way, so logout cannot be used as an
    /// oracle for probing token validity.
    pub async fn end_session(&self, presented: &str) {
        let hash = Self::hash_token(presented);

        match self.repository.revoke(&hash).await {
            Ok(true) => tracing::debug!("Session ended"),
            Ok(false) => tracing::debug!("Logout with unknown or already-revoked token"),
            Err(e) => tracing::error!("Store failure during logout (swallowed): {}", e),
        }
    }

    /// Revokes every active session of a user
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tokens revoked
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let revoked = self.repository.revoke_all_for_user(user_id).await?;
        tracing::info!("Revoked all {} active token(s) for user {}", revoked, user_id);
        Ok(revoked)
    }

    /// Lists the user's active sessions
    ///
    /// Revoked and expired rows are hidden; the entry backing the
    /// caller's own credential is flagged `is_current`. Order is newest
    /// first.
    pub async fn list_sessions(
        &self,
        user_id: Uuid,
        presented: &str,
    ) -> Result<Vec<SessionView>, DomainError> {
        let current_hash = Self::hash_token(presented);
        let tokens = self.repository.find_active_by_user(user_id).await?;

        Ok(tokens
            .iter()
            .map(|t| SessionView::from_token(t, &current_hash))
            .collect())
    }

    /// Deletes (revokes) one of the user's other sessions
    ///
    /// # Arguments
    ///
    /// * `user_id` - The calling user
    /// * `session_id` - Id of the session row to delete
    /// * `presented` - The caller's own refresh token
    ///
    /// # Returns
    ///
    /// * `Err(SessionError::NotFound)` - Absent, another user's, or no
    ///   longer active
    /// * `Err(SessionError::CurrentSession)` - The caller's own session;
    ///   logout must be used instead
    pub async fn delete_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        presented: &str,
    ) -> Result<(), DomainError> {
        let token = self
            .repository
            .find_by_id(session_id)
            .await?
            .filter(|t| t.user_id == user_id && t.is_active())
            .ok_or(SessionError::NotFound)?;

        if token.token_hash == Self::hash_token(presented) {
            return Err(SessionError::CurrentSession.into());
        }

        self.repository.revoke(&token.token_hash).await?;
        tracing::info!("User {} deleted session {}", user_id, session_id);
        Ok(())
    }

    /// Deletes every session of the user except the caller's own
    ///
    /// Succeeds even when there is nothing to delete.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions revoked
    pub async fn delete_other_sessions(
        &self,
        user_id: Uuid,
        presented: &str,
    ) -> Result<usize, DomainError> {
        let keep = Self::hash_token(presented);
        let revoked = self
            .repository
            .revoke_all_for_user_except(user_id, &keep)
            .await?;

        tracing::info!(
            "User {} deleted {} other session(s)",
            user_id,
            revoked
        );
        Ok(revoked)
    }

    /// Generates a fresh high-entropy token value
    fn generate_token_value(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.config.token_length)
            .map(|_| {
                let idx = rng.gen_range(0..62);
                match idx {
                    0..10 => (b'0' + idx) as char,
                    10..36 => (b'a' + idx - 10) as char,
                    36..62 => (b'A' + idx - 36) as char,
                    _ => unreachable!(),
                }
            })
            .collect()
    }

    /// Hashes a token value for storage and lookup
    pub(crate) fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
