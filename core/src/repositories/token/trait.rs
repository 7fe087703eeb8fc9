//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// This trait is the only seam between the rotation engine and durable
/// storage. Implementations must honor two contracts beyond plain CRUD:
///
/// - `rotate` is a single atomic transaction whose precondition is that
///   the old row is still unrevoked. Exactly one of any number of
///   concurrent callers observes `true`; the rest observe `false` with
///   no replacement row inserted.
/// - Every revocation is conditional on `revoked = false`, so revoking
///   twice (or revoking something absent) reports `false` rather than
///   erroring.
///
/// # Security Considerations
/// - Only token hashes are stored; raw values never reach this layer
/// - Revoked rows are immutable apart from their already-set forward link
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token to the repository
    ///
    /// # Arguments
    /// * `token` - The RefreshToken entity to persist
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError::Validation)` - A row with the same hash exists
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    ///
    /// Returns the row regardless of state; classifying a revoked or
    /// expired row is the engine's job, not the store's.
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found
    /// * `Ok(None)` - No token with the given hash
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find a refresh token by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError>;

    /// Find all active tokens for a user
    ///
    /// Active means not revoked and not yet expired. Results are ordered
    /// by issuance time, newest first, so listings stay stable.
    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Atomically rotate a token forward
    ///
    /// In one transaction: conditionally revoke the old row (precondition
    /// `revoked = false`), record the replacement's hash as its forward
    /// link, and insert the replacement row.
    ///
    /// # Arguments
    /// * `old_hash` - Hash of the presented token being rotated away
    /// * `replacement` - The freshly generated successor token
    ///
    /// # Returns
    /// * `Ok(true)` - This caller won; the replacement is persisted
    /// * `Ok(false)` - The old row was already revoked (or absent); no
    ///   replacement was inserted - the caller lost the race
    async fn rotate(&self, old_hash: &str, replacement: RefreshToken)
        -> Result<bool, DomainError>;

    /// Revoke a single token without a successor
    ///
    /// Idempotent: revoking an absent or already-revoked row is not an
    /// error.
    ///
    /// # Returns
    /// * `Ok(true)` - The row transitioned out of `Active` now
    /// * `Ok(false)` - Nothing to do (absent or already revoked)
    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Revoke every unrevoked token belonging to a user
    ///
    /// One bulk conditional update; used on logout-everywhere and on
    /// replay detection.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows revoked
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError>;

    /// Revoke every unrevoked token for a user except one
    ///
    /// # Arguments
    /// * `user_id` - The user whose sessions are being swept
    /// * `keep_hash` - Hash of the caller's current token, left untouched
    async fn revoke_all_for_user_except(
        &self,
        user_id: Uuid,
        keep_hash: &str,
    ) -> Result<usize, DomainError>;

    /// Physically delete rows that no longer matter
    ///
    /// Removes rows that are expired, or revoked longer ago than the
    /// grace period. Maintenance only; correctness never depends on it
    /// because expiry is checked lazily on presentation.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_expired(&self, revoked_grace_days: i64) -> Result<usize, DomainError>;

    /// Count active tokens for a user
    async fn count_active_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let tokens = self.find_active_by_user(user_id).await?;
        Ok(tokens.len())
    }
}
