//! MySQL implementation of the TokenRepository trait.
//!
//! Backing table (`refresh_tokens`): `id`, `user_id`, `token_hash`
//! (unique), `issued_at`, `expires_at`, `session_duration_days`,
//! `is_revoked`, `replaced_by_hash` (nullable), `revoked_at`
//! (nullable), with a secondary index on `user_id`.
//!
//! Every state transition is a conditional UPDATE guarded by
//! `is_revoked = FALSE`; the affected-row count is what decides races.
//! Rotation additionally wraps the conditional revoke and the insert of
//! the replacement row in one transaction, so concurrent rotations of
//! the same token resolve to exactly one winner.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use vl_core::domain::entities::{RefreshToken, TokenState};
use vl_core::errors::DomainError;
use vl_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

const INSERT_SQL: &str = r#"
    INSERT INTO refresh_tokens (
        id, user_id, token_hash, issued_at, expires_at,
        session_duration_days, is_revoked, replaced_by_hash, revoked_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_hash, issued_at, expires_at,
           session_duration_days, is_revoked, replaced_by_hash, revoked_at
    FROM refresh_tokens
"#;

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Hash a raw token value using SHA-256
    ///
    /// Matches the hashing the session service applies before storage;
    /// useful for operational lookups of a presented raw value.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn internal(context: &str, e: impl std::fmt::Display) -> DomainError {
        DomainError::Internal {
            message: format!("{}: {}", context, e),
        }
    }

    /// Convert a database row to a RefreshToken entity
    ///
    /// The flag plus nullable-link columns collapse into the
    /// `TokenState` sum type; a row that cannot be expressed there
    /// (e.g. unrevoked but forward-linked) is reported as corruption
    /// rather than guessed at.
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| Self::internal("Failed to get id", e))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| Self::internal("Failed to get user_id", e))?;
        let is_revoked: bool = row
            .try_get("is_revoked")
            .map_err(|e| Self::internal("Failed to get is_revoked", e))?;
        let replaced_by_hash: Option<String> = row
            .try_get("replaced_by_hash")
            .map_err(|e| Self::internal("Failed to get replaced_by_hash", e))?;
        let revoked_at: Option<DateTime<Utc>> = row
            .try_get("revoked_at")
            .map_err(|e| Self::internal("Failed to get revoked_at", e))?;

        let state = match (is_revoked, replaced_by_hash) {
            (false, None) => TokenState::Active,
            (true, Some(replaced_by_hash)) => TokenState::RotatedAway {
                replaced_by_hash,
                revoked_at: revoked_at.ok_or_else(|| DomainError::Internal {
                    message: format!("Token {} is rotated but has no revoked_at", id),
                })?,
            },
            (true, None) => TokenState::Revoked {
                revoked_at: revoked_at.ok_or_else(|| DomainError::Internal {
                    message: format!("Token {} is revoked but has no revoked_at", id),
                })?,
            },
            (false, Some(_)) => {
                return Err(DomainError::Internal {
                    message: format!("Token {} is unrevoked but forward-linked", id),
                })
            }
        };

        Ok(RefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| Self::internal("Invalid token UUID", e))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| Self::internal("Invalid user UUID", e))?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| Self::internal("Failed to get token_hash", e))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| Self::internal("Failed to get issued_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| Self::internal("Failed to get expires_at", e))?,
            session_duration_days: row
                .try_get("session_duration_days")
                .map_err(|e| Self::internal("Failed to get session_duration_days", e))?,
            state,
        })
    }

    /// Insert a token row on the given executor (pool or transaction)
    async fn insert_token<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        let (is_revoked, replaced_by_hash, revoked_at) = match &token.state {
            TokenState::Active => (false, None, None),
            TokenState::RotatedAway {
                replaced_by_hash,
                revoked_at,
            } => (true, Some(replaced_by_hash.clone()), Some(*revoked_at)),
            TokenState::Revoked { revoked_at } => (true, None, Some(*revoked_at)),
        };

        sqlx::query(INSERT_SQL)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.session_duration_days)
            .bind(is_revoked)
            .bind(replaced_by_hash)
            .bind(revoked_at)
            .execute(executor)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        Self::insert_token(&self.pool, &token)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .is_some_and(|d| d.is_unique_violation())
                {
                    DomainError::Validation {
                        message: "Token already exists".to_string(),
                    }
                } else {
                    Self::internal("Failed to save refresh token", e)
                }
            })?;

        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::internal("Failed to find refresh token", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::internal("Failed to find token by id", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_revoked = FALSE AND expires_at > ? \
             ORDER BY issued_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::internal("Failed to find user tokens", e))?;

        let mut tokens = Vec::new();
        for row in rows {
            tokens.push(Self::row_to_token(&row)?);
        }

        Ok(tokens)
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::internal("Failed to begin rotation transaction", e))?;

        // Conditional transition out of Active. The affected-row count
        // is the arbiter: whoever gets 0 here lost the race.
        let updated = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, replaced_by_hash = ?, revoked_at = ?
            WHERE token_hash = ? AND is_revoked = FALSE
            "#,
        )
        .bind(&replacement.token_hash)
        .bind(Utc::now())
        .bind(old_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::internal("Failed to revoke rotated token", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| Self::internal("Failed to roll back lost rotation", e))?;
            return Ok(false);
        }

        Self::insert_token(&mut *tx, &replacement)
            .await
            .map_err(|e| Self::internal("Failed to insert replacement token", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::internal("Failed to commit rotation", e))?;

        Ok(true)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE token_hash = ? AND is_revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::internal("Failed to revoke token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE user_id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::internal("Failed to revoke user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_for_user_except(
        &self,
        user_id: Uuid,
        keep_hash: &str,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE user_id = ? AND token_hash <> ? AND is_revoked = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(user_id.to_string())
        .bind(keep_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::internal("Failed to revoke other user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, revoked_grace_days: i64) -> Result<usize, DomainError> {
        let now = Utc::now();
        let revoked_cutoff = now - Duration::days(revoked_grace_days);

        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < ? OR (is_revoked = TRUE AND revoked_at < ?)
            "#,
        )
        .bind(now)
        .bind(revoked_cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::internal("Failed to delete expired tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}
