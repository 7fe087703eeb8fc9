//! In-memory mock of [`TokenRepository`] for testing
//!
//! Faithfully reproduces the conditional-update semantics of the real
//! store: `rotate` and the revocation methods only transition rows that
//! are still active, under a single write lock, so racing callers see
//! the same win/lose outcomes as against MySQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::RefreshToken;
use crate::errors::DomainError;
use crate::repositories::token::TokenRepository;

/// Mock token repository keyed by token hash
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl MockTokenRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of rows currently stored, regardless of state
    pub async fn row_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut active: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(active)
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        // One write lock spans the check and both writes, mirroring the
        // store transaction boundary.
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&replacement.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        let won = match tokens.get_mut(old_hash) {
            Some(old) => old.rotate_to(&replacement.token_hash),
            None => false,
        };

        if won {
            tokens.insert(replacement.token_hash.clone(), replacement);
        }

        Ok(won)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked() => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.is_revoked() {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_all_for_user_except(
        &self,
        user_id: Uuid,
        keep_hash: &str,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && token.token_hash != keep_hash && !token.is_revoked() {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired(&self, revoked_grace_days: i64) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let cutoff = Utc::now() - Duration::days(revoked_grace_days);
        let before = tokens.len();

        tokens.retain(|_, t| {
            if t.is_expired() {
                return false;
            }
            match t.revoked_at() {
                Some(at) => at > cutoff,
                None => true,
            }
        });

        Ok(before - tokens.len())
    }
}
