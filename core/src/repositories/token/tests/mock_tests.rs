//! Unit tests for the mock token repository
//!
//! These pin down the conditional-update contract that the MySQL
//! implementation provides, so service tests running against the mock
//! exercise the same semantics.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{RefreshToken, TokenState};
use crate::errors::DomainError;
use crate::repositories::token::{MockTokenRepository, TokenRepository};

#[tokio::test]
async fn test_save_and_find() {
    let repo = MockTokenRepository::new();
    let token = RefreshToken::new(Uuid::new_v4(), "hash_a".to_string(), false);

    let saved = repo.save(token.clone()).await.unwrap();
    assert_eq!(saved.id, token.id);

    let found = repo.find_by_hash("hash_a").await.unwrap();
    assert_eq!(found.unwrap().id, token.id);

    let by_id = repo.find_by_id(token.id).await.unwrap();
    assert!(by_id.is_some());
}

#[tokio::test]
async fn test_duplicate_hash_rejected() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    repo.save(RefreshToken::new(user_id, "same".to_string(), false))
        .await
        .unwrap();
    let result = repo
        .save(RefreshToken::new(user_id, "same".to_string(), false))
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_rotate_success_links_and_inserts() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();
    let old = RefreshToken::new(user_id, "old".to_string(), true);
    repo.save(old.clone()).await.unwrap();

    let replacement =
        RefreshToken::with_duration(user_id, "new".to_string(), old.session_duration_days);
    let won = repo.rotate("old", replacement).await.unwrap();
    assert!(won);

    let old_row = repo.find_by_hash("old").await.unwrap().unwrap();
    assert_eq!(old_row.replaced_by(), Some("new"));

    let new_row = repo.find_by_hash("new").await.unwrap().unwrap();
    assert_eq!(new_row.state, TokenState::Active);
    assert_eq!(new_row.session_duration_days, old.session_duration_days);
}

#[tokio::test]
async fn test_rotate_loses_on_revoked_row() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();
    repo.save(RefreshToken::new(user_id, "old".to_string(), false))
        .await
        .unwrap();
    repo.revoke("old").await.unwrap();

    let replacement = RefreshToken::with_duration(user_id, "new".to_string(), 1);
    let won = repo.rotate("old", replacement).await.unwrap();

    assert!(!won);
    // The losing replacement must not have been inserted
    assert!(repo.find_by_hash("new").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rotate_loses_on_absent_row() {
    let repo = MockTokenRepository::new();
    let replacement = RefreshToken::with_duration(Uuid::new_v4(), "new".to_string(), 1);

    let won = repo.rotate("never_existed", replacement).await.unwrap();

    assert!(!won);
    assert_eq!(repo.row_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_rotations_have_one_winner() {
    let repo = std::sync::Arc::new(MockTokenRepository::new());
    let user_id = Uuid::new_v4();
    repo.save(RefreshToken::new(user_id, "tip".to_string(), false))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            let replacement =
                RefreshToken::with_duration(user_id, format!("candidate_{}", i), 1);
            repo.rotate("tip", replacement).await.unwrap()
        }));
    }

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
    // Exactly one active tip remains for the chain
    let active = repo.find_active_by_user(user_id).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let repo = MockTokenRepository::new();
    repo.save(RefreshToken::new(Uuid::new_v4(), "h".to_string(), false))
        .await
        .unwrap();

    assert!(repo.revoke("h").await.unwrap());
    assert!(!repo.revoke("h").await.unwrap());
    assert!(!repo.revoke("missing").await.unwrap());
}

#[tokio::test]
async fn test_revoke_all_for_user() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    for i in 0..3 {
        repo.save(RefreshToken::new(user_id, format!("u1_{}", i), false))
            .await
            .unwrap();
    }
    repo.save(RefreshToken::new(other_user, "u2_0".to_string(), false))
        .await
        .unwrap();

    let count = repo.revoke_all_for_user(user_id).await.unwrap();
    assert_eq!(count, 3);

    assert!(repo.find_active_by_user(user_id).await.unwrap().is_empty());
    // The other user's tokens are untouched
    assert_eq!(repo.find_active_by_user(other_user).await.unwrap().len(), 1);

    // A second sweep finds nothing left to revoke
    assert_eq!(repo.revoke_all_for_user(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_revoke_all_except_current() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    for i in 0..3 {
        repo.save(RefreshToken::new(user_id, format!("s_{}", i), false))
            .await
            .unwrap();
    }

    let count = repo
        .revoke_all_for_user_except(user_id, "s_1")
        .await
        .unwrap();
    assert_eq!(count, 2);

    let active = repo.find_active_by_user(user_id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].token_hash, "s_1");
}

#[tokio::test]
async fn test_find_active_filters_and_orders() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    let mut expired = RefreshToken::new(user_id, "expired".to_string(), false);
    expired.expires_at = Utc::now() - Duration::hours(1);
    repo.save(expired).await.unwrap();

    let mut older = RefreshToken::new(user_id, "older".to_string(), false);
    older.issued_at = Utc::now() - Duration::hours(2);
    repo.save(older).await.unwrap();

    repo.save(RefreshToken::new(user_id, "newer".to_string(), false))
        .await
        .unwrap();
    repo.save(RefreshToken::new(user_id, "revoked".to_string(), false))
        .await
        .unwrap();
    repo.revoke("revoked").await.unwrap();

    let active = repo.find_active_by_user(user_id).await.unwrap();
    assert_eq!(active.len(), 2);
    // Newest first
    assert_eq!(active[0].token_hash, "newer");
    assert_eq!(active[1].token_hash, "older");
}

#[tokio::test]
async fn test_delete_expired_respects_grace() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    let mut expired = RefreshToken::new(user_id, "expired".to_string(), false);
    expired.expires_at = Utc::now() - Duration::hours(1);
    repo.save(expired).await.unwrap();

    repo.save(RefreshToken::new(user_id, "recently_revoked".to_string(), false))
        .await
        .unwrap();
    repo.revoke("recently_revoked").await.unwrap();

    repo.save(RefreshToken::new(user_id, "live".to_string(), false))
        .await
        .unwrap();

    let deleted = repo.delete_expired(7).await.unwrap();
    assert_eq!(deleted, 1);

    // Recently revoked rows stay for the audit grace period
    assert!(repo
        .find_by_hash("recently_revoked")
        .await
        .unwrap()
        .is_some());
    assert!(repo.find_by_hash("live").await.unwrap().is_some());
}

#[tokio::test]
async fn test_count_active_for_user() {
    let repo = MockTokenRepository::new();
    let user_id = Uuid::new_v4();

    assert_eq!(repo.count_active_for_user(user_id).await.unwrap(), 0);

    repo.save(RefreshToken::new(user_id, "a".to_string(), false))
        .await
        .unwrap();
    repo.save(RefreshToken::new(user_id, "b".to_string(), false))
        .await
        .unwrap();
    repo.revoke("a").await.unwrap();

    assert_eq!(repo.count_active_for_user(user_id).await.unwrap(), 1);
}
