//! Refresh token lifecycle tests against an in-memory database.

use chirpy::auth::{
    RefreshError, issue_refresh_token, resolve_refresh_token, revoke_refresh_token,
};
use chirpy::db::Database;
use std::time::{SystemTime, UNIX_EPOCH};

async fn test_db_with_user() -> (Database, i64) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let user_id = db
        .users()
        .create("uuid-alice", "alice@example.com", "hash")
        .await
        .unwrap();
    (db, user_id)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[tokio::test]
async fn test_issue_then_resolve() {
    let (db, user_id) = test_db_with_user().await;

    let issued = issue_refresh_token(&db, user_id).await.unwrap();
    assert_eq!(issued.token.len(), 64);
    assert!(issued.expires_at > now_secs());

    let resolved = resolve_refresh_token(&db, &issued.token).await.unwrap();
    assert_eq!(resolved, user_id);
}

#[tokio::test]
async fn test_issued_tokens_are_distinct() {
    let (db, user_id) = test_db_with_user().await;

    let t1 = issue_refresh_token(&db, user_id).await.unwrap();
    let t2 = issue_refresh_token(&db, user_id).await.unwrap();
    assert_ne!(t1.token, t2.token);
}

#[tokio::test]
async fn test_resolve_unknown_token() {
    let (db, _) = test_db_with_user().await;

    let result = resolve_refresh_token(&db, "no-such-token").await;
    assert!(matches!(result, Err(RefreshError::NotFound)));
}

#[tokio::test]
async fn test_revoke_blocks_resolve() {
    let (db, user_id) = test_db_with_user().await;

    let issued = issue_refresh_token(&db, user_id).await.unwrap();
    revoke_refresh_token(&db, &issued.token).await.unwrap();

    let result = resolve_refresh_token(&db, &issued.token).await;
    assert!(matches!(result, Err(RefreshError::Revoked)));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (db, user_id) = test_db_with_user().await;

    // Insert a row whose expiry has already passed, bypassing the policy layer
    db.refresh_tokens()
        .insert("expired-token", user_id, now_secs() - 10)
        .await
        .unwrap();

    let result = resolve_refresh_token(&db, "expired-token").await;
    assert!(matches!(result, Err(RefreshError::Expired)));
}

#[tokio::test]
async fn test_revoke_unknown_token_is_not_found() {
    let (db, _) = test_db_with_user().await;

    let result = revoke_refresh_token(&db, "no-such-token").await;
    assert!(matches!(result, Err(RefreshError::NotFound)));
}

#[tokio::test]
async fn test_double_revoke_never_reactivates() {
    let (db, user_id) = test_db_with_user().await;

    let issued = issue_refresh_token(&db, user_id).await.unwrap();
    revoke_refresh_token(&db, &issued.token).await.unwrap();
    let first = db
        .refresh_tokens()
        .get(&issued.token)
        .await
        .unwrap()
        .unwrap()
        .revoked_at
        .unwrap();

    // A second revoke succeeds but keeps the original timestamp
    revoke_refresh_token(&db, &issued.token).await.unwrap();
    let record = db
        .refresh_tokens()
        .get(&issued.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.revoked_at, Some(first));

    let result = resolve_refresh_token(&db, &issued.token).await;
    assert!(matches!(result, Err(RefreshError::Revoked)));
}

#[tokio::test]
async fn test_revocation_is_per_token() {
    let (db, user_id) = test_db_with_user().await;

    let t1 = issue_refresh_token(&db, user_id).await.unwrap();
    let t2 = issue_refresh_token(&db, user_id).await.unwrap();

    revoke_refresh_token(&db, &t1.token).await.unwrap();

    assert!(matches!(
        resolve_refresh_token(&db, &t1.token).await,
        Err(RefreshError::Revoked)
    ));
    assert_eq!(resolve_refresh_token(&db, &t2.token).await.unwrap(), user_id);
}
