//! Integration tests for the lifecycle core: issuance, verification,
//! revocation, and the atomicity of consume-on-verify under concurrency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use warrant_core::{License, VerifyDenial, VerifyOutcome};
use warrant_state::{db, IssueBatch, LicenseLifecycle, LifecycleError, NotificationSink, StoreError};

async fn setup() -> (TempDir, LicenseLifecycle) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = db::open(dir.path().join("licenses.db"))
        .await
        .expect("open database");
    (dir, LicenseLifecycle::new(pool))
}

fn batch(count: u32, max_uses: i64) -> IssueBatch {
    IssueBatch {
        count,
        prefix: String::new(),
        max_uses,
        owner: "test-owner".to_string(),
        expires_in_days: 0,
    }
}

async fn issue_one(lifecycle: &LicenseLifecycle, max_uses: i64) -> String {
    lifecycle
        .issue_batch(&batch(1, max_uses))
        .await
        .expect("issue license")
        .remove(0)
}

// ── Issuance ─────────────────────────────────────────────────────────

#[tokio::test]
async fn issue_batch_creates_distinct_listed_licenses() {
    let (_dir, lifecycle) = setup().await;

    let created = lifecycle.issue_batch(&batch(5, 2)).await.unwrap();
    assert_eq!(created.len(), 5);

    let distinct: std::collections::HashSet<_> = created.iter().collect();
    assert_eq!(distinct.len(), 5);

    let listed = lifecycle.licenses().list().await.unwrap();
    assert_eq!(listed.len(), 5);
    for license in &listed {
        assert!(created.contains(&license.key));
        assert_eq!(license.uses_consumed, 0);
        assert_eq!(license.max_uses, 2);
        assert!(!license.revoked);
        assert!(license.expires_at.is_none());
    }
}

#[tokio::test]
async fn issue_batch_applies_prefix_and_expiry() {
    let (_dir, lifecycle) = setup().await;

    let created = lifecycle
        .issue_batch(&IssueBatch {
            count: 2,
            prefix: "VIP".to_string(),
            max_uses: 1,
            owner: String::new(),
            expires_in_days: 30,
        })
        .await
        .unwrap();

    for key in &created {
        assert!(key.starts_with("VIP-"));
        let license = lifecycle.licenses().get(key).await.unwrap().unwrap();
        let expires = license.expires_at.expect("expiry set");
        let days_out = expires - Utc::now();
        assert!(days_out > Duration::days(29) && days_out <= Duration::days(30));
    }
}

#[tokio::test]
async fn issue_batch_rejects_nonpositive_max_uses() {
    let (_dir, lifecycle) = setup().await;

    for max_uses in [0, -3] {
        let result = lifecycle.issue_batch(&batch(1, max_uses)).await;
        assert!(matches!(result, Err(LifecycleError::InvalidRequest(_))));
    }
    assert!(lifecycle.licenses().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn issue_batch_rejects_zero_count() {
    let (_dir, lifecycle) = setup().await;
    let result = lifecycle.issue_batch(&batch(0, 1)).await;
    assert!(matches!(result, Err(LifecycleError::InvalidRequest(_))));
}

#[tokio::test]
async fn duplicate_key_insert_reports_conflict() {
    let (_dir, lifecycle) = setup().await;

    let first = License::issue("FIXED-KEY".to_string(), String::new(), 1, None);
    lifecycle.licenses().insert(&first).await.unwrap();

    let second = License::issue("FIXED-KEY".to_string(), String::new(), 1, None);
    let result = lifecycle.licenses().insert(&second).await;
    assert!(matches!(result, Err(StoreError::Conflict { .. })));
}

// ── Verification ─────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_key_is_denied_not_found() {
    let (_dir, lifecycle) = setup().await;
    let outcome = lifecycle
        .verify("NO-SUCH-KEY", "player", "game", "")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Denied(VerifyDenial::NotFound));
    assert_eq!(lifecycle.activations().count().await.unwrap(), 0);
}

#[tokio::test]
async fn accepts_exactly_max_uses_verifications() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 3).await;

    for i in 0..3 {
        let outcome = lifecycle
            .verify(&key, &format!("player-{i}"), "game", "")
            .await
            .unwrap();
        assert_eq!(outcome, VerifyOutcome::Valid, "verification {i} should pass");
    }

    let fourth = lifecycle.verify(&key, "player-3", "game", "").await.unwrap();
    assert_eq!(fourth, VerifyOutcome::Denied(VerifyDenial::ExhaustedUses));

    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert_eq!(license.uses_consumed, 3);
    assert_eq!(lifecycle.activations().count().await.unwrap(), 3);
}

#[tokio::test]
async fn expired_license_is_denied_regardless_of_remaining_uses() {
    let (_dir, lifecycle) = setup().await;

    let license = License::issue(
        "EXPIRED-KEY".to_string(),
        String::new(),
        100,
        Some(Utc::now() - Duration::hours(1)),
    );
    lifecycle.licenses().insert(&license).await.unwrap();

    let outcome = lifecycle
        .verify("EXPIRED-KEY", "player", "game", "")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Denied(VerifyDenial::Expired));

    let stored = lifecycle.licenses().get("EXPIRED-KEY").await.unwrap().unwrap();
    assert_eq!(stored.uses_consumed, 0);
    assert_eq!(lifecycle.activations().count().await.unwrap(), 0);
}

#[tokio::test]
async fn denied_verification_appends_no_activation() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 1).await;

    lifecycle.revoke(&key).await.unwrap();
    let outcome = lifecycle.verify(&key, "player", "game", "").await.unwrap();
    assert_eq!(outcome, VerifyOutcome::Denied(VerifyDenial::Revoked));
    assert_eq!(lifecycle.activations().count().await.unwrap(), 0);

    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert_eq!(license.uses_consumed, 0);
}

#[tokio::test]
async fn activation_records_identity_context_and_origin() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 1).await;

    lifecycle
        .verify(&key, "player1", "game-42", "203.0.113.7")
        .await
        .unwrap();

    let recent = lifecycle.activations().recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].license_key, key);
    assert_eq!(recent[0].client_identity, "player1");
    assert_eq!(recent[0].context, "game-42");
    assert_eq!(recent[0].origin, "203.0.113.7");
}

#[tokio::test]
async fn recent_activations_are_bounded_and_newest_first() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 10).await;

    for i in 0..6 {
        lifecycle
            .verify(&key, &format!("player-{i}"), "game", "")
            .await
            .unwrap();
    }

    let recent = lifecycle.activations().recent(4).await.unwrap();
    assert_eq!(recent.len(), 4);
    for pair in recent.windows(2) {
        assert!(pair[0].time >= pair[1].time);
    }
}

// ── Revocation ───────────────────────────────────────────────────────

#[tokio::test]
async fn revoke_is_idempotent() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 5).await;

    lifecycle.revoke(&key).await.unwrap();
    lifecycle.revoke(&key).await.unwrap();

    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert!(license.revoked);
}

#[tokio::test]
async fn revoke_unknown_key_is_not_found() {
    let (_dir, lifecycle) = setup().await;
    let result = lifecycle.revoke("NO-SUCH-KEY").await;
    assert!(matches!(result, Err(LifecycleError::NotFound { .. })));
}

#[tokio::test]
async fn revocation_is_immediately_visible_to_verification() {
    let (_dir, lifecycle) = setup().await;
    let key = issue_one(&lifecycle, 5).await;

    let before = lifecycle.verify(&key, "player", "game", "").await.unwrap();
    assert_eq!(before, VerifyOutcome::Valid);

    lifecycle.revoke(&key).await.unwrap();

    let after = lifecycle.verify(&key, "player", "game", "").await.unwrap();
    assert_eq!(after, VerifyOutcome::Denied(VerifyDenial::Revoked));
}

// ── Concurrency ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_use_slot_goes_to_exactly_one_of_two_racers() {
    let (_dir, lifecycle) = setup().await;
    let lifecycle = Arc::new(lifecycle);
    let key = issue_one(&lifecycle, 1).await;

    let a = {
        let lifecycle = Arc::clone(&lifecycle);
        let key = key.clone();
        tokio::spawn(async move { lifecycle.verify(&key, "racer-a", "game", "").await })
    };
    let b = {
        let lifecycle = Arc::clone(&lifecycle);
        let key = key.clone();
        tokio::spawn(async move { lifecycle.verify(&key, "racer-b", "game", "").await })
    };

    let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
    let valid = outcomes.iter().filter(|o| o.is_valid()).count();
    assert_eq!(valid, 1, "exactly one racer wins the last slot: {outcomes:?}");
    assert!(outcomes
        .iter()
        .any(|o| *o == VerifyOutcome::Denied(VerifyDenial::ExhaustedUses)));

    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert_eq!(license.uses_consumed, 1);
    assert_eq!(lifecycle.activations().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counter_never_exceeds_ceiling_under_contention() {
    let (_dir, lifecycle) = setup().await;
    let lifecycle = Arc::new(lifecycle);
    let key = issue_one(&lifecycle, 5).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let lifecycle = Arc::clone(&lifecycle);
        let key = key.clone();
        tasks.push(tokio::spawn(async move {
            lifecycle.verify(&key, &format!("client-{i}"), "game", "").await
        }));
    }

    let mut valid = 0;
    let mut exhausted = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            VerifyOutcome::Valid => valid += 1,
            VerifyOutcome::Denied(VerifyDenial::ExhaustedUses) => exhausted += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(valid, 5);
    assert_eq!(exhausted, 15);

    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert_eq!(license.uses_consumed, 5);
    assert!(license.uses_consumed <= license.max_uses);
    assert_eq!(lifecycle.activations().count().await.unwrap(), 5);
}

// ── Notification ─────────────────────────────────────────────────────

struct CountingSink {
    delivered: AtomicUsize,
}

impl NotificationSink for CountingSink {
    fn deliver(&self, _title: &str, _description: &str) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn successful_verification_notifies_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::open(dir.path().join("licenses.db")).await.unwrap();
    let sink = Arc::new(CountingSink {
        delivered: AtomicUsize::new(0),
    });
    let lifecycle = LicenseLifecycle::new(pool).with_notifier(sink.clone());

    let key = issue_one(&lifecycle, 1).await;
    lifecycle.verify(&key, "player", "game", "").await.unwrap();
    assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);

    // A denied attempt emits nothing.
    lifecycle.verify(&key, "player", "game", "").await.unwrap();
    assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
}

// ── Durability ───────────────────────────────────────────────────────

#[tokio::test]
async fn state_survives_pool_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licenses.db");

    let key = {
        let pool = db::open(&path).await.unwrap();
        let lifecycle = LicenseLifecycle::new(pool.clone());
        let key = issue_one(&lifecycle, 2).await;
        lifecycle.verify(&key, "player", "game", "").await.unwrap();
        pool.close().await;
        key
    };

    let pool = db::open(&path).await.unwrap();
    let lifecycle = LicenseLifecycle::new(pool);
    let license = lifecycle.licenses().get(&key).await.unwrap().unwrap();
    assert_eq!(license.uses_consumed, 1);
    assert_eq!(lifecycle.activations().count().await.unwrap(), 1);
}
