//! Integration tests for the membership reconciler.
//!
//! These tests drive the public API end to end:
//! 1. Webhook entries create, update and delete patrons
//! 2. A bulk pull follows pagination and rebuilds the snapshot
//! 3. Paid coverage is tracked in the expiration ledger and cleared again
//!    once the patron is back in a reward
//!
//! Uses in-memory and file-backed stores, a scripted billing API and a fixed
//! clock, so no external services are needed.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use patron_sync::adapters::access::{AccessCall, RecordingAccessGrant};
use patron_sync::adapters::identity::{StaticIdentityResolver, StoredIdentityResolver};
use patron_sync::adapters::patreon::MockPatronApi;
use patron_sync::adapters::storage::{FileBlobStore, InMemoryBlobStore};
use patron_sync::adapters::FixedClock;
use patron_sync::application::patronage::{SnapshotTables, REWARD_USERS_BLOB};
use patron_sync::application::MembershipReconciler;
use patron_sync::domain::foundation::{PatronId, RewardId, Timestamp, UserId};
use patron_sync::domain::patronage::{EntryEnvelope, PatronageError};
use patron_sync::ports::{BlobStore, IdentityResolver};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

fn patron(id: &str) -> PatronId {
    PatronId::new(id).unwrap()
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn member(id: &str, attributes: Value, tiers: &[&str]) -> Value {
    let tiers: Vec<Value> = tiers.iter().map(|t| json!({"id": t, "type": "tier"})).collect();
    json!({
        "type": "member",
        "id": format!("m-{}", id),
        "attributes": attributes,
        "relationships": {
            "user": {"data": {"id": id, "type": "user"}},
            "currently_entitled_tiers": {"data": tiers}
        }
    })
}

fn reconciler(
    store: Arc<dyn BlobStore>,
    api: &MockPatronApi,
    identity: Arc<dyn IdentityResolver>,
    access: &RecordingAccessGrant,
    clock: &FixedClock,
) -> MembershipReconciler {
    MembershipReconciler::new(
        store,
        Arc::new(api.clone()),
        identity,
        Arc::new(access.clone()),
        Arc::new(clock.clone()),
    )
}

fn in_memory(now: &str) -> (Arc<InMemoryBlobStore>, MembershipReconciler) {
    let store = Arc::new(InMemoryBlobStore::new());
    let reconciler = reconciler(
        store.clone(),
        &MockPatronApi::new(),
        Arc::new(StaticIdentityResolver::new()),
        &RecordingAccessGrant::new(),
        &FixedClock::new(ts(now)),
    );
    (store, reconciler)
}

// =============================================================================
// End-to-end flows
// =============================================================================

#[tokio::test]
async fn webhook_lifecycle_against_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(dir.path()));
    let identity = Arc::new(StoredIdentityResolver::new(store.clone()));
    identity.link(patron("p1"), user("u1")).await.unwrap();

    let access = RecordingAccessGrant::new();
    let clock = FixedClock::new(ts("2024-01-15T00:00:00Z"));
    let reconciler = reconciler(
        store.clone(),
        &MockPatronApi::new(),
        identity,
        &access,
        &clock,
    );

    // Patron joins tier r1.
    let joined = EntryEnvelope::from_value(json!({
        "data": member("p1", json!({"pledge_amount_cents": 500}), &["r1"]),
        "included": [{"type": "user", "id": "p1", "attributes": {"email": "Fan@Example.com"}}]
    }))
    .unwrap();
    reconciler.create(&joined).await.unwrap();

    // Patron leaves after a paid charge on Jan 1.
    let left = EntryEnvelope::new(member(
        "p1",
        json!({
            "pledge_amount_cents": 500,
            "last_charge_status": "Paid",
            "last_charge_date": "2024-01-01T00:00:00Z",
            "pledge_cadence": 1
        }),
        &["r1"],
    ));
    reconciler.delete(&left).await.unwrap();

    let snapshot = SnapshotTables::new(store.clone()).load().await.unwrap();
    assert!(snapshot.pledges.is_empty());
    assert!(snapshot.users.is_empty());
    assert!(snapshot.reward_users[&RewardId::new("r1").unwrap()].is_empty());
    assert!(snapshot.all_patrons().unwrap().is_empty());

    let ledger = reconciler.ledger();
    assert_eq!(ledger.get(&user("u1")).await.unwrap(), Some(ts("2024-02-01T00:00:00Z")));
    assert!(!ledger.is_expired(&user("u1")).await.unwrap());

    clock.set(ts("2024-03-01T00:00:00Z"));
    assert!(ledger.is_expired(&user("u1")).await.unwrap());

    // Rejoining a tier hands entitlement back to the reward.
    reconciler.create(&joined).await.unwrap();
    assert_eq!(ledger.get(&user("u1")).await.unwrap(), None);
    assert_eq!(
        access.calls(),
        vec![
            AccessCall::Granted {
                user: user("u1"),
                until: ts("2024-02-01T00:00:00Z"),
            },
            AccessCall::Revoked { user: user("u1") },
        ]
    );
}

#[tokio::test]
async fn bulk_pull_replaces_webhook_state() {
    let store = Arc::new(InMemoryBlobStore::new());
    let api = MockPatronApi::new();
    let reconciler = reconciler(
        store.clone(),
        &api,
        Arc::new(StaticIdentityResolver::new()),
        &RecordingAccessGrant::new(),
        &FixedClock::new(ts("2024-01-15T00:00:00Z")),
    );

    reconciler
        .create(&EntryEnvelope::new(member(
            "stale",
            json!({"pledge_amount_cents": 100}),
            &["r9"],
        )))
        .await
        .unwrap();

    api.set_page(
        "/members?page=1",
        json!({
            "data": [
                member("p1", json!({"pledge_amount_cents": 500}), &["r1"]),
                member("p2", json!({
                    "pledge_amount_cents": 700,
                    "last_charge_status": "Declined",
                    "last_charge_date": "2024-01-10T00:00:00Z"
                }), &["r1", "r2"])
            ],
            "included": [
                {"type": "user", "id": "p1", "attributes": {"email": "ONE@example.com"}},
                {"type": "tier", "id": "r1", "attributes": {"title": "Bronze"}}
            ],
            "links": {"next": "/members?page=2"}
        }),
    );
    api.set_page(
        "/members?page=2",
        json!({
            "data": [member("p3", json!({"pledge_amount_cents": 900}), &[])],
            "links": {"next": null}
        }),
    );

    let outcome = reconciler.pull(["/members?page=1"]).await.unwrap();

    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.merge.patrons, 3);
    assert_eq!(outcome.merge.declines, 1);
    assert_eq!(outcome.merge.rewards, 2);

    let snapshot = SnapshotTables::new(store.clone()).load().await.unwrap();
    assert!(!snapshot.pledges.contains_key(&patron("stale")));
    assert_eq!(snapshot.users[&patron("p1")], "one@example.com");
    assert_eq!(snapshot.declines[&patron("p2")], "2024-01-10T00:00:00Z");
    assert_eq!(
        store.get(REWARD_USERS_BLOB).await.unwrap().as_deref(),
        Some(r#"{"0":["p1","p2","p3"],"r1":["p1","p2"],"r2":["p2"]}"#)
    );
}

#[tokio::test]
async fn pull_clears_expiration_of_patron_back_in_a_reward() {
    let store = Arc::new(InMemoryBlobStore::new());
    let api = MockPatronApi::new();
    let access = RecordingAccessGrant::new();
    let reconciler = reconciler(
        store.clone(),
        &api,
        Arc::new(StaticIdentityResolver::new().with_link(patron("p1"), user("u1"))),
        &access,
        &FixedClock::new(ts("2024-01-15T00:00:00Z")),
    );
    reconciler
        .ledger()
        .set(&user("u1"), ts("2024-02-01T00:00:00Z"))
        .await
        .unwrap();

    api.set_page(
        "A",
        json!({"data": [member("p1", json!({"pledge_amount_cents": 500}), &["r1"])]}),
    );

    let outcome = reconciler.pull(["A"]).await.unwrap();

    assert_eq!(outcome.merge.expirations_cleared, 1);
    assert_eq!(reconciler.ledger().get(&user("u1")).await.unwrap(), None);
    assert_eq!(
        access.calls().last(),
        Some(&AccessCall::Revoked { user: user("u1") })
    );
}

#[tokio::test]
async fn aborted_pull_leaves_snapshot_untouched() {
    let store = Arc::new(InMemoryBlobStore::new());
    let api = MockPatronApi::new();
    let reconciler = reconciler(
        store.clone(),
        &api,
        Arc::new(StaticIdentityResolver::new()),
        &RecordingAccessGrant::new(),
        &FixedClock::new(ts("2024-01-15T00:00:00Z")),
    );
    reconciler
        .create(&EntryEnvelope::new(member(
            "p1",
            json!({"pledge_amount_cents": 100}),
            &[],
        )))
        .await
        .unwrap();
    let before = store.dump().await;

    api.set_page("A", json!({"data": [], "links": {"next": "B"}}));
    api.set_page("B", json!({"errors": [{"status": "401", "title": "Unauthorized"}]}));

    let err = reconciler.pull(["A"]).await.unwrap_err();

    assert!(matches!(err, PatronageError::UpstreamFetch { .. }));
    assert_eq!(store.dump().await, before);
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone)]
struct MemberShape {
    patron: usize,
    amount: Option<i64>,
    tiers: Vec<usize>,
    declined: bool,
}

impl MemberShape {
    fn to_json(&self) -> Value {
        let mut attributes = json!({});
        if let Some(amount) = self.amount {
            attributes["pledge_amount_cents"] = json!(amount);
        }
        if self.declined {
            attributes["last_charge_status"] = json!("Declined");
            attributes["last_charge_date"] = json!("2024-01-10T00:00:00Z");
        }
        let tiers: Vec<String> = self.tiers.iter().map(|t| format!("r{}", t)).collect();
        let tiers: Vec<&str> = tiers.iter().map(String::as_str).collect();
        member(&format!("p{}", self.patron), attributes, &tiers)
    }
}

fn member_shape() -> impl Strategy<Value = MemberShape> {
    (
        0usize..5,
        proptest::option::of(0i64..10_000),
        proptest::collection::vec(0usize..3, 0..3),
        any::<bool>(),
    )
        .prop_map(|(patron, amount, tiers, declined)| MemberShape {
            patron,
            amount,
            tiers,
            declined,
        })
}

fn pages(shapes: &[Vec<MemberShape>]) -> Vec<Value> {
    shapes
        .iter()
        .map(|page| json!({"data": page.iter().map(MemberShape::to_json).collect::<Vec<_>>()}))
        .collect()
}

/// Serves `bodies` as a linked chain of pages starting at `page-0`.
fn chained_api(bodies: &[Value]) -> MockPatronApi {
    let api = MockPatronApi::new();
    for (i, body) in bodies.iter().enumerate() {
        let mut body = body.clone();
        if i + 1 < bodies.len() {
            body["links"] = json!({"next": format!("page-{}", i + 1)});
        }
        api.set_page(format!("page-{}", i), body);
    }
    api
}

async fn pull_into(
    store: Arc<InMemoryBlobStore>,
    bodies: &[Value],
) -> HashMap<String, String> {
    let reconciler = reconciler(
        store.clone(),
        &chained_api(bodies),
        Arc::new(StaticIdentityResolver::new()),
        &RecordingAccessGrant::new(),
        &FixedClock::new(ts("2024-01-15T00:00:00Z")),
    );
    reconciler.pull(["page-0"]).await.unwrap();
    store.dump().await
}

async fn seed(reconciler: &MembershipReconciler, entries: &[MemberShape]) {
    for entry in entries {
        reconciler
            .create(&EntryEnvelope::new(entry.to_json()))
            .await
            .unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn replace_is_idempotent_and_ignores_prior_state(
        listing in proptest::collection::vec(proptest::collection::vec(member_shape(), 0..4), 1..4),
        prior in proptest::collection::vec(member_shape(), 0..4),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let bodies = pages(&listing);

            let fresh = Arc::new(InMemoryBlobStore::new());
            let once = pull_into(fresh.clone(), &bodies).await;
            let twice = pull_into(fresh, &bodies).await;

            let (dirty, seeded) = in_memory("2024-01-15T00:00:00Z");
            seed(&seeded, &prior).await;
            let over_prior = pull_into(dirty, &bodies).await;

            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(&once, &over_prior);
            Ok(())
        })?;
    }

    #[test]
    fn update_matches_delete_then_create(
        prior in proptest::collection::vec(member_shape(), 0..6),
        changed in member_shape(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let envelope = EntryEnvelope::new(changed.to_json());

            let (updated_store, updated) = in_memory("2024-01-15T00:00:00Z");
            seed(&updated, &prior).await;
            updated.update(&envelope).await.unwrap();

            let (stepped_store, stepped) = in_memory("2024-01-15T00:00:00Z");
            seed(&stepped, &prior).await;
            stepped.delete(&envelope).await.unwrap();
            stepped.create(&envelope).await.unwrap();

            prop_assert_eq!(updated_store.dump().await, stepped_store.dump().await);

            let snapshot = SnapshotTables::new(updated_store).load().await.unwrap();
            let id = patron(&format!("p{}", changed.patron));
            prop_assert_eq!(snapshot.pledges.get(&id).copied(), changed.amount);
            prop_assert_eq!(snapshot.declines.contains_key(&id), changed.declined);
            for tier in &changed.tiers {
                let bucket = &snapshot.reward_users[&RewardId::new(format!("r{}", tier)).unwrap()];
                prop_assert!(bucket.contains(&id));
            }
            let all: Vec<_> = snapshot.all_patrons().unwrap().iter().cloned().collect();
            let keys: Vec<_> = snapshot.pledges.keys().cloned().collect();
            prop_assert_eq!(all, keys);
            Ok(())
        })?;
    }
}
