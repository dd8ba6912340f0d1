//! Turns one raw payload into a partial [`PatronSnapshot`].

use serde::Deserialize;

use crate::domain::foundation::PatronId;

use super::entry::Entry;
use super::payload::Payload;
use super::snapshot::PatronSnapshot;

/// Side-loaded record from the `included` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum IncludedRecord {
    User(IncludedUser),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct IncludedUser {
    id: String,
    #[serde(default)]
    attributes: IncludedUserAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct IncludedUserAttributes {
    #[serde(default)]
    email: Option<String>,
}

/// Extracts pledges, declines, reward buckets and emails from a payload.
///
/// Never fails: records that cannot be decoded, or that lack a patron, are
/// skipped with a warning and the rest of the payload is still extracted.
/// A payload with no entries yields an empty snapshot without consulting
/// `included`.
pub fn extract(payload: &Payload) -> PatronSnapshot {
    let mut snapshot = PatronSnapshot::new();
    if payload.is_empty() {
        return snapshot;
    }

    for raw in &payload.data {
        let entry = match Entry::decode(raw) {
            Ok(Entry::Other) => continue,
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable pledge entry");
                continue;
            }
        };

        let Some(patron_id) = entry.patron_id() else {
            tracing::warn!("Skipping pledge entry without a patron relationship");
            continue;
        };

        for reward_id in entry.reward_ids() {
            snapshot
                .reward_users
                .entry(reward_id)
                .or_default()
                .insert(patron_id.clone());
        }
        if let Some(amount) = entry.amount_cents() {
            snapshot.pledges.insert(patron_id.clone(), amount);
        }
        if let Some(declined_at) = entry.declined_at() {
            snapshot.declines.insert(patron_id, declined_at.to_string());
        }
    }

    for raw in &payload.included {
        match IncludedRecord::deserialize(raw) {
            Ok(IncludedRecord::User(user)) => {
                let email = user.attributes.email.unwrap_or_default();
                if email.is_empty() {
                    continue;
                }
                if let Ok(patron_id) = PatronId::new(user.id) {
                    snapshot.users.insert(patron_id, email.to_lowercase());
                }
            }
            Ok(IncludedRecord::Other) => {}
            Err(e) => tracing::debug!(error = %e, "Skipping undecodable included record"),
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RewardId;
    use serde_json::{json, Value};

    fn payload(value: Value) -> Payload {
        Payload::from_value(value).unwrap()
    }

    fn patron(id: &str) -> PatronId {
        PatronId::new(id).unwrap()
    }

    fn reward(id: &str) -> RewardId {
        RewardId::new(id).unwrap()
    }

    #[test]
    fn extracts_member_page_with_included_users() {
        let snapshot = extract(&payload(json!({
            "data": [
                {
                    "type": "member",
                    "attributes": {"pledge_amount_cents": 500, "last_charge_status": "Paid"},
                    "relationships": {
                        "user": {"data": {"id": "p1"}},
                        "currently_entitled_tiers": {"data": [{"id": "t1"}]}
                    }
                },
                {
                    "type": "member",
                    "attributes": {
                        "pledge_amount_cents": 1000,
                        "last_charge_status": "Declined",
                        "last_charge_date": "2024-01-03T00:00:00Z"
                    },
                    "relationships": {
                        "user": {"data": {"id": "p2"}},
                        "currently_entitled_tiers": {"data": [{"id": "t1"}, {"id": "t2"}]}
                    }
                }
            ],
            "included": [
                {"type": "user", "id": "p1", "attributes": {"email": "Alice@Example.COM"}},
                {"type": "user", "id": "p2", "attributes": {"email": ""}},
                {"type": "tier", "id": "t1", "attributes": {"title": "Gold"}}
            ]
        })));

        assert_eq!(snapshot.pledges.len(), 2);
        assert_eq!(snapshot.pledges[&patron("p2")], 1000);
        assert_eq!(snapshot.declines.len(), 1);
        assert_eq!(snapshot.declines[&patron("p2")], "2024-01-03T00:00:00Z");
        assert_eq!(snapshot.reward_users[&reward("t1")].len(), 2);
        assert_eq!(snapshot.reward_users[&reward("t2")].len(), 1);
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[&patron("p1")], "alice@example.com");
    }

    #[test]
    fn extracts_legacy_pledge_entry() {
        let snapshot = extract(&payload(json!({
            "data": {
                "type": "pledge",
                "attributes": {"amount_cents": 300, "declined_since": "2024-02-01T00:00:00Z"},
                "relationships": {
                    "patron": {"data": {"id": "p9"}},
                    "reward": {"data": {"id": "r5"}}
                }
            }
        })));

        assert_eq!(snapshot.pledges[&patron("p9")], 300);
        assert!(snapshot.declines.contains_key(&patron("p9")));
        assert!(snapshot.reward_users[&reward("r5")].contains(&patron("p9")));
    }

    #[test]
    fn empty_data_ignores_included_section() {
        let snapshot = extract(&payload(json!({
            "data": [],
            "included": [{"type": "user", "id": "p1", "attributes": {"email": "a@b.c"}}]
        })));

        assert!(snapshot.is_empty());
    }

    #[test]
    fn malformed_entries_do_not_poison_the_page() {
        let snapshot = extract(&payload(json!({
            "data": [
                {"type": "member", "attributes": {"pledge_amount_cents": 1}},
                {"type": "member", "relationships": {"user": {"data": null}}},
                {"type": "pledge",
                 "relationships": {"patron": {"data": {"id": "p1"}}},
                 "attributes": {"amount_cents": 50}},
                {"type": "goal", "id": "g1"},
                "not even an object"
            ]
        })));

        assert_eq!(snapshot.pledges.len(), 1);
        assert_eq!(snapshot.pledges[&patron("p1")], 50);
    }

    #[test]
    fn missing_amount_leaves_no_pledge_row() {
        let snapshot = extract(&payload(json!({
            "data": [{
                "type": "member",
                "attributes": {"pledge_amount_cents": null},
                "relationships": {
                    "user": {"data": {"id": "p1"}},
                    "currently_entitled_tiers": {"data": [{"id": "t1"}]}
                }
            }]
        })));

        assert!(snapshot.pledges.is_empty());
        assert!(snapshot.reward_users[&reward("t1")].contains(&patron("p1")));
    }
}
