//! The denormalized patron snapshot and its merge rules.
//!
//! A snapshot is four tables keyed by patron (or by reward, for the index).
//! The same shape serves as the partial result of extracting one payload and
//! as the full persisted state, so merging is always "absorb a partial
//! snapshot into a running one".

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{PatronId, RewardId};

/// Patron → pledge amount in minor currency units.
pub type PledgeTable = BTreeMap<PatronId, i64>;

/// Patron → timestamp of the currently failing charge.
pub type DeclineTable = BTreeMap<PatronId, String>;

/// Reward → patrons entitled to it. Bucket `"0"` holds every pledging patron.
pub type RewardUserIndex = BTreeMap<RewardId, BTreeSet<PatronId>>;

/// Patron → lowercased email.
pub type UserEmailTable = BTreeMap<PatronId, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatronSnapshot {
    pub pledges: PledgeTable,
    pub declines: DeclineTable,
    pub reward_users: RewardUserIndex,
    pub users: UserEmailTable,
}

impl PatronSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every table is empty.
    pub fn is_empty(&self) -> bool {
        self.pledges.is_empty()
            && self.declines.is_empty()
            && self.reward_users.is_empty()
            && self.users.is_empty()
    }

    /// Folds a partial snapshot into this one.
    ///
    /// Pledges, declines and emails are overwritten per patron; reward
    /// buckets are unioned.
    pub fn absorb(&mut self, partial: PatronSnapshot) {
        self.pledges.extend(partial.pledges);
        self.declines.extend(partial.declines);
        self.users.extend(partial.users);

        for (reward_id, patrons) in partial.reward_users {
            self.reward_users.entry(reward_id).or_default().extend(patrons);
        }
    }

    /// Every patron entitled to at least one real reward (bucket `"0"` excluded).
    pub fn entitled_patrons(&self) -> BTreeSet<PatronId> {
        self.reward_users
            .iter()
            .filter(|(reward_id, _)| !reward_id.is_all_patrons())
            .flat_map(|(_, patrons)| patrons.iter().cloned())
            .collect()
    }

    /// Rebuilds bucket `"0"` from the pledge table's key set.
    pub fn refresh_all_patrons_bucket(&mut self) {
        self.reward_users.insert(
            RewardId::all_patrons(),
            self.pledges.keys().cloned().collect(),
        );
    }

    /// Removes a patron from the named reward buckets.
    ///
    /// Buckets that become empty are kept.
    pub fn leave_rewards(&mut self, patron_id: &PatronId, rewards: &[RewardId]) {
        for reward_id in rewards {
            if let Some(patrons) = self.reward_users.get_mut(reward_id) {
                patrons.remove(patron_id);
            }
        }
    }

    /// Strips a patron from the pledge, decline and email tables.
    pub fn forget_patron(&mut self, patron_id: &PatronId) {
        self.pledges.remove(patron_id);
        self.declines.remove(patron_id);
        self.users.remove(patron_id);
    }

    /// Patrons in bucket `"0"`, if it exists.
    pub fn all_patrons(&self) -> Option<&BTreeSet<PatronId>> {
        self.reward_users.get(&RewardId::all_patrons())
    }
}
