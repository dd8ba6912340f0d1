//! Typed pledge/membership records, dispatched on the `type` discriminator.
//!
//! The billing API has two generations of subscription record:
//!
//! - `pledge` (legacy) - patron under `relationships.patron`, one optional reward
//! - `member` (current) - patron under `relationships.user`, any number of
//!   entitled tiers, and charge status attributes
//!
//! Anything else that shows up in `data` decodes to [`Entry::Other`].

use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::{PatronId, RewardId, Timestamp, ValidationError};

/// Billing cadence assumed when a paid member carries none.
pub const DEFAULT_PLEDGE_CADENCE_MONTHS: u32 = 1;

/// One subscription record from the `data` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Pledge(PledgeRecord),
    Member(MemberRecord),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PledgeRecord {
    #[serde(default)]
    pub attributes: PledgeAttributes,
    pub relationships: PledgeRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PledgeAttributes {
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub declined_since: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PledgeRelationships {
    pub patron: Relationship,
    #[serde(default)]
    pub reward: Option<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub attributes: MemberAttributes,
    pub relationships: MemberRelationships,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemberAttributes {
    #[serde(default)]
    pub pledge_amount_cents: Option<i64>,
    #[serde(default)]
    pub last_charge_status: Option<ChargeStatus>,
    #[serde(default)]
    pub last_charge_date: Option<String>,
    #[serde(default)]
    pub pledge_cadence: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberRelationships {
    pub user: Relationship,
    #[serde(default)]
    pub currently_entitled_tiers: Option<RelationshipList>,
}

/// To-one relationship; `data` is null when unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

/// To-many relationship; `data` may be null or absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelationshipList {
    #[serde(default)]
    pub data: Option<Vec<ResourceRef>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

/// Outcome of the member's most recent charge attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ChargeStatus {
    Paid,
    Declined,
    Deleted,
    Pending,
    Refunded,
    Fraud,
    Other(String),
}

impl From<String> for ChargeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Paid" => ChargeStatus::Paid,
            "Declined" => ChargeStatus::Declined,
            "Deleted" => ChargeStatus::Deleted,
            "Pending" => ChargeStatus::Pending,
            "Refunded" => ChargeStatus::Refunded,
            "Fraud" => ChargeStatus::Fraud,
            _ => ChargeStatus::Other(value),
        }
    }
}

impl Relationship {
    fn id(&self) -> Option<&str> {
        self.data.as_ref().map(|r| r.id.as_str())
    }
}

impl Entry {
    /// Decodes one raw record from a `data` section.
    pub fn decode(value: &Value) -> Result<Self, serde_json::Error> {
        Entry::deserialize(value)
    }

    /// The patron this record describes. `None` for unknown record types
    /// and for records whose patron relationship is null or blank.
    pub fn patron_id(&self) -> Option<PatronId> {
        let raw = match self {
            Entry::Pledge(pledge) => pledge.relationships.patron.id(),
            Entry::Member(member) => member.relationships.user.id(),
            Entry::Other => None,
        }?;
        PatronId::new(raw).ok()
    }

    /// Rewards/tiers this record entitles its patron to.
    pub fn reward_ids(&self) -> Vec<RewardId> {
        match self {
            Entry::Pledge(pledge) => pledge
                .relationships
                .reward
                .as_ref()
                .and_then(Relationship::id)
                .and_then(|id| RewardId::new(id).ok())
                .into_iter()
                .collect(),
            Entry::Member(member) => member
                .relationships
                .currently_entitled_tiers
                .as_ref()
                .and_then(|tiers| tiers.data.as_ref())
                .map(|tiers| {
                    tiers
                        .iter()
                        .filter_map(|tier| RewardId::new(tier.id.as_str()).ok())
                        .collect()
                })
                .unwrap_or_default(),
            Entry::Other => Vec::new(),
        }
    }

    /// Pledge amount in minor currency units, when upstream reports one.
    pub fn amount_cents(&self) -> Option<i64> {
        match self {
            Entry::Pledge(pledge) => pledge.attributes.amount_cents,
            Entry::Member(member) => member.attributes.pledge_amount_cents,
            Entry::Other => None,
        }
    }

    /// Timestamp of the failing charge, if the latest charge failed.
    pub fn declined_at(&self) -> Option<&str> {
        let declined = match self {
            Entry::Pledge(pledge) => pledge.attributes.declined_since.as_deref(),
            Entry::Member(member) => match member.attributes.last_charge_status {
                Some(ChargeStatus::Declined) => member.attributes.last_charge_date.as_deref(),
                _ => None,
            },
            Entry::Other => None,
        };
        declined.filter(|ts| !ts.is_empty())
    }

    /// End of the window a paid charge covers: the charge date plus the
    /// pledge cadence in calendar months, to whole-second precision.
    ///
    /// `Ok(None)` when the last charge was not paid or carries no date.
    pub fn coverage_end(&self) -> Result<Option<Timestamp>, ValidationError> {
        let Entry::Member(member) = self else {
            return Ok(None);
        };
        let attrs = &member.attributes;
        let (Some(ChargeStatus::Paid), Some(charged_at)) =
            (&attrs.last_charge_status, attrs.last_charge_date.as_deref())
        else {
            return Ok(None);
        };

        let charged_at = Timestamp::parse(charged_at)?;
        let cadence = attrs.pledge_cadence.unwrap_or(DEFAULT_PLEDGE_CADENCE_MONTHS);
        charged_at
            .add_months(cadence)
            .map(|end| Some(end.trunc_subsecs()))
            .ok_or_else(|| ValidationError::invalid_format("pledge_cadence", "out of range"))
    }
}
