//! Bounded-lifetime voting ballots.
//!
//! A ballot is presentation state, not ledger state: it enumerates the
//! distinct nominees at the moment it was opened and stays usable for a
//! fixed lifetime. Expiry never touches votes that were already cast.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{CategoryKey, UserId};

/// How long a ballot stays usable after it is opened, in seconds.
pub const DEFAULT_BALLOT_LIFETIME_SECS: i64 = 5 * 60;

/// A snapshot ballot for one category.
#[derive(Debug, Clone)]
pub struct VotingSession {
    id: Uuid,
    category: CategoryKey,
    nominees: Vec<UserId>,
    opened_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl VotingSession {
    pub(super) fn new(category: CategoryKey, nominees: Vec<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            nominees,
            opened_at: now,
            expires_at: now + Duration::seconds(DEFAULT_BALLOT_LIFETIME_SECS),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    /// Distinct nominees, ordered by id.
    pub fn nominees(&self) -> &[UserId] {
        &self.nominees
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn contains(&self, nominee: UserId) -> bool {
        self.nominees.contains(&nominee)
    }
}
