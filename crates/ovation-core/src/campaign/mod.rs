//! Campaign store: categories, nominations, votes, deadlines.
//!
//! All campaign mutation funnels through [`CampaignStore`]. The store owns
//! the in-memory ledgers and persists each one as an independent JSON
//! document immediately after every mutation. It is built once at startup
//! and injected into the scheduler tasks and command handlers -- there are
//! no ambient globals.
//!
//! Time never comes from the system inside this module; every deadline
//! check takes `now` from the caller so tests control the clock.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, PersistenceError, Result};
use crate::events::CampaignEvent;
use crate::storage::{Ledger, LedgerStore};

mod ballot;
mod results;

pub use ballot::{VotingSession, DEFAULT_BALLOT_LIFETIME_SECS};
pub use results::{NominationCount, TallyEntry};

/// Normalized category key: trimmed, lowercased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(String);

impl CategoryKey {
    pub fn new(name: &str) -> Result<Self> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CampaignError::InvalidCategoryName(
                "category name must not be empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform user id (snowflake-style).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named award class.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub allow_self_nomination: bool,
}

/// One nominator's current choice of nominee within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub nominee: UserId,
    pub nominator: UserId,
}

/// One voter's immutable choice, kept in cast order per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRecord {
    pub voter: UserId,
    pub nominee: UserId,
}

/// The singleton deadline pair. `None` means the phase is not gated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadlines {
    #[serde(default)]
    pub nomination_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub voting_deadline: Option<DateTime<Utc>>,
}

/// One-shot flags for the five phase announcements. Each may go
/// false -> true once per epoch; any deadline change starts a new epoch
/// by resetting all five.
///
/// Process-memory only: a restart near a deadline can repeat or miss a
/// notification (documented limitation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnouncementState {
    pub nomination_warned_1h: bool,
    pub nomination_closed: bool,
    pub voting_opened: bool,
    pub voting_warned_1h: bool,
    pub voting_closed: bool,
}

impl AnnouncementState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

type NominationLedger = BTreeMap<CategoryKey, BTreeMap<UserId, Nomination>>;
type VotesFile = BTreeMap<CategoryKey, BTreeMap<UserId, UserId>>;

/// Owns all campaign state. See the module docs for lifecycle.
pub struct CampaignStore {
    categories: BTreeMap<CategoryKey, Category>,
    nominations: NominationLedger,
    /// Per-category votes in cast order; the order feeds the results
    /// tie-break.
    votes: BTreeMap<CategoryKey, Vec<VoteRecord>>,
    deadlines: Deadlines,
    announcements: AnnouncementState,
    store: Arc<dyn LedgerStore>,
}

impl CampaignStore {
    /// Load all campaign ledgers from the given store.
    ///
    /// Announcement flags always start cleared; they are not persisted.
    /// Vote cast order is rebuilt sorted by voter id, since the on-disk
    /// shape is a map.
    pub fn open(store: Arc<dyn LedgerStore>) -> Result<Self> {
        let categories = load_json(&*store, Ledger::Categories)?.unwrap_or_default();
        let nominations: NominationLedger =
            load_json(&*store, Ledger::Nominations)?.unwrap_or_default();
        let votes_file: VotesFile = load_json(&*store, Ledger::Votes)?.unwrap_or_default();
        let votes = votes_file
            .into_iter()
            .map(|(key, by_voter)| {
                let records = by_voter
                    .into_iter()
                    .map(|(voter, nominee)| VoteRecord { voter, nominee })
                    .collect();
                (key, records)
            })
            .collect();
        let deadlines = load_json(&*store, Ledger::CommunityConfig)?.unwrap_or_default();

        Ok(Self {
            categories,
            nominations,
            votes,
            deadlines,
            announcements: AnnouncementState::default(),
            store,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn categories(&self) -> impl Iterator<Item = (&CategoryKey, &Category)> {
        self.categories.iter()
    }

    pub fn category(&self, name: &str) -> Result<(CategoryKey, Category)> {
        let key = CategoryKey::new(name)?;
        let category = self
            .categories
            .get(&key)
            .copied()
            .ok_or_else(|| CampaignError::CategoryNotFound(key.to_string()))?;
        Ok((key, category))
    }

    pub fn deadlines(&self) -> Deadlines {
        self.deadlines
    }

    pub fn announcements(&self) -> AnnouncementState {
        self.announcements
    }

    pub(crate) fn announcements_mut(&mut self) -> &mut AnnouncementState {
        &mut self.announcements
    }

    /// Distinct nominees currently nominated in a category.
    fn nominee_pool(&self, key: &CategoryKey) -> BTreeSet<UserId> {
        self.nominations
            .get(key)
            .map(|by_nominator| by_nominator.values().map(|n| n.nominee).collect())
            .unwrap_or_default()
    }

    // ── Category registry ────────────────────────────────────────────

    pub fn create_category(&mut self, name: &str, allow_self_nomination: bool) -> Result<CategoryKey> {
        let key = CategoryKey::new(name)?;
        if self.categories.contains_key(&key) {
            return Err(CampaignError::CategoryExists(key.to_string()));
        }
        self.categories.insert(key.clone(), Category { allow_self_nomination });
        self.persist_categories()?;
        Ok(key)
    }

    pub fn set_self_nomination(&mut self, name: &str, allow: bool) -> Result<()> {
        let key = CategoryKey::new(name)?;
        let category = self
            .categories
            .get_mut(&key)
            .ok_or_else(|| CampaignError::CategoryNotFound(key.to_string()))?;
        category.allow_self_nomination = allow;
        self.persist_categories()
    }

    /// Remove a category and every nomination and vote keyed by it.
    /// All three ledgers are persisted before this returns.
    pub fn remove_category(&mut self, name: &str) -> Result<()> {
        let key = CategoryKey::new(name)?;
        if self.categories.remove(&key).is_none() {
            return Err(CampaignError::CategoryNotFound(key.to_string()));
        }
        self.nominations.remove(&key);
        self.votes.remove(&key);
        self.persist_categories()?;
        self.persist_nominations()?;
        self.persist_votes()
    }

    // ── Nomination ledger ────────────────────────────────────────────

    /// Insert or move a nomination. Re-nominating the same nominee is a
    /// no-op confirmation and returns `Ok(None)`; a real change returns
    /// the event the host should announce.
    pub fn nominate(
        &mut self,
        nominator: UserId,
        nominee: UserId,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CampaignEvent>> {
        let (key, cat) = self.category(category)?;
        if let Some(deadline) = self.deadlines.nomination_deadline {
            if now > deadline {
                return Err(CampaignError::PhaseClosed("nomination"));
            }
        }
        if nominee == nominator && !cat.allow_self_nomination {
            return Err(CampaignError::SelfNominationDisallowed(key.to_string()));
        }

        let by_nominator = self.nominations.entry(key.clone()).or_default();
        if by_nominator.get(&nominator).map(|n| n.nominee) == Some(nominee) {
            return Ok(None);
        }
        by_nominator.insert(nominator, Nomination { nominee, nominator });
        self.persist_nominations()?;

        Ok(Some(CampaignEvent::NomineeNominated {
            category: key,
            nominee,
            at: now,
        }))
    }

    // ── Vote ledger ──────────────────────────────────────────────────

    /// Open a bounded-lifetime ballot over the category's current
    /// distinct nominees.
    pub fn start_voting_session(&self, category: &str, now: DateTime<Utc>) -> Result<VotingSession> {
        let (key, _) = self.category(category)?;
        let nominees: Vec<UserId> = self.nominee_pool(&key).into_iter().collect();
        Ok(VotingSession::new(key, nominees, now))
    }

    /// Cast an immutable vote. A second cast for the same
    /// (category, voter) pair fails `DuplicateVote` and leaves the first
    /// vote untouched. Voting is deadline-gated symmetrically with
    /// nominations.
    pub fn cast_vote(
        &mut self,
        voter: UserId,
        nominee: UserId,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (key, _) = self.category(category)?;
        if let Some(deadline) = self.deadlines.voting_deadline {
            if now > deadline {
                return Err(CampaignError::PhaseClosed("voting"));
            }
        }
        if !self.nominee_pool(&key).contains(&nominee) {
            return Err(CampaignError::UnknownNominee {
                category: key.to_string(),
                nominee: nominee.0,
            });
        }
        let ledger = self.votes.entry(key.clone()).or_default();
        if ledger.iter().any(|v| v.voter == voter) {
            return Err(CampaignError::DuplicateVote(key.to_string()));
        }
        ledger.push(VoteRecord { voter, nominee });
        self.persist_votes()
    }

    // ── Deadlines ────────────────────────────────────────────────────

    /// Set or clear (`None`) the nomination deadline. Either way the
    /// announcement flags reset, starting a new epoch.
    pub fn set_nomination_deadline(
        &mut self,
        deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        validate_deadline(deadline, now)?;
        self.deadlines.nomination_deadline = deadline;
        self.announcements.reset();
        self.persist_config()
    }

    /// Set or clear (`None`) the voting deadline. Resets the epoch.
    pub fn set_voting_deadline(
        &mut self,
        deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        validate_deadline(deadline, now)?;
        self.deadlines.voting_deadline = deadline;
        self.announcements.reset();
        self.persist_config()
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn persist_categories(&self) -> Result<()> {
        save_json(&*self.store, Ledger::Categories, &self.categories)
    }

    fn persist_nominations(&self) -> Result<()> {
        save_json(&*self.store, Ledger::Nominations, &self.nominations)
    }

    fn persist_votes(&self) -> Result<()> {
        let file: VotesFile = self
            .votes
            .iter()
            .map(|(key, records)| {
                let by_voter = records.iter().map(|v| (v.voter, v.nominee)).collect();
                (key.clone(), by_voter)
            })
            .collect();
        save_json(&*self.store, Ledger::Votes, &file)
    }

    fn persist_config(&self) -> Result<()> {
        save_json(&*self.store, Ledger::CommunityConfig, &self.deadlines)
    }
}

fn validate_deadline(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
    if let Some(at) = deadline {
        if at <= now {
            return Err(CampaignError::InvalidDeadline(format!(
                "{at} is not in the future"
            )));
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(
    store: &dyn LedgerStore,
    ledger: Ledger,
) -> Result<Option<T>, PersistenceError> {
    match store.load(ledger)? {
        Some(contents) => {
            let value = serde_json::from_str(&contents).map_err(PersistenceError::Decode)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn save_json<T: Serialize>(
    store: &dyn LedgerStore,
    ledger: Ledger,
    value: &T,
) -> Result<(), CampaignError> {
    let contents = serde_json::to_string_pretty(value).map_err(PersistenceError::Encode)?;
    store.save(ledger, &contents)?;
    tracing::debug!(?ledger, "ledger persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn open_store() -> (CampaignStore, Arc<MemoryStore>) {
        let backing = Arc::new(MemoryStore::new());
        let store = CampaignStore::open(backing.clone()).unwrap();
        (store, backing)
    }

    #[test]
    fn category_key_normalizes() {
        assert_eq!(CategoryKey::new("  MeMeR ").unwrap().as_str(), "memer");
        assert!(matches!(
            CategoryKey::new("   "),
            Err(CampaignError::InvalidCategoryName(_))
        ));
    }

    #[test]
    fn create_category_rejects_duplicates() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        assert!(matches!(
            store.create_category("MEMER", true),
            Err(CampaignError::CategoryExists(_))
        ));
    }

    #[test]
    fn renominate_overwrites_in_place() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();

        let event = store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        assert!(event.is_some());
        store.nominate(UserId(1), UserId(3), "memer", t0()).unwrap();

        let nominees = store.nominee_pool(&CategoryKey::new("memer").unwrap());
        assert_eq!(nominees.into_iter().collect::<Vec<_>>(), vec![UserId(3)]);
    }

    #[test]
    fn renominate_same_nominee_is_noop_confirmation() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        let event = store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn self_nomination_follows_category_policy() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        assert!(matches!(
            store.nominate(UserId(2), UserId(2), "memer", t0()),
            Err(CampaignError::SelfNominationDisallowed(_))
        ));

        store.set_self_nomination("memer", true).unwrap();
        assert!(store.nominate(UserId(2), UserId(2), "memer", t0()).is_ok());
    }

    #[test]
    fn nominate_unknown_category_fails() {
        let (mut store, _) = open_store();
        assert!(matches!(
            store.nominate(UserId(1), UserId(2), "ghost", t0()),
            Err(CampaignError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn nomination_deadline_gates_writes() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        let deadline = t0() + Duration::hours(1);
        store.set_nomination_deadline(Some(deadline), t0()).unwrap();

        // Still open exactly at the deadline.
        assert!(store.nominate(UserId(1), UserId(2), "memer", deadline).is_ok());
        assert!(matches!(
            store.nominate(UserId(1), UserId(3), "memer", deadline + Duration::seconds(1)),
            Err(CampaignError::PhaseClosed("nomination"))
        ));
    }

    #[test]
    fn second_vote_is_rejected_and_first_kept() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        store.nominate(UserId(5), UserId(3), "memer", t0()).unwrap();

        store.cast_vote(UserId(1), UserId(2), "memer", t0()).unwrap();
        assert!(matches!(
            store.cast_vote(UserId(1), UserId(3), "memer", t0()),
            Err(CampaignError::DuplicateVote(_))
        ));

        let key = CategoryKey::new("memer").unwrap();
        assert_eq!(
            store.votes.get(&key).unwrap().as_slice(),
            &[VoteRecord { voter: UserId(1), nominee: UserId(2) }]
        );
    }

    #[test]
    fn vote_requires_known_nominee() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        assert!(matches!(
            store.cast_vote(UserId(1), UserId(99), "memer", t0()),
            Err(CampaignError::UnknownNominee { .. })
        ));
    }

    #[test]
    fn vote_is_gated_by_voting_deadline() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        let deadline = t0() + Duration::hours(1);
        store.set_voting_deadline(Some(deadline), t0()).unwrap();

        assert!(matches!(
            store.cast_vote(UserId(1), UserId(2), "memer", deadline + Duration::seconds(1)),
            Err(CampaignError::PhaseClosed("voting"))
        ));
    }

    #[test]
    fn remove_category_cascades() {
        let (mut store, _) = open_store();
        store.create_category("memer", false).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        store.cast_vote(UserId(3), UserId(2), "memer", t0()).unwrap();

        store.remove_category("memer").unwrap();

        assert!(matches!(
            store.results("memer"),
            Err(CampaignError::CategoryNotFound(_))
        ));
        assert!(matches!(
            store.nominate(UserId(1), UserId(2), "memer", t0()),
            Err(CampaignError::CategoryNotFound(_))
        ));
        assert!(matches!(
            store.remove_category("memer"),
            Err(CampaignError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn deadline_change_resets_announcement_flags() {
        let (mut store, _) = open_store();
        store.announcements_mut().nomination_warned_1h = true;
        store.announcements_mut().voting_closed = true;

        store
            .set_nomination_deadline(Some(t0() + Duration::hours(2)), t0())
            .unwrap();
        assert_eq!(store.announcements(), AnnouncementState::default());

        store.announcements_mut().voting_opened = true;
        // Clearing also starts a new epoch.
        store.set_voting_deadline(None, t0()).unwrap();
        assert_eq!(store.announcements(), AnnouncementState::default());
    }

    #[test]
    fn past_deadline_is_rejected() {
        let (mut store, _) = open_store();
        assert!(matches!(
            store.set_nomination_deadline(Some(t0() - Duration::seconds(1)), t0()),
            Err(CampaignError::InvalidDeadline(_))
        ));
        assert!(matches!(
            store.set_voting_deadline(Some(t0()), t0()),
            Err(CampaignError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn state_survives_reopen() {
        let (mut store, backing) = open_store();
        store.create_category("memer", true).unwrap();
        store.nominate(UserId(1), UserId(2), "memer", t0()).unwrap();
        store.cast_vote(UserId(9), UserId(2), "memer", t0()).unwrap();
        store
            .set_voting_deadline(Some(t0() + Duration::days(1)), t0())
            .unwrap();

        let reopened = CampaignStore::open(backing).unwrap();
        let (_, category) = reopened.category("memer").unwrap();
        assert!(category.allow_self_nomination);
        assert_eq!(
            reopened.nominee_pool(&CategoryKey::new("memer").unwrap()).len(),
            1
        );
        assert_eq!(reopened.deadlines().voting_deadline, Some(t0() + Duration::days(1)));
        // Announcement flags are process-memory only.
        assert_eq!(reopened.announcements(), AnnouncementState::default());

        let key = CategoryKey::new("memer").unwrap();
        assert_eq!(reopened.votes.get(&key).unwrap().len(), 1);
    }

    #[test]
    fn persistence_failure_is_reported() {
        let (mut store, backing) = open_store();
        store.create_category("memer", false).unwrap();
        backing.set_reject_writes(true);
        assert!(matches!(
            store.nominate(UserId(1), UserId(2), "memer", t0()),
            Err(CampaignError::Persistence(_))
        ));
    }
}
