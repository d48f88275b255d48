//! Read-side aggregation over the campaign ledgers.
//!
//! Pure queries -- nothing here mutates or persists.

use super::{CampaignStore, CategoryKey, UserId};
use crate::error::Result;

/// One row of a category's vote tally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TallyEntry {
    pub nominee: UserId,
    pub count: usize,
    /// Share of all votes in the category, 0.0 when no votes exist.
    pub percentage: f64,
}

/// One row of the nomination overview for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NominationCount {
    pub nominee: UserId,
    /// Distinct nominators currently pointing at this nominee.
    pub nominators: usize,
}

impl CampaignStore {
    /// Tally votes for one category, sorted descending by count.
    ///
    /// Ties break toward the nominee whose first vote arrived earliest.
    /// Nominees with no votes yet are appended with a zero count, ordered
    /// by id, so a fresh ballot's options all show up.
    pub fn results(&self, category: &str) -> Result<Vec<TallyEntry>> {
        let (key, _) = self.category(category)?;

        // Fold in cast order; position of first appearance is the tie-break.
        let mut tallied: Vec<(UserId, usize)> = Vec::new();
        let votes = self.votes.get(&key).map(Vec::as_slice).unwrap_or_default();
        for vote in votes {
            match tallied.iter_mut().find(|(nominee, _)| *nominee == vote.nominee) {
                Some((_, count)) => *count += 1,
                None => tallied.push((vote.nominee, 1)),
            }
        }

        for nominee in self.nominee_pool(&key) {
            if !tallied.iter().any(|(n, _)| *n == nominee) {
                tallied.push((nominee, 0));
            }
        }

        let total: usize = votes.len();
        // Stable sort keeps first-vote order within equal counts.
        tallied.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(tallied
            .into_iter()
            .map(|(nominee, count)| TallyEntry {
                nominee,
                count,
                percentage: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            })
            .collect())
    }

    /// Per category: nominees with their distinct-nominator counts,
    /// sorted descending by count (nominee id breaks ties).
    pub fn nomination_overview(&self) -> Vec<(CategoryKey, Vec<NominationCount>)> {
        self.categories
            .keys()
            .map(|key| {
                let mut counts: Vec<NominationCount> = Vec::new();
                if let Some(by_nominator) = self.nominations.get(key) {
                    for nomination in by_nominator.values() {
                        match counts.iter_mut().find(|c| c.nominee == nomination.nominee) {
                            Some(entry) => entry.nominators += 1,
                            None => counts.push(NominationCount {
                                nominee: nomination.nominee,
                                nominators: 1,
                            }),
                        }
                    }
                }
                counts.sort_by(|a, b| b.nominators.cmp(&a.nominators).then(a.nominee.cmp(&b.nominee)));
                (key.clone(), counts)
            })
            .collect()
    }
}
