//! Campaign events and phase-transition announcements.
//!
//! Mutating store operations surface an [`CampaignEvent`] when the host
//! should announce something publicly; the deadline monitor produces
//! [`Announcement`]s. Rendering to text lives here so the scheduler tasks
//! and any host adapter agree on the wording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{CategoryKey, UserId};

/// Emitted by store mutations that have a public-announcement side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CampaignEvent {
    /// A nominator put (or moved) their nomination onto a nominee.
    /// The nominator is deliberately absent: nominations are anonymous.
    NomineeNominated {
        category: CategoryKey,
        nominee: UserId,
        at: DateTime<Utc>,
    },
}

/// One-shot phase-transition notifications, at most one of each per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// About one hour left to nominate.
    NominationWarning { deadline: DateTime<Utc> },
    /// The nomination deadline has passed.
    NominationsClosed,
    /// Nominations are closed and voting may begin.
    VotingOpened { until: DateTime<Utc> },
    /// About one hour left to vote.
    VotingWarning { deadline: DateTime<Utc> },
    /// The voting deadline has passed.
    VotingClosed,
}

impl Announcement {
    /// Text handed to the notification sink.
    pub fn render(&self) -> String {
        match self {
            Announcement::NominationWarning { deadline } => format!(
                "Nominations close in about an hour (at {}).",
                format_deadline(*deadline)
            ),
            Announcement::NominationsClosed => {
                "Nominations are now closed.".to_string()
            }
            Announcement::VotingOpened { until } => format!(
                "Voting is now open! Cast your votes before {}.",
                format_deadline(*until)
            ),
            Announcement::VotingWarning { deadline } => format!(
                "Voting closes in about an hour (at {}).",
                format_deadline(*deadline)
            ),
            Announcement::VotingClosed => {
                "Voting is now closed. Results are being tallied.".to_string()
            }
        }
    }

    /// Stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Announcement::NominationWarning { .. } => "nomination_warning",
            Announcement::NominationsClosed => "nominations_closed",
            Announcement::VotingOpened { .. } => "voting_opened",
            Announcement::VotingWarning { .. } => "voting_warning",
            Announcement::VotingClosed => "voting_closed",
        }
    }
}

fn format_deadline(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn announcement_render_includes_deadline() {
        let deadline = Utc.with_ymd_and_hms(2026, 1, 15, 20, 0, 0).unwrap();
        let text = Announcement::NominationWarning { deadline }.render();
        assert!(text.contains("2026-01-15 20:00 UTC"), "{text}");
    }

    #[test]
    fn announcement_kinds_are_distinct() {
        let now = Utc::now();
        let kinds = [
            Announcement::NominationWarning { deadline: now }.kind(),
            Announcement::NominationsClosed.kind(),
            Announcement::VotingOpened { until: now }.kind(),
            Announcement::VotingWarning { deadline: now }.kind(),
            Announcement::VotingClosed.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
