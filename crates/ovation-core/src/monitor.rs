//! Deadline phase monitor.
//!
//! A coarse-interval task that compares the two campaign deadlines to the
//! clock and fires each phase-transition announcement at most once per
//! epoch. The decision logic is the synchronous [`tick`]; tests drive it
//! directly with a manual clock, and [`spawn`] wraps it in a tokio loop
//! that owns the interval and the stop signal.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use crate::campaign::CampaignStore;
use crate::clock::Clock;
use crate::events::Announcement;
use crate::notify::NotificationSink;
use crate::tasks::TaskHandle;

/// Default poll period. Must stay at or below the narrowest trigger band.
pub const MONITOR_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

/// Evaluate both deadlines once and flip the one-shot flags.
///
/// Returns the announcements that fired this tick, in emit order. The
/// "nominations closed" transition re-arms `voting_opened`, so the
/// voting-open announcement follows in the same tick when both deadlines
/// are configured.
pub fn tick(store: &mut CampaignStore, now: DateTime<Utc>) -> Vec<Announcement> {
    let mut fired = Vec::new();
    let deadlines = store.deadlines();
    let flags = store.announcements_mut();

    if let Some(deadline) = deadlines.nomination_deadline {
        if !flags.nomination_warned_1h && within_warning_band(deadline, now) {
            flags.nomination_warned_1h = true;
            fired.push(Announcement::NominationWarning { deadline });
        }
        if !flags.nomination_closed && now > deadline {
            flags.nomination_closed = true;
            flags.voting_opened = false;
            fired.push(Announcement::NominationsClosed);
        }
    }

    if let Some(until) = deadlines.voting_deadline {
        if deadlines.nomination_deadline.is_some()
            && flags.nomination_closed
            && !flags.voting_closed
            && !flags.voting_opened
        {
            flags.voting_opened = true;
            fired.push(Announcement::VotingOpened { until });
        }
        if !flags.voting_warned_1h && within_warning_band(until, now) {
            flags.voting_warned_1h = true;
            fired.push(Announcement::VotingWarning { deadline: until });
        }
        if !flags.voting_closed && now > until {
            flags.voting_closed = true;
            fired.push(Announcement::VotingClosed);
        }
    }

    fired
}

fn within_warning_band(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let remaining = deadline - now;
    remaining > Duration::zero() && remaining <= Duration::hours(1)
}

/// Run the monitor as a repeating task. Announcement delivery failures
/// are logged and never stop the loop.
pub fn spawn(
    store: Arc<Mutex<CampaignStore>>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    period: std::time::Duration,
) -> TaskHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let fired = {
                        let mut guard = match store.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        tick(&mut guard, clock.now())
                    };
                    for announcement in fired {
                        tracing::info!(kind = announcement.kind(), "phase announcement");
                        if let Err(e) = sink.send(&announcement.render()) {
                            tracing::warn!(
                                kind = announcement.kind(),
                                error = %e,
                                "failed to deliver announcement"
                            );
                        }
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }
    });
    TaskHandle::new(stop_tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingSink;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn open_store() -> CampaignStore {
        CampaignStore::open(Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn warning_and_close_each_fire_exactly_once() {
        let mut store = open_store();
        let deadline = t0() + Duration::seconds(3600);
        store.set_nomination_deadline(Some(deadline), t0()).unwrap();

        // Tick inside the warning band, then again past the deadline.
        let first = tick(&mut store, t0() + Duration::seconds(3550));
        assert_eq!(first, vec![Announcement::NominationWarning { deadline }]);

        let second = tick(&mut store, deadline + Duration::seconds(10));
        assert_eq!(second, vec![Announcement::NominationsClosed]);

        // Further polls are quiet.
        assert!(tick(&mut store, deadline + Duration::seconds(70)).is_empty());
    }

    #[test]
    fn warning_does_not_fire_outside_the_band() {
        let mut store = open_store();
        let deadline = t0() + Duration::hours(3);
        store.set_nomination_deadline(Some(deadline), t0()).unwrap();
        assert!(tick(&mut store, t0()).is_empty());
        assert!(tick(&mut store, t0() + Duration::hours(1)).is_empty());
    }

    #[test]
    fn repeated_polls_in_band_fire_once() {
        let mut store = open_store();
        let deadline = t0() + Duration::minutes(90);
        store.set_voting_deadline(Some(deadline), t0()).unwrap();

        let mut total = 0;
        for minutes in (35..100).step_by(5) {
            total += tick(&mut store, t0() + Duration::minutes(minutes)).len();
        }
        // One warning plus one close, no matter the poll frequency.
        assert_eq!(total, 2);
    }

    #[test]
    fn voting_opens_after_nominations_close() {
        let mut store = open_store();
        let nomination_deadline = t0() + Duration::hours(2);
        let voting_deadline = t0() + Duration::hours(8);
        store
            .set_nomination_deadline(Some(nomination_deadline), t0())
            .unwrap();
        store
            .set_voting_deadline(Some(voting_deadline), t0())
            .unwrap();

        let fired = tick(&mut store, nomination_deadline + Duration::seconds(30));
        assert_eq!(
            fired,
            vec![
                Announcement::NominationsClosed,
                Announcement::VotingOpened { until: voting_deadline },
            ]
        );
        assert!(store.announcements().voting_opened);
    }

    #[test]
    fn voting_open_needs_both_deadlines() {
        let mut store = open_store();
        let voting_deadline = t0() + Duration::hours(8);
        store
            .set_voting_deadline(Some(voting_deadline), t0())
            .unwrap();

        // No nomination deadline configured: nothing to open voting after.
        assert!(tick(&mut store, t0() + Duration::hours(1)).is_empty());
    }

    #[test]
    fn deadline_change_starts_a_new_epoch() {
        let mut store = open_store();
        let deadline = t0() + Duration::minutes(30);
        store.set_nomination_deadline(Some(deadline), t0()).unwrap();
        assert_eq!(tick(&mut store, t0() + Duration::minutes(1)).len(), 1);

        // Admin pushes the deadline out; the warning may fire again.
        let later = t0() + Duration::minutes(90);
        store
            .set_nomination_deadline(Some(later), t0() + Duration::minutes(2))
            .unwrap();
        let fired = tick(&mut store, t0() + Duration::minutes(45));
        assert_eq!(fired, vec![Announcement::NominationWarning { deadline: later }]);
    }

    #[test]
    fn full_campaign_sequence_fires_all_five() {
        let mut store = open_store();
        let nomination_deadline = t0() + Duration::hours(2);
        let voting_deadline = t0() + Duration::hours(8);
        store
            .set_nomination_deadline(Some(nomination_deadline), t0())
            .unwrap();
        store
            .set_voting_deadline(Some(voting_deadline), t0())
            .unwrap();

        let mut kinds = Vec::new();
        let mut now = t0();
        while now < voting_deadline + Duration::minutes(2) {
            for a in tick(&mut store, now) {
                kinds.push(a.kind());
            }
            now = now + Duration::minutes(1);
        }
        assert_eq!(
            kinds,
            vec![
                "nomination_warning",
                "nominations_closed",
                "voting_opened",
                "voting_warning",
                "voting_closed",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_delivers_and_stops() {
        let store = Arc::new(Mutex::new(open_store()));
        let clock = Arc::new(ManualClock::starting_at(t0()));
        let sink = Arc::new(RecordingSink::new());

        {
            let mut guard = store.lock().unwrap();
            guard
                .set_nomination_deadline(Some(t0() + Duration::minutes(30)), t0())
                .unwrap();
        }

        let handle = spawn(
            store.clone(),
            sink.clone(),
            clock.clone(),
            std::time::Duration::from_secs(60),
        );
        // Move into the warning band and let the loop tick.
        clock.advance(Duration::minutes(1));
        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
        handle.stop().await;

        let sent = sink.sent_contents();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Nominations close"), "{}", sent[0]);
    }
}
