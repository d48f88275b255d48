//! Live countdown broadcaster.
//!
//! A fine-interval task that re-renders every registered live display.
//! [`tick`] computes the pending edits synchronously; [`spawn`] wraps it
//! in a tokio loop that performs the edits and prunes registrations that
//! ended or whose display is gone.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::clock::Clock;
use crate::countdown::{render_event, CountdownRegistry};
use crate::notify::{DisplayHandle, NotificationSink};
use crate::tasks::TaskHandle;

/// Default refresh period for live displays.
pub const BROADCAST_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);

/// One pending display edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    pub handle: DisplayHandle,
    pub content: String,
    /// The event has reached its end time; this is the final edit.
    pub ended: bool,
}

/// Compute the edit for every active registration.
pub fn tick(registry: &CountdownRegistry, now: DateTime<Utc>) -> Vec<DisplayUpdate> {
    registry
        .registrations()
        .iter()
        .map(|registration| match registry.event(&registration.event) {
            Ok(event) => DisplayUpdate {
                handle: registration.handle,
                content: render_event(&registration.event, event, now),
                ended: event.end_time <= now,
            },
            // Events are never auto-deleted; treat a dangling
            // registration as ended so it gets pruned.
            Err(_) => DisplayUpdate {
                handle: registration.handle,
                content: format!("{}: ended", registration.event),
                ended: true,
            },
        })
        .collect()
}

/// Run the broadcaster as a repeating task.
///
/// A failed edit deregisters the display silently; an ended event gets
/// one final "ended" edit before its registration is dropped.
pub fn spawn(
    registry: Arc<Mutex<CountdownRegistry>>,
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
                    let updates = {
                        let guard = match registry.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        tick(&guard, clock.now())
                    };
                    for update in updates {
                        let ok = sink.edit(update.handle, &update.content);
                        if !ok || update.ended {
                            let mut guard = match registry.lock() {
                                Ok(guard) => guard,
                                Err(poisoned) => poisoned.into_inner(),
                            };
                            guard.deregister(update.handle);
                            if update.ended {
                                tracing::info!(handle = %update.handle, "countdown display ended");
                            } else {
                                tracing::warn!(handle = %update.handle, "display edit refused, deregistering");
                            }
                        }
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }
    });
    TaskHandle::new(stop_tx, handle)
}
