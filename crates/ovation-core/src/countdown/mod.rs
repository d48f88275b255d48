//! Countdown registry: named countdown events and live display
//! subscriptions.
//!
//! Events are admin-created, persisted, and never auto-deleted -- an event
//! past its end time still answers queries as "ended". Live display
//! registrations are ephemeral: they exist only in process memory and die
//! with the process, when their event ends, or when an edit fails.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, PersistenceError, Result};
use crate::notify::DisplayHandle;
use crate::storage::{Ledger, LedgerStore};

mod format;

pub use format::format_remaining;

/// Community key used when no community is specified.
pub const GLOBAL_COMMUNITY: &str = "global";

/// An admin-created countdown target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownEvent {
    pub end_time: DateTime<Utc>,
    pub description: String,
}

/// An active live-display subscription.
#[derive(Debug, Clone)]
pub struct LiveRegistration {
    pub handle: DisplayHandle,
    pub event: String,
}

/// Render one event line for a display or snapshot.
pub fn render_event(name: &str, event: &CountdownEvent, now: DateTime<Utc>) -> String {
    let remaining = format_remaining(event.end_time - now);
    if event.description.is_empty() {
        format!("{name}: {remaining}")
    } else {
        format!("{name}: {remaining} - {}", event.description)
    }
}

type CountdownsFile = BTreeMap<String, BTreeMap<String, CountdownEvent>>;

/// Owns countdown events (persisted, keyed by community) and live
/// display registrations (process memory only).
pub struct CountdownRegistry {
    community: String,
    /// Full on-disk document; other communities' events pass through
    /// saves untouched.
    events: CountdownsFile,
    registrations: Vec<LiveRegistration>,
    store: Arc<dyn LedgerStore>,
}

impl CountdownRegistry {
    /// Load the countdown ledger, scoped to one community.
    pub fn open(store: Arc<dyn LedgerStore>, community: impl Into<String>) -> Result<Self> {
        let events = match store.load(Ledger::Countdowns)? {
            Some(contents) => {
                serde_json::from_str(&contents).map_err(PersistenceError::Decode)?
            }
            None => CountdownsFile::default(),
        };
        Ok(Self {
            community: community.into(),
            events,
            registrations: Vec::new(),
            store,
        })
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn add_event(&mut self, name: &str, end_time: DateTime<Utc>, description: &str) -> Result<()> {
        let name = name.trim();
        let community = self.events.entry(self.community.clone()).or_default();
        if community.contains_key(name) {
            return Err(CampaignError::EventExists(name.to_string()));
        }
        community.insert(
            name.to_string(),
            CountdownEvent {
                end_time,
                description: description.to_string(),
            },
        );
        self.persist()
    }

    pub fn event(&self, name: &str) -> Result<&CountdownEvent> {
        self.events
            .get(&self.community)
            .and_then(|events| events.get(name))
            .ok_or_else(|| CampaignError::EventNotFound(name.to_string()))
    }

    pub fn events(&self) -> impl Iterator<Item = (&String, &CountdownEvent)> {
        self.events
            .get(&self.community)
            .into_iter()
            .flat_map(|events| events.iter())
    }

    /// Point-in-time rendering of one event (`Some(name)`) or all events,
    /// without creating a registration.
    pub fn snapshot(&self, name: Option<&str>, now: DateTime<Utc>) -> Result<Vec<String>> {
        match name {
            Some(name) => {
                let event = self.event(name)?;
                Ok(vec![render_event(name, event, now)])
            }
            None => Ok(self
                .events()
                .map(|(name, event)| render_event(name, event, now))
                .collect()),
        }
    }

    // ── Live displays ────────────────────────────────────────────────

    /// Subscribe a display to per-tick refreshes of one event.
    pub fn register_live(&mut self, handle: DisplayHandle, name: &str) -> Result<()> {
        let name = name.trim();
        self.event(name)?;
        self.registrations.push(LiveRegistration {
            handle,
            event: name.to_string(),
        });
        tracing::info!(%handle, event = name, "live countdown display registered");
        Ok(())
    }

    pub fn registrations(&self) -> &[LiveRegistration] {
        &self.registrations
    }

    pub fn deregister(&mut self, handle: DisplayHandle) {
        self.registrations.retain(|r| r.handle != handle);
    }

    fn persist(&self) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(&self.events).map_err(PersistenceError::Encode)?;
        self.store.save(Ledger::Countdowns, &contents)?;
        tracing::debug!("countdown ledger persisted");
        Ok(())
    }
}
