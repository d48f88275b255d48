//! # Ovation Core Library
//!
//! Core business logic for Ovation, a timed awards-campaign engine:
//! multi-category anonymous nomination/voting campaigns gated by
//! admin-configured deadlines, plus the countdown machinery that announces
//! phase transitions and refreshes live countdown displays.
//!
//! ## Architecture
//!
//! - **Campaign Store**: owns categories, nominations, votes, deadlines
//!   and the one-shot announcement flags; every mutation persists its
//!   ledger immediately
//! - **Countdown Registry**: named countdown events plus ephemeral live
//!   display registrations
//! - **Scheduler tasks**: the deadline phase monitor and the live
//!   countdown broadcaster are synchronous `tick` functions wrapped in
//!   start/stoppable tokio loops, driven by an injectable [`Clock`]
//! - **Storage**: one JSON document per ledger, fully rewritten on every
//!   mutation
//!
//! The host platform (chat adapter, CLI, tests) supplies a
//! [`NotificationSink`] for delivery and owns identity, permissions and
//! rendering beyond the plain text produced here.

pub mod broadcaster;
pub mod campaign;
pub mod clock;
pub mod countdown;
pub mod error;
pub mod events;
pub mod monitor;
pub mod notify;
pub mod storage;
pub mod tasks;

pub use campaign::{
    AnnouncementState, CampaignStore, Category, CategoryKey, Deadlines, NominationCount,
    TallyEntry, UserId, VotingSession,
};
pub use clock::{Clock, SystemClock};
pub use countdown::{format_remaining, CountdownEvent, CountdownRegistry, GLOBAL_COMMUNITY};
pub use error::{CampaignError, PersistenceError, Result};
pub use events::{Announcement, CampaignEvent};
pub use notify::{DisplayHandle, NotificationSink};
pub use storage::{data_dir, JsonFileStore, Ledger, LedgerStore, MemoryStore};
pub use tasks::TaskHandle;
