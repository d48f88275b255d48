pub mod category;
pub mod countdown;
pub mod deadline;
pub mod voting;
pub mod watch;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ovation_core::{CampaignStore, CountdownRegistry, JsonFileStore, GLOBAL_COMMUNITY};

pub(crate) type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn open_campaign() -> Result<CampaignStore, Box<dyn std::error::Error>> {
    let store = Arc::new(JsonFileStore::open()?);
    Ok(CampaignStore::open(store)?)
}

pub(crate) fn open_countdowns() -> Result<CountdownRegistry, Box<dyn std::error::Error>> {
    let store = Arc::new(JsonFileStore::open()?);
    Ok(CountdownRegistry::open(store, GLOBAL_COMMUNITY)?)
}

/// Parse an RFC 3339 timestamp, e.g. `2026-01-15T20:00:00Z`.
pub(crate) fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(input)?.with_timezone(&Utc))
}
