use chrono::{DateTime, Utc};
use clap::Subcommand;
use ovation_core::format_remaining;

use super::{open_campaign, parse_timestamp, CmdResult};

#[derive(Subcommand)]
pub enum DeadlineAction {
    /// Set or clear the nomination deadline
    Nominations {
        /// RFC 3339 timestamp, e.g. 2026-01-15T20:00:00Z
        #[arg(long, conflicts_with = "clear")]
        at: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        clear: bool,
    },
    /// Set or clear the voting deadline
    Voting {
        /// RFC 3339 timestamp, e.g. 2026-01-15T20:00:00Z
        #[arg(long, conflicts_with = "clear")]
        at: Option<String>,
        /// Remove the deadline
        #[arg(long)]
        clear: bool,
    },
    /// Show both deadlines with remaining time
    Show,
}

fn parse_target(at: Option<String>, clear: bool) -> Result<Option<DateTime<Utc>>, Box<dyn std::error::Error>> {
    match (at, clear) {
        (Some(at), false) => Ok(Some(parse_timestamp(&at)?)),
        (None, true) => Ok(None),
        _ => Err("pass either --at <timestamp> or --clear".into()),
    }
}

fn describe(label: &str, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match deadline {
        Some(at) => format!(
            "{label}: {} ({})",
            at.format("%Y-%m-%d %H:%M UTC"),
            format_remaining(at - now)
        ),
        None => format!("{label}: not set"),
    }
}

pub fn run(action: DeadlineAction) -> CmdResult {
    let mut store = open_campaign()?;
    let now = Utc::now();
    match action {
        DeadlineAction::Nominations { at, clear } => {
            let target = parse_target(at, clear)?;
            store.set_nomination_deadline(target, now)?;
            println!("{}", describe("Nomination deadline", target, now));
        }
        DeadlineAction::Voting { at, clear } => {
            let target = parse_target(at, clear)?;
            store.set_voting_deadline(target, now)?;
            println!("{}", describe("Voting deadline", target, now));
        }
        DeadlineAction::Show => {
            let deadlines = store.deadlines();
            println!("{}", describe("Nomination deadline", deadlines.nomination_deadline, now));
            println!("{}", describe("Voting deadline", deadlines.voting_deadline, now));
        }
    }
    Ok(())
}
