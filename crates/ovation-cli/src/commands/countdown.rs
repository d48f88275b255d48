use chrono::Utc;
use clap::Subcommand;

use super::{open_countdowns, parse_timestamp, CmdResult};

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Create a named countdown event
    Add {
        name: String,
        /// RFC 3339 end time, e.g. 2026-01-15T20:00:00Z
        #[arg(long)]
        at: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Snapshot one event, or all events when no name is given
    Show { name: Option<String> },
}

pub fn run(action: CountdownAction) -> CmdResult {
    let mut registry = open_countdowns()?;
    match action {
        CountdownAction::Add { name, at, description } => {
            let end_time = parse_timestamp(&at)?;
            registry.add_event(&name, end_time, &description)?;
            println!("Countdown created: {}", name.trim());
        }
        CountdownAction::Show { name } => {
            let lines = registry.snapshot(name.as_deref(), Utc::now())?;
            if lines.is_empty() {
                println!("No countdown events.");
            }
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}
