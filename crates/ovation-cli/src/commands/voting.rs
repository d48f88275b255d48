use chrono::Utc;
use clap::Subcommand;
use ovation_core::UserId;

use super::{open_campaign, CmdResult};

#[derive(Subcommand)]
pub enum VotingAction {
    /// Nominate a member in a category
    Nominate {
        /// User id of the nominator
        nominator: u64,
        /// User id of the nominee
        nominee: u64,
        category: String,
    },
    /// Open a ballot enumerating the category's nominees
    Start { category: String },
    /// Cast a vote (one per voter per category, immutable)
    Cast {
        /// User id of the voter
        voter: u64,
        /// User id of the nominee
        nominee: u64,
        category: String,
    },
    /// Show a category's vote tally
    Results { category: String },
    /// Show nomination counts for every category
    Overview,
}

pub fn run(action: VotingAction) -> CmdResult {
    let mut store = open_campaign()?;
    let now = Utc::now();
    match action {
        VotingAction::Nominate { nominator, nominee, category } => {
            match store.nominate(UserId(nominator), UserId(nominee), &category, now)? {
                Some(_) => println!("Nomination recorded: {nominee} in '{category}'"),
                None => println!("Nomination unchanged: {nominee} in '{category}'"),
            }
        }
        VotingAction::Start { category } => {
            let session = store.start_voting_session(&category, now)?;
            println!("Ballot {} for '{}'", session.id(), session.category());
            for nominee in session.nominees() {
                println!("  nominee {nominee}");
            }
            println!(
                "Usable until {}",
                session.expires_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        VotingAction::Cast { voter, nominee, category } => {
            store.cast_vote(UserId(voter), UserId(nominee), &category, now)?;
            println!("Vote recorded in '{category}'");
        }
        VotingAction::Results { category } => {
            for entry in store.results(&category)? {
                println!(
                    "{}: {} vote{} ({:.1}%)",
                    entry.nominee,
                    entry.count,
                    if entry.count == 1 { "" } else { "s" },
                    entry.percentage
                );
            }
        }
        VotingAction::Overview => {
            for (key, counts) in store.nomination_overview() {
                println!("{key}:");
                for count in counts {
                    println!("  {} ({} nominator{})", count.nominee, count.nominators,
                        if count.nominators == 1 { "" } else { "s" });
                }
            }
        }
    }
    Ok(())
}
