use clap::Subcommand;

use super::{open_campaign, CmdResult};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create an award category
    Add {
        /// Category name (normalized to lowercase)
        name: String,
        /// Allow members to nominate themselves
        #[arg(long)]
        allow_self_nomination: bool,
    },
    /// Change a category's self-nomination policy
    SelfNomination {
        name: String,
        #[arg(long)]
        allow: bool,
    },
    /// Remove a category along with its nominations and votes
    Remove { name: String },
    /// List categories
    List,
}

pub fn run(action: CategoryAction) -> CmdResult {
    let mut store = open_campaign()?;
    match action {
        CategoryAction::Add { name, allow_self_nomination } => {
            let key = store.create_category(&name, allow_self_nomination)?;
            println!("Category created: {key}");
        }
        CategoryAction::SelfNomination { name, allow } => {
            store.set_self_nomination(&name, allow)?;
            println!(
                "Self-nomination {} for '{}'",
                if allow { "allowed" } else { "disallowed" },
                name.trim().to_lowercase()
            );
        }
        CategoryAction::Remove { name } => {
            store.remove_category(&name)?;
            println!("Category removed: {}", name.trim().to_lowercase());
        }
        CategoryAction::List => {
            for (key, category) in store.categories() {
                println!(
                    "{key} (self-nomination: {})",
                    if category.allow_self_nomination { "allowed" } else { "disallowed" }
                );
            }
        }
    }
    Ok(())
}
