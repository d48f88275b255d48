use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ovation-cli", version, about = "Ovation awards-campaign CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Award category management
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Nominations, voting and results
    Vote {
        #[command(subcommand)]
        action: commands::voting::VotingAction,
    },
    /// Campaign deadline management
    Deadline {
        #[command(subcommand)]
        action: commands::deadline::DeadlineAction,
    },
    /// Countdown event management
    Countdown {
        #[command(subcommand)]
        action: commands::countdown::CountdownAction,
    },
    /// Run the deadline monitor and countdown broadcaster in the foreground
    Watch {
        /// Also register a live display for this countdown event
        #[arg(long)]
        live: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Category { action } => commands::category::run(action),
        Commands::Vote { action } => commands::voting::run(action),
        Commands::Deadline { action } => commands::deadline::run(action),
        Commands::Countdown { action } => commands::countdown::run(action),
        Commands::Watch { live } => commands::watch::run(live),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
