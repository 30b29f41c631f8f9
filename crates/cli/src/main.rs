//! Rolodex CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run contacts API migrations
//! rolodex-cli migrate contacts
//!
//! # Run quotes site migrations
//! rolodex-cli migrate quotes
//!
//! # Run all migrations
//! rolodex-cli migrate all
//!
//! # Load authors and quotes, replacing what is there
//! rolodex-cli seed quotes crates/cli/seeds/quotes.yaml --clear
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rolodex-cli")]
#[command(author, version, about = "Rolodex CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Load sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run contacts API migrations
    Contacts,
    /// Run quotes site migrations
    Quotes,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load authors and quotes from a YAML file
    Quotes {
        /// Path to the YAML seed file
        file: String,

        /// Delete existing authors and quotes first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Contacts => commands::migrate::contacts().await?,
            MigrateTarget::Quotes => commands::migrate::quotes().await?,
            MigrateTarget::All => {
                commands::migrate::contacts().await?;
                commands::migrate::quotes().await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Quotes { file, clear } => commands::seed::quotes(&file, clear).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_seed_clear_flag() {
        let cli = Cli::try_parse_from(["rolodex-cli", "seed", "quotes", "q.yaml", "--clear"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Quotes { clear: true, .. }
            })
        ));
    }
}
