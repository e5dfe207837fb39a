//! Address API CLI - Database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run migrations using ADDRESS_API_DATABASE_URL (or DATABASE_URL)
//! address-cli migrate
//!
//! # Run migrations against an explicit database
//! address-cli migrate --database-url postgres://localhost/address
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "address-cli")]
#[command(author, version, about = "Address API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Database URL (overrides `ADDRESS_API_DATABASE_URL`)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { database_url } => commands::migrate::run(database_url).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_with_url() {
        let cli = Cli::try_parse_from(["address-cli", "migrate", "--database-url", "postgres://x/y"])
            .expect("valid arguments");
        let Commands::Migrate { database_url } = cli.command;
        assert_eq!(database_url.as_deref(), Some("postgres://x/y"));
    }
}
