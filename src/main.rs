//! Unified kudos CLI.
//!
//! This binary provides a unified interface to all kudos components:
//! - `kudos init` - Create the database schema
//! - `kudos user` - Manage user accounts
//! - `kudos ledger` - Inspect and mutate point balances
//! - `kudos reward` - Manage rewards and redemptions
//! - `kudos recognition` - Send and browse recognitions
//! - `kudos allocate` - Run the monthly allowance job

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Kudos unified CLI.
#[derive(Parser)]
#[command(
    name = "kudos",
    version,
    about = "Peer-recognition points ledger and rewards engine",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema.
    Init(kudos_store::cli::InitArgs),

    /// Manage user accounts.
    User(kudos_store::cli::UserArgs),

    /// Inspect and mutate point balances.
    Ledger(kudos_ledger::cli::LedgerArgs),

    /// Manage rewards and redemptions.
    Reward(kudos_rewards::cli::RewardArgs),

    /// Send and browse recognitions.
    Recognition(kudos_recognition::cli::RecognitionArgs),

    /// Run the monthly allowance job, once or on its schedule.
    Allocate(kudos_ledger::cli::AllocateArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => kudos_store::cli::run_init(args).await,
        Commands::User(args) => kudos_store::cli::run_user(args).await,
        Commands::Ledger(args) => kudos_ledger::cli::run(args).await,
        Commands::Reward(args) => kudos_rewards::cli::run(args).await,
        Commands::Recognition(args) => kudos_recognition::cli::run(args).await,
        Commands::Allocate(args) => kudos_ledger::cli::run_allocate(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
