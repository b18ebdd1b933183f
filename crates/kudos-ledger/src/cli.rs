//! CLI module for ledger operations and the allocation scheduler.
//!
//! Provides the `ledger` and `allocate` subcommands of the unified `kudos`
//! CLI.
//!
//! # Usage
//!
//! ```bash
//! # Balance and history
//! kudos ledger balance -d sqlite:kudos.db -u <user-id>
//! kudos ledger history -d sqlite:kudos.db -u <user-id> --limit 20
//!
//! # Manual adjustments and transfers
//! kudos ledger credit -d sqlite:kudos.db -u <user-id> -a 50 -m "Spot bonus"
//! kudos ledger transfer -d sqlite:kudos.db --from <id> --to <id> -a 100 -m "Thanks!"
//!
//! # Run the allowance job once, or on a schedule
//! kudos allocate --config kudos.toml --now
//! kudos allocate --config kudos.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use kudos_config::{load_config, validate_config, LoggingConfig, StorageConfig};
use kudos_core::{TransactionRecord, TransactionType};
use kudos_store::{SqlStore, SqlStoreConfig};

use crate::allocation::run_monthly_allocation;
use crate::engine::Ledger;
use crate::scheduler::spawn_allocation_scheduler;

/// Ledger CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kudos-ledger", about = "Inspect and mutate point balances")]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommands,
}

/// Ledger subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum LedgerCommands {
    /// Show a user's balance and monthly allowance.
    Balance {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,
    },

    /// Show a user's recent ledger entries.
    History {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// Maximum entries to show.
        #[arg(long)]
        limit: Option<i64>,

        /// Output format (table, json).
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Credit points to a user.
    Credit {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// Points to credit.
        #[arg(short, long)]
        amount: i64,

        /// Ledger entry description.
        #[arg(short, long)]
        message: String,
    },

    /// Debit points from a user.
    Debit {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// Points to debit.
        #[arg(short, long)]
        amount: i64,

        /// Ledger entry description.
        #[arg(short, long)]
        message: String,
    },

    /// Transfer points between two users.
    Transfer {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Sender user id.
        #[arg(long)]
        from: String,

        /// Recipient user id.
        #[arg(long)]
        to: String,

        /// Points to transfer.
        #[arg(short, long)]
        amount: i64,

        /// Transfer description.
        #[arg(short, long)]
        message: String,
    },

    /// Overwrite a user's monthly allowance.
    SetAllowance {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// New monthly allowance.
        #[arg(short, long)]
        amount: i64,
    },

    /// Show system-wide ledger statistics.
    Stats {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },
}

/// Allocation scheduler arguments.
#[derive(Args, Debug, Clone)]
pub struct AllocateArgs {
    /// Config file path (json/yaml/toml).
    #[arg(short, long, default_value = "kudos.toml")]
    pub config: PathBuf,

    /// Run one allocation pass and exit instead of scheduling.
    #[arg(long)]
    pub now: bool,
}

/// Ledger entry row for display.
#[derive(Tabled)]
struct TransactionDisplay {
    #[tabled(rename = "When")]
    created_at: i64,
    #[tabled(rename = "Kind")]
    kind: TransactionType,
    #[tabled(rename = "Amount")]
    amount: i64,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&TransactionRecord> for TransactionDisplay {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            created_at: tx.created_at,
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description.clone(),
        }
    }
}

async fn open_ledger(database: &str) -> Result<Ledger, Box<dyn std::error::Error>> {
    let store = SqlStore::connect_url(database).await?;
    Ok(Ledger::new(Arc::new(store)))
}

/// Run the ledger CLI with the given arguments.
pub async fn run(args: LedgerArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        LedgerCommands::Balance { database, user_id } => {
            let ledger = open_ledger(&database).await?;
            let view = ledger.balance(&user_id).await?;
            println!(
                "balance: {}  monthly allowance: {}",
                view.points_balance, view.monthly_allocation
            );
            Ok(())
        }
        LedgerCommands::History {
            database,
            user_id,
            limit,
            format,
        } => {
            let ledger = open_ledger(&database).await?;
            let history = ledger.history(&user_id, limit).await?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&history)?),
                _ => {
                    let rows: Vec<TransactionDisplay> = history.iter().map(Into::into).collect();
                    println!("{}", Table::new(rows));
                }
            }
            Ok(())
        }
        LedgerCommands::Credit {
            database,
            user_id,
            amount,
            message,
        } => {
            let ledger = open_ledger(&database).await?;
            let out = ledger
                .credit(&user_id, amount, &message, TransactionType::Earned, None)
                .await?;
            println!("credited {}; new balance {}", out.amount, out.new_balance);
            Ok(())
        }
        LedgerCommands::Debit {
            database,
            user_id,
            amount,
            message,
        } => {
            let ledger = open_ledger(&database).await?;
            let out = ledger.debit(&user_id, amount, &message, None).await?;
            println!("debited {}; new balance {}", out.amount, out.new_balance);
            Ok(())
        }
        LedgerCommands::Transfer {
            database,
            from,
            to,
            amount,
            message,
        } => {
            let ledger = open_ledger(&database).await?;
            let out = ledger.transfer(&from, &to, amount, &message, None).await?;
            println!(
                "transferred {}; sender balance {}, recipient balance {}",
                out.amount, out.sender_new_balance, out.recipient_new_balance
            );
            Ok(())
        }
        LedgerCommands::SetAllowance {
            database,
            user_id,
            amount,
        } => {
            let ledger = open_ledger(&database).await?;
            let user = ledger.set_monthly_allocation(&user_id, amount).await?;
            println!(
                "monthly allowance for {} set to {}",
                user.display_name(),
                user.monthly_allocation
            );
            Ok(())
        }
        LedgerCommands::Stats { database } => {
            let ledger = open_ledger(&database).await?;
            let stats = ledger.statistics().await?;
            println!("points in system:   {}", stats.total_points_in_system);
            println!("total transactions: {}", stats.total_transactions);
            for totals in &stats.by_kind {
                println!(
                    "  {:<10} count {:<8} sum {}",
                    totals.kind.as_str(),
                    totals.count,
                    totals.total
                );
            }
            Ok(())
        }
    }
}

/// Run the allocation job once or on its recurring schedule.
pub async fn run_allocate(args: AllocateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    validate_config(&config)?;

    init_tracing(&config.logging);

    if let Some(listen) = &config.metrics.listen {
        match kudos_metrics::init_prometheus(listen) {
            Ok(()) => info!("metrics exporter listening on {listen}"),
            Err(e) => warn!("failed to start metrics exporter: {e}"),
        }
    }

    let store = SqlStore::connect(sql_config(&config.storage)).await?;
    let ledger = Ledger::new(Arc::new(store));

    if args.now {
        let report = run_monthly_allocation(&ledger).await?;
        println!(
            "credited {} users ({} points), {} failed",
            report.credited, report.points_granted, report.failed
        );
        return Ok(());
    }

    if !config.allocation.enabled {
        warn!("allocation is disabled in the config; nothing to schedule");
        return Ok(());
    }

    // Run until SIGINT/SIGTERM
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    let period = Duration::from_secs(config.allocation.period_secs);
    let handle = spawn_allocation_scheduler(ledger, period, shutdown);
    handle.await?;
    Ok(())
}

fn sql_config(storage: &StorageConfig) -> SqlStoreConfig {
    SqlStoreConfig::new(&storage.database_url)
        .max_connections(storage.max_connections)
        .min_connections(storage.min_connections)
        .connect_timeout(Duration::from_secs(storage.connect_timeout_secs))
        .max_lifetime(Duration::from_secs(storage.max_lifetime_secs))
        .idle_timeout(Duration::from_secs(storage.idle_timeout_secs))
}

fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
