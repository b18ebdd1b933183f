//! CLI module for storage administration.
//!
//! Provides the `init` and `user` subcommands of the unified `kudos` CLI:
//! schema creation and user account management.
//!
//! # Usage
//!
//! ```bash
//! # Initialize database schema
//! kudos init -d sqlite:kudos.db
//!
//! # Register a user
//! kudos user add -d sqlite:kudos.db -e ada@example.com -f Ada -l Lovelace --allowance 100
//!
//! # List users
//! kudos user list -d sqlite:kudos.db
//! ```

use clap::{Args, Parser, Subcommand};
use tabled::{Table, Tabled};

use kudos_core::{NewUser, Role, UserRecord};

use crate::{SqlStore, Store};

/// Schema initialization arguments.
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Database connection URL.
    #[arg(short, long, env = "DATABASE_URL")]
    pub database: String,
}

/// User management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kudos-user", about = "Manage user accounts")]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

/// User management subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// Register a new user.
    Add {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Email address (must be unique).
        #[arg(short, long)]
        email: String,

        /// First name.
        #[arg(short, long)]
        first_name: String,

        /// Last name.
        #[arg(short, long)]
        last_name: String,

        /// Department.
        #[arg(long, default_value = "")]
        department: String,

        /// Role (EMPLOYEE, MANAGER, ADMIN).
        #[arg(short, long, default_value = "EMPLOYEE")]
        role: String,

        /// Starting points balance.
        #[arg(short, long, default_value_t = 0)]
        balance: i64,

        /// Monthly points allowance.
        #[arg(short, long, default_value_t = 0)]
        allowance: i64,
    },

    /// List all active users.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Output format (table, json).
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Enable a deactivated account.
    Activate {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,
    },

    /// Soft-disable an account.
    Deactivate {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,
    },
}

/// User row for display.
#[derive(Tabled)]
struct UserDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Balance")]
    balance: i64,
    #[tabled(rename = "Allowance")]
    allowance: i64,
}

impl From<&UserRecord> for UserDisplay {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.display_name(),
            department: user.department.clone(),
            role: user.role.to_string(),
            balance: user.points_balance,
            allowance: user.monthly_allocation,
        }
    }
}

/// Initialize the database schema.
pub async fn run_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqlStore::connect_url(&args.database).await?;
    store.init_schema().await?;
    println!("Schema initialized");
    Ok(())
}

/// Run the user management CLI.
pub async fn run_user(args: UserArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        UserCommands::Add {
            database,
            email,
            first_name,
            last_name,
            department,
            role,
            balance,
            allowance,
        } => {
            let store = SqlStore::connect_url(&database).await?;
            let role: Role = role.parse()?;
            let user = store
                .insert_user(NewUser {
                    email,
                    first_name,
                    last_name,
                    department,
                    role,
                    points_balance: balance,
                    monthly_allocation: allowance,
                })
                .await?;
            println!("Added user {} ({})", user.display_name(), user.id);
            Ok(())
        }
        UserCommands::List { database, format } => {
            let store = SqlStore::connect_url(&database).await?;
            let users = store.list_active_users().await?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&users)?),
                _ => {
                    let rows: Vec<UserDisplay> = users.iter().map(Into::into).collect();
                    println!("{}", Table::new(rows));
                }
            }
            Ok(())
        }
        UserCommands::Activate { database, user_id } => {
            set_active(&database, &user_id, true).await
        }
        UserCommands::Deactivate { database, user_id } => {
            set_active(&database, &user_id, false).await
        }
    }
}

async fn set_active(
    database: &str,
    user_id: &str,
    active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqlStore::connect_url(database).await?;
    if store.set_user_active(user_id, active).await? {
        println!(
            "User {user_id} {}",
            if active { "activated" } else { "deactivated" }
        );
        Ok(())
    } else {
        Err(format!("user {user_id} not found").into())
    }
}
