//! CLI module for the reward catalog and redemptions.
//!
//! # Usage
//!
//! ```bash
//! # Manage the catalog
//! kudos reward add -d sqlite:kudos.db -t "Coffee mug" -c 100 --category Swag --stock 25
//! kudos reward list -d sqlite:kudos.db
//!
//! # Redeem and process redemptions
//! kudos reward redeem -d sqlite:kudos.db -u <user-id> -r <reward-id>
//! kudos reward set-status -d sqlite:kudos.db -i <redemption-id> -s CANCELLED
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};

use kudos_core::{NewReward, RedemptionRecord, RedemptionStatus, RewardPatch, RewardRecord};
use kudos_store::SqlStore;

use crate::engine::Rewards;

/// Rewards CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kudos-reward", about = "Manage rewards and redemptions")]
pub struct RewardArgs {
    #[command(subcommand)]
    pub command: RewardCommands,
}

/// Rewards subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RewardCommands {
    /// Add a reward to the catalog.
    Add {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Reward title.
        #[arg(short, long)]
        title: String,

        /// Reward description.
        #[arg(long, default_value = "")]
        description: String,

        /// Points cost (at least 1).
        #[arg(short, long)]
        cost: i64,

        /// Catalog category.
        #[arg(long, default_value = "")]
        category: String,

        /// Stock quantity (omit for unlimited).
        #[arg(long)]
        stock: Option<i64>,
    },

    /// List the catalog.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Include deactivated rewards.
        #[arg(long)]
        all: bool,

        /// Output format (table, json).
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Update a reward.
    Update {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Reward id.
        #[arg(short, long)]
        reward_id: String,

        /// New title.
        #[arg(short, long)]
        title: Option<String>,

        /// New points cost.
        #[arg(short, long)]
        cost: Option<i64>,

        /// New stock quantity (use --unlimited to clear).
        #[arg(long, conflicts_with = "unlimited")]
        stock: Option<i64>,

        /// Make the stock unlimited.
        #[arg(long)]
        unlimited: bool,

        /// Activate the reward.
        #[arg(long, conflicts_with = "deactivate")]
        activate: bool,

        /// Deactivate the reward.
        #[arg(long)]
        deactivate: bool,
    },

    /// Remove a reward (blocked while pending redemptions exist).
    Remove {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Reward id.
        #[arg(short, long)]
        reward_id: String,
    },

    /// Redeem a reward for a user.
    Redeem {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// Reward id.
        #[arg(short, long)]
        reward_id: String,
    },

    /// List redemptions, optionally for one user.
    Redemptions {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Filter by user id.
        #[arg(short, long)]
        user_id: Option<String>,

        /// Output format (table, json).
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Overwrite a redemption's status.
    SetStatus {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Redemption id.
        #[arg(short = 'i', long)]
        redemption_id: String,

        /// New status (PENDING, APPROVED, FULFILLED, CANCELLED).
        #[arg(short, long)]
        status: String,
    },

    /// Show catalog and redemption statistics.
    Stats {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },
}

/// Reward row for display.
#[derive(Tabled)]
struct RewardDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Cost")]
    cost: i64,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&RewardRecord> for RewardDisplay {
    fn from(reward: &RewardRecord) -> Self {
        Self {
            id: reward.id.clone(),
            title: reward.title.clone(),
            category: reward.category.clone(),
            cost: reward.points_cost,
            stock: reward
                .stock_quantity
                .map_or_else(|| "unlimited".to_string(), |s| s.to_string()),
            active: reward.is_active,
        }
    }
}

/// Redemption row for display.
#[derive(Tabled)]
struct RedemptionDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Reward")]
    reward_id: String,
    #[tabled(rename = "Points")]
    points: i64,
    #[tabled(rename = "Status")]
    status: RedemptionStatus,
    #[tabled(rename = "Code")]
    code: String,
}

impl From<&RedemptionRecord> for RedemptionDisplay {
    fn from(r: &RedemptionRecord) -> Self {
        Self {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            reward_id: r.reward_id.clone(),
            points: r.points_spent,
            status: r.status,
            code: r.redemption_code.clone(),
        }
    }
}

async fn open_engine(database: &str) -> Result<Rewards, Box<dyn std::error::Error>> {
    let store = SqlStore::connect_url(database).await?;
    Ok(Rewards::new(Arc::new(store)))
}

/// Run the rewards CLI with the given arguments.
pub async fn run(args: RewardArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RewardCommands::Add {
            database,
            title,
            description,
            cost,
            category,
            stock,
        } => {
            let rewards = open_engine(&database).await?;
            let reward = rewards
                .create_reward(NewReward {
                    title,
                    description,
                    points_cost: cost,
                    category,
                    stock_quantity: stock,
                })
                .await?;
            println!("Added reward {} ({})", reward.title, reward.id);
            Ok(())
        }
        RewardCommands::List {
            database,
            all,
            format,
        } => {
            let rewards = open_engine(&database).await?;
            let catalog = rewards.list_rewards(!all).await?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&catalog)?),
                _ => {
                    let rows: Vec<RewardDisplay> = catalog.iter().map(Into::into).collect();
                    println!("{}", Table::new(rows));
                }
            }
            Ok(())
        }
        RewardCommands::Update {
            database,
            reward_id,
            title,
            cost,
            stock,
            unlimited,
            activate,
            deactivate,
        } => {
            let rewards = open_engine(&database).await?;
            let stock_quantity = if unlimited {
                Some(None)
            } else {
                stock.map(Some)
            };
            let is_active = match (activate, deactivate) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let reward = rewards
                .update_reward(
                    &reward_id,
                    RewardPatch {
                        title,
                        points_cost: cost,
                        stock_quantity,
                        is_active,
                        ..Default::default()
                    },
                )
                .await?;
            println!("Updated reward {}", reward.id);
            Ok(())
        }
        RewardCommands::Remove {
            database,
            reward_id,
        } => {
            let rewards = open_engine(&database).await?;
            rewards.delete_reward(&reward_id).await?;
            println!("Removed reward {reward_id}");
            Ok(())
        }
        RewardCommands::Redeem {
            database,
            user_id,
            reward_id,
        } => {
            let rewards = open_engine(&database).await?;
            let detail = rewards.redeem(&user_id, &reward_id).await?;
            println!(
                "{} redeemed {} for {} points; code {}",
                detail.user.display_name(),
                detail.reward.title,
                detail.redemption.points_spent,
                detail.redemption.redemption_code
            );
            Ok(())
        }
        RewardCommands::Redemptions {
            database,
            user_id,
            format,
        } => {
            let rewards = open_engine(&database).await?;
            let redemptions = match user_id {
                Some(user_id) => rewards.redemptions_for_user(&user_id).await?,
                None => rewards.list_redemptions().await?,
            };
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&redemptions)?),
                _ => {
                    let rows: Vec<RedemptionDisplay> =
                        redemptions.iter().map(Into::into).collect();
                    println!("{}", Table::new(rows));
                }
            }
            Ok(())
        }
        RewardCommands::SetStatus {
            database,
            redemption_id,
            status,
        } => {
            let rewards = open_engine(&database).await?;
            let status: RedemptionStatus = status.parse()?;
            let detail = rewards.set_status(&redemption_id, status).await?;
            println!(
                "Redemption {} is now {}",
                detail.redemption.id, detail.redemption.status
            );
            Ok(())
        }
        RewardCommands::Stats { database } => {
            let rewards = open_engine(&database).await?;
            let stats = rewards.statistics().await?;
            println!("rewards:             {}", stats.total_rewards);
            println!("active rewards:      {}", stats.active_rewards);
            println!("redemptions:         {}", stats.total_redemptions);
            println!("pending redemptions: {}", stats.pending_redemptions);
            Ok(())
        }
    }
}
