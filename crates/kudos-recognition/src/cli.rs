//! CLI module for peer recognitions.
//!
//! # Usage
//!
//! ```bash
//! kudos recognition send -d sqlite:kudos.db --from <id> --to <id> -a 25 -m "Great demo!"
//! kudos recognition feed -d sqlite:kudos.db --limit 10
//! kudos recognition delete -d sqlite:kudos.db -i <recognition-id> --as <sender-id>
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};

use kudos_core::RecognitionRecord;
use kudos_store::SqlStore;

use crate::engine::{RecognitionQuery, Recognitions};

/// Recognition CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kudos-recognition", about = "Send and browse recognitions")]
pub struct RecognitionArgs {
    #[command(subcommand)]
    pub command: RecognitionCommands,
}

/// Recognition subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RecognitionCommands {
    /// Send a recognition with points attached.
    Send {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Sender user id.
        #[arg(long)]
        from: String,

        /// Recipient user id.
        #[arg(long)]
        to: String,

        /// Points to attach (1-100).
        #[arg(short, long)]
        amount: i64,

        /// Recognition message.
        #[arg(short, long)]
        message: String,

        /// Hide from the public feed.
        #[arg(long)]
        private: bool,
    },

    /// Show the public feed, newest first.
    Feed {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Page size.
        #[arg(long)]
        limit: Option<i64>,

        /// Page offset.
        #[arg(long, default_value_t = 0)]
        offset: i64,

        /// Output format (table, json).
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List a user's recognitions.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User id.
        #[arg(short, long)]
        user_id: String,

        /// Which side to list (sent, received, all).
        #[arg(long, default_value = "all")]
        side: String,

        /// Page size.
        #[arg(long)]
        limit: Option<i64>,

        /// Page offset.
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// Show one recognition.
    Show {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Recognition id.
        #[arg(short = 'i', long)]
        recognition_id: String,

        /// Viewing user id (private recognitions are sender/recipient only).
        #[arg(long = "as")]
        viewer: String,
    },

    /// Change a recognition's privacy. Sender-only.
    SetPrivacy {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Recognition id.
        #[arg(short = 'i', long)]
        recognition_id: String,

        /// Acting user id.
        #[arg(long = "as")]
        caller: String,

        /// Hide from the public feed.
        #[arg(long, conflicts_with = "public")]
        private: bool,

        /// Show on the public feed.
        #[arg(long)]
        public: bool,
    },

    /// Delete a recognition and reverse its transfer. Sender-only.
    Delete {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Recognition id.
        #[arg(short = 'i', long)]
        recognition_id: String,

        /// Acting user id.
        #[arg(long = "as")]
        caller: String,
    },
}

/// Recognition row for display.
#[derive(Tabled)]
struct RecognitionDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "From")]
    sender: String,
    #[tabled(rename = "To")]
    recipient: String,
    #[tabled(rename = "Points")]
    points: i64,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Private")]
    private: bool,
}

impl From<&RecognitionRecord> for RecognitionDisplay {
    fn from(rec: &RecognitionRecord) -> Self {
        Self {
            id: rec.id.clone(),
            sender: rec.sender_id.clone(),
            recipient: rec.recipient_id.clone(),
            points: rec.points_amount,
            message: rec.message.clone(),
            private: rec.is_private,
        }
    }
}

async fn open_engine(database: &str) -> Result<Recognitions, Box<dyn std::error::Error>> {
    let store = SqlStore::connect_url(database).await?;
    Ok(Recognitions::new(Arc::new(store)))
}

fn print_page(
    recognitions: &[RecognitionRecord],
    total: i64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(recognitions)?),
        _ => {
            let rows: Vec<RecognitionDisplay> = recognitions.iter().map(Into::into).collect();
            println!("{}", Table::new(rows));
            println!("{} of {total} shown", recognitions.len());
        }
    }
    Ok(())
}

/// Run the recognition CLI with the given arguments.
pub async fn run(args: RecognitionArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RecognitionCommands::Send {
            database,
            from,
            to,
            amount,
            message,
            private,
        } => {
            let recognitions = open_engine(&database).await?;
            let rec = recognitions
                .create(&from, &to, &message, amount, private)
                .await?;
            println!("Recognition {} sent ({} points)", rec.id, rec.points_amount);
            Ok(())
        }
        RecognitionCommands::Feed {
            database,
            limit,
            offset,
            format,
        } => {
            let recognitions = open_engine(&database).await?;
            let page = recognitions.feed(limit, offset).await?;
            print_page(&page.recognitions, page.total_count, &format)
        }
        RecognitionCommands::List {
            database,
            user_id,
            side,
            limit,
            offset,
        } => {
            let recognitions = open_engine(&database).await?;
            let query = match side.as_str() {
                "sent" => RecognitionQuery::Sent,
                "received" => RecognitionQuery::Received,
                _ => RecognitionQuery::All,
            };
            let page = recognitions.for_user(&user_id, query, limit, offset).await?;
            print_page(&page.recognitions, page.total_count, "table")
        }
        RecognitionCommands::Show {
            database,
            recognition_id,
            viewer,
        } => {
            let recognitions = open_engine(&database).await?;
            let rec = recognitions.get(&recognition_id, &viewer).await?;
            println!("{}", serde_json::to_string_pretty(&rec)?);
            Ok(())
        }
        RecognitionCommands::SetPrivacy {
            database,
            recognition_id,
            caller,
            private,
            public,
        } => {
            let recognitions = open_engine(&database).await?;
            let is_private = match (private, public) {
                (true, _) => true,
                (_, true) => false,
                _ => return Err("pass --private or --public".into()),
            };
            let rec = recognitions
                .set_privacy(&recognition_id, &caller, is_private)
                .await?;
            println!(
                "Recognition {} is now {}",
                rec.id,
                if rec.is_private { "private" } else { "public" }
            );
            Ok(())
        }
        RecognitionCommands::Delete {
            database,
            recognition_id,
            caller,
        } => {
            let recognitions = open_engine(&database).await?;
            recognitions.delete(&recognition_id, &caller).await?;
            println!("Recognition {recognition_id} deleted and points returned");
            Ok(())
        }
    }
}
