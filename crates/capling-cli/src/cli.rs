//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Capling - A spending companion that reacts to how you spend
#[derive(Parser)]
#[command(name = "capling")]
#[command(about = "Personal finance tracker with a mascot that reflects your habits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "capling.db", global = true)]
    pub db: PathBuf,

    /// Gamification config file (defaults to the user data dir, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// User id that local commands act as
    ///
    /// Matches the identity the server assigns when authentication is disabled.
    #[arg(long, env = "CAPLING_USER", default_value = "local-dev", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set CAPLING_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory with the built web UI
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Show your Capling's mood and level
    Status {
        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a Capling derived from a hosted Supabase store
    ///
    /// Reads SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY (or SUPABASE_ANON_KEY).
    RemoteStatus {
        /// Remote user id (defaults to --user)
        #[arg(long)]
        user_id: Option<String>,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective gamification config as TOML
    Config,
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// Add an account
    Add {
        /// Account name
        name: String,

        /// Account type: checking, savings, credit
        #[arg(short = 't', long = "type", default_value = "checking")]
        account_type: String,

        /// Opening balance
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        balance: f64,
    },

    /// Delete an account and all of its transactions
    Delete {
        /// Account ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show transactions from this account
        #[arg(long)]
        account: Option<i64>,

        /// Only show this classification: responsible, irresponsible, neutral
        #[arg(long)]
        classification: Option<String>,
    },

    /// Record a transaction
    Add {
        /// Account ID to post to
        #[arg(short, long)]
        account: i64,

        /// Merchant name
        #[arg(short, long)]
        merchant: String,

        /// Amount (non-negative)
        amount: f64,

        /// Category: shopping, food, transport, bills, dining, entertainment,
        /// health, income
        #[arg(short, long, default_value = "shopping")]
        category: String,

        /// Classification: responsible, irresponsible, neutral
        #[arg(long, default_value = "neutral")]
        classification: String,

        /// Transaction type: debit or credit
        #[arg(short = 't', long = "type", default_value = "debit")]
        transaction_type: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Why you made this purchase
        #[arg(short, long)]
        reflection: Option<String>,
    },

    /// Change the classification of a transaction
    Classify {
        /// Transaction ID
        id: i64,

        /// New classification: responsible, irresponsible, neutral
        classification: String,
    },

    /// Delete a transaction and reverse its effect on the balance
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals
    List,

    /// Create a goal
    Add {
        /// Goal title
        title: String,

        /// Amount to save
        target: f64,

        /// Emoji shown next to the goal
        #[arg(long)]
        emoji: Option<String>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: Option<String>,
    },

    /// Put money toward a goal
    Contribute {
        /// Goal ID
        id: i64,

        /// Amount to add
        amount: f64,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show your profile
    Show,

    /// Rename your Capling
    Rename {
        /// New name (1-30 characters)
        name: String,
    },
}
