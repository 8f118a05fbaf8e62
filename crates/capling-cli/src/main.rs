//! Capling CLI
//!
//! Command-line interface for the Capling spending companion.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;


use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                config,
            )
            .await
        }
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_accounts_list(&db, user),
                Some(AccountsAction::Add {
                    name,
                    account_type,
                    balance,
                }) => commands::cmd_accounts_add(&db, user, &name, &account_type, balance),
                Some(AccountsAction::Delete { id }) => commands::cmd_accounts_delete(&db, user, id),
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, user, 20, None, None),
                Some(TransactionsAction::List {
                    limit,
                    account,
                    classification,
                }) => commands::cmd_transactions_list(
                    &db,
                    user,
                    limit,
                    account,
                    classification.as_deref(),
                ),
                Some(TransactionsAction::Add {
                    account,
                    merchant,
                    amount,
                    category,
                    classification,
                    transaction_type,
                    date,
                    reflection,
                }) => commands::cmd_transactions_add(
                    &db,
                    user,
                    commands::TransactionInput {
                        account_id: account,
                        merchant: &merchant,
                        amount,
                        category: &category,
                        classification: &classification,
                        transaction_type: &transaction_type,
                        date: date.as_deref(),
                        reflection: reflection.as_deref(),
                    },
                ),
                Some(TransactionsAction::Classify { id, classification }) => {
                    commands::cmd_transactions_classify(&db, user, id, &classification)
                }
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, user, id)
                }
            }
        }
        Commands::Goals { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(GoalsAction::List) => commands::cmd_goals_list(&db, user),
                Some(GoalsAction::Add {
                    title,
                    target,
                    emoji,
                    by,
                }) => commands::cmd_goals_add(
                    &db,
                    user,
                    &title,
                    target,
                    emoji.as_deref(),
                    by.as_deref(),
                ),
                Some(GoalsAction::Contribute { id, amount }) => {
                    commands::cmd_goals_contribute(&db, user, id, amount)
                }
                Some(GoalsAction::Delete { id }) => commands::cmd_goals_delete(&db, user, id),
            }
        }
        Commands::Profile { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(ProfileAction::Show) => commands::cmd_profile_show(&db, user),
                Some(ProfileAction::Rename { name }) => {
                    commands::cmd_profile_rename(&db, user, &name)
                }
            }
        }
        Commands::Status { json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_status(&db, user, config, json).await
        }
        Commands::RemoteStatus { user_id, json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let user_id = user_id.as_deref().unwrap_or(user);
            commands::cmd_remote_status(user_id, config, json).await
        }
        Commands::Config => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_config(&config, cli.config.as_deref())
        }
    }
}
