//! SmartFinance CLI - AI savings insights
//!
//! Usage:
//!   smartfinance serve --port 5000     Start web server
//!   smartfinance transactions          List transactions
//!   smartfinance categories            Show category breakdown
//!   smartfinance prompt                Print the provider prompt
//!   smartfinance insights              Request savings insights

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging
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

    let config = cli.config.as_deref();
    let transactions = cli.transactions.as_deref();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            commands::cmd_serve(
                config,
                transactions,
                &host,
                commands::resolve_port(port),
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Transactions => commands::cmd_transactions(transactions),
        Commands::Categories => commands::cmd_categories(transactions),
        Commands::Prompt => commands::cmd_prompt(config, transactions),
        Commands::Insights { html, json } => {
            let format = if json {
                commands::InsightFormat::Json
            } else if html {
                commands::InsightFormat::Html
            } else {
                commands::InsightFormat::Text
            };
            commands::cmd_insights(config, transactions, format).await
        }
    }
}
