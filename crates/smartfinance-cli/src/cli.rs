//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SmartFinance - AI savings insights for your transactions
#[derive(Parser)]
#[command(name = "smartfinance")]
#[command(about = "Personal finance dashboard backend with AI savings insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Insight settings file (TOML)
    ///
    /// Defaults to ~/.local/share/smartfinance/config/insights.toml when it
    /// exists, otherwise the built-in settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Transactions file (JSON array or CSV with id,date,description,amount,category)
    ///
    /// Replaces the built-in sample transactions.
    #[arg(short, long, global = true)]
    pub transactions: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on (defaults to $PORT, then 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of static frontend files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// List transactions
    Transactions,

    /// Show the category breakdown
    Categories,

    /// Print the prompt that would be sent to the provider
    Prompt,

    /// Request savings insights from the provider
    Insights {
        /// Render **emphasis** as HTML
        #[arg(long, conflicts_with = "json")]
        html: bool,

        /// Print the raw response body as JSON
        #[arg(long)]
        json: bool,
    },
}
