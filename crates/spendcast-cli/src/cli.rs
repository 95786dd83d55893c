//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendcast - See where your spending is heading
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "Expense analytics, forecasts and budget alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/spendcast/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Pattern snapshot file (defaults to ~/.local/share/spendcast/patterns.json)
    #[arg(long, global = true)]
    pub patterns: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-category spending statistics
    Analyze {
        /// Expense file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forecast spending per category
    Forecast {
        /// Expense file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Only forecast this category
        #[arg(short, long)]
        category: Option<String>,

        /// Forecast horizon in days (defaults to the configured horizon)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check this month's spending against budgets
    Alerts {
        /// Expense file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Budget override, repeatable (e.g. --limit Food=400)
        #[arg(short, long = "limit", value_name = "CATEGORY=AMOUNT")]
        limits: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Analysis, forecasts and alerts in one report
    Insights {
        /// Expense file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Budget override, repeatable (e.g. --limit Food=400)
        #[arg(short, long = "limit", value_name = "CATEGORY=AMOUNT")]
        limits: Vec<String>,

        /// Forecast horizon in days (defaults to the configured horizon)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Learn spending patterns for point predictions
    Train {
        /// Expense file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Retrain even if patterns already exist
        #[arg(long)]
        force: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Predict the amount of a single expense
    Predict {
        /// What the expense is for
        #[arg(short, long, default_value = "")]
        subject: String,

        /// Who gets paid
        #[arg(short, long, default_value = "")]
        to: String,

        /// Expense date (defaults to the current month)
        #[arg(long, default_value = "")]
        date: String,

        /// Method label: auto, linear, polynomial, time_series, ensemble
        #[arg(short, long, default_value = "auto")]
        method: String,

        /// Run every method and compare their predictions
        #[arg(long, conflicts_with = "method")]
        compare: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Summarize past predictions
    History {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and pattern snapshot status
    Status {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
