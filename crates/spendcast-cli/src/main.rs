//! Spendcast CLI - Expense analytics and forecasting
//!
//! Usage:
//!   spendcast analyze --file expenses.json      Per-category statistics
//!   spendcast forecast --file expenses.csv      Forecast each category
//!   spendcast alerts --file F --limit Food=400  Budget alerts
//!   spendcast train --file expenses.json        Learn prediction patterns
//!   spendcast predict --subject lunch --to Cafe Point prediction
//!   spendcast predict -s lunch --compare        Compare every method
//!   spendcast history                           Past prediction summary

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use spendcast_core::PredictionQuery;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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

    let config = commands::load_config(cli.config.as_deref())?;
    let store = commands::pattern_store(cli.patterns.as_deref())?;
    let today = commands::resolve_today(cli.as_of.as_deref())?;

    match cli.command {
        Commands::Analyze { file, json } => commands::cmd_analyze(&config, &file, json),
        Commands::Forecast {
            file,
            category,
            days,
            json,
        } => commands::cmd_forecast(&config, &file, category.as_deref(), days, today, json),
        Commands::Alerts { file, limits, json } => {
            commands::cmd_alerts(&config, &file, &limits, today, json)
        }
        Commands::Insights {
            file,
            limits,
            days,
            json,
        } => commands::cmd_insights(&config, &file, &limits, days, today, json),
        Commands::Train { file, force, json } => {
            commands::cmd_train(&config, &store, &file, force, today, json)
        }
        Commands::Predict {
            subject,
            to,
            date,
            method,
            compare,
            json,
        } => {
            let query = PredictionQuery::new(subject, to, date);
            if compare {
                commands::cmd_compare(&config, &store, &query, today, json)
            } else {
                commands::cmd_predict(&config, &store, &query, &method, today, json)
            }
        }
        Commands::History { json } => commands::cmd_history(&store, json),
        Commands::Status { json } => {
            commands::cmd_status(cli.config.as_deref(), &config, &store, json)
        }
    }
}
