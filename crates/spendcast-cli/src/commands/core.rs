//! Shared utilities for command implementations
//!
//! This module contains:
//! - `load_config` - Resolve and load the engine config
//! - `pattern_store` - Resolve the pattern snapshot file
//! - `load_records` - Read an expense file
//! - `parse_limits` - Parse `CATEGORY=AMOUNT` budget overrides
//! - `resolve_today` - Resolve the evaluation date

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use spendcast_core::{import, BudgetLimit, EngineConfig, ExpenseRecord, PatternStore};

/// Load config from an explicit path, the data dir override, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load config")
}

/// Pattern store at an explicit path or the default data dir location
pub fn pattern_store(path: Option<&Path>) -> Result<PatternStore> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => PatternStore::default_path()
            .context("Could not determine data directory; pass --patterns")?,
    };
    Ok(PatternStore::new(path))
}

/// Read an expense batch (CSV by extension, otherwise JSON)
pub fn load_records(file: &Path) -> Result<Vec<ExpenseRecord>> {
    let records = import::read_path(file)
        .with_context(|| format!("Failed to read expenses from {}", file.display()))?;
    tracing::debug!(count = records.len(), "Loaded expense records");
    Ok(records)
}

/// Configured budgets with `CATEGORY=AMOUNT` overrides applied on top
pub fn parse_limits(
    configured: &BTreeMap<String, BudgetLimit>,
    overrides: &[String],
) -> Result<BTreeMap<String, BudgetLimit>> {
    let mut limits = configured.clone();
    for entry in overrides {
        let (category, amount) = entry
            .rsplit_once('=')
            .with_context(|| format!("Invalid budget '{}' (use CATEGORY=AMOUNT)", entry))?;
        let category = category.trim();
        if category.is_empty() {
            anyhow::bail!("Invalid budget '{}': category is empty", entry);
        }
        let amount: f64 = amount
            .trim()
            .parse()
            .with_context(|| format!("Invalid budget amount in '{}'", entry))?;
        limits.insert(category.to_string(), BudgetLimit::new(amount));
    }
    Ok(limits)
}

/// Parse `--as-of`, defaulting to the local date
pub fn resolve_today(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(date) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .context("Invalid --as-of date format (use YYYY-MM-DD)"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
