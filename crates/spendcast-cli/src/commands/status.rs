//! Status command implementation

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use spendcast_core::config::default_config_path;
use spendcast_core::{EngineConfig, PatternStore, PredictorStatus};

use super::{load_predictor, print_json};

#[derive(Serialize)]
struct StatusReport {
    config_source: String,
    horizon_days: u32,
    budgets: usize,
    patterns_path: String,
    patterns: PredictorStatus,
}

/// Where the active config came from
fn config_source(explicit: Option<&Path>) -> String {
    explicit
        .map(Path::to_path_buf)
        .filter(|path| path.exists())
        .or_else(|| default_config_path().filter(|path| path.exists()))
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string())
}

pub fn cmd_status(
    config_path: Option<&Path>,
    config: &EngineConfig,
    store: &PatternStore,
    json: bool,
) -> Result<()> {
    let predictor = load_predictor(config, store)?;
    let report = StatusReport {
        config_source: config_source(config_path),
        horizon_days: config.forecast.horizon_days,
        budgets: config.budgets.len(),
        patterns_path: store.path().display().to_string(),
        patterns: predictor.status()?,
    };

    if json {
        return print_json(&report);
    }

    println!();
    println!("📊 Spendcast Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Config: {}", report.config_source);
    println!("   Forecast horizon: {} days", report.horizon_days);
    println!(
        "   Alert thresholds: warning {}%, limit {}%",
        config.alerts.warning_percent, config.alerts.limit_percent
    );
    println!("   Budgets: {}", report.budgets);
    for (category, limit) in &config.budgets {
        println!("     - {}: {:.2}/month", category, limit.monthly_limit);
    }

    println!();
    println!("   Patterns: {}", report.patterns_path);
    let patterns = &report.patterns;
    if patterns.is_trained {
        let when = patterns
            .trained_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("   🧠 Trained on {} expenses ({})", patterns.training_size, when);
        println!(
            "      {} categories, {} counterparties, {} months",
            patterns.categories, patterns.persons, patterns.monthly
        );
    } else {
        println!("   ⚠️  Not trained (run: spendcast train --file <expenses>)");
    }

    println!();
    Ok(())
}
