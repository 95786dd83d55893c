//! Analysis command implementations (analyze, forecast, alerts, insights)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendcast_core::{
    Alert, AlertSeverity, CategoryAnalysis, EngineConfig, ForecastResult, InsightEngine,
};

use super::{load_records, parse_limits, print_json, truncate};

pub fn cmd_analyze(config: &EngineConfig, file: &Path, json: bool) -> Result<()> {
    let records = load_records(file)?;
    let analysis = InsightEngine::from_config(config).analyze(&records);

    if json {
        return print_json(&analysis);
    }

    print_analysis(&analysis);
    Ok(())
}

pub fn cmd_forecast(
    config: &EngineConfig,
    file: &Path,
    category: Option<&str>,
    days: Option<u32>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let records = load_records(file)?;
    let engine = InsightEngine::from_config(config);
    let analysis = engine.analyze(&records);
    let horizon = days.unwrap_or(config.forecast.horizon_days);

    let forecasts: Vec<ForecastResult> = match category {
        Some(category) => vec![engine
            .forecast(category, &analysis, horizon, today)
            .with_context(|| format!("Cannot forecast '{}'", category))?],
        None => engine
            .forecast_all(&analysis, horizon, today)
            .into_values()
            .collect(),
    };

    if json {
        return match category {
            Some(_) => print_json(&forecasts[0]),
            None => print_json(&forecasts),
        };
    }

    println!();
    println!("🔮 Forecast for the next {} days (as of {})", horizon, today);
    print_forecasts(&forecasts);
    Ok(())
}

pub fn cmd_alerts(
    config: &EngineConfig,
    file: &Path,
    limit_overrides: &[String],
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let limits = parse_limits(&config.budgets, limit_overrides)?;
    let records = load_records(file)?;
    let engine = InsightEngine::from_config(config);
    let analysis = engine.analyze(&records);
    let alerts = engine.alerts(&analysis, &limits, today);

    if json {
        return print_json(&alerts);
    }

    if limits.is_empty() {
        println!("No budgets configured. Add [budgets] to the config or pass --limit CATEGORY=AMOUNT.");
        return Ok(());
    }

    println!();
    println!("🚨 Budget alerts for {} ({} budgets)", today.format("%B %Y"), limits.len());
    print_alerts(&alerts);
    Ok(())
}

pub fn cmd_insights(
    config: &EngineConfig,
    file: &Path,
    limit_overrides: &[String],
    days: Option<u32>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let limits = parse_limits(&config.budgets, limit_overrides)?;
    let records = load_records(file)?;
    let horizon = days.unwrap_or(config.forecast.horizon_days);
    let insights = InsightEngine::from_config(config).build(&records, &limits, horizon, today);

    if json {
        return print_json(&insights);
    }

    print_analysis(&insights.analysis);

    println!();
    println!("🔮 Forecast for the next {} days", horizon);
    let forecasts: Vec<ForecastResult> = insights.predictions.into_values().collect();
    print_forecasts(&forecasts);

    if !limits.is_empty() {
        println!();
        println!("🚨 Budget alerts");
        print_alerts(&insights.alerts);
    }

    println!();
    println!(
        "Summary: {} categories, {} alerts ({} high priority)",
        insights.summary.total_categories,
        insights.summary.total_alerts,
        insights.summary.high_priority_alerts
    );
    Ok(())
}

fn print_analysis(analysis: &CategoryAnalysis) {
    let stats = &analysis.parsing_stats;

    println!();
    println!("📊 Category Analysis");
    println!(
        "   Parsed {} expenses ({} skipped, {} success)",
        stats.successful,
        stats.failed,
        stats.success_rate_label()
    );
    if stats.invalid_amounts > 0 {
        println!(
            "   ⚠️  {} expenses had missing or invalid amounts (counted as 0)",
            stats.invalid_amounts
        );
    }
    println!();

    if analysis.is_empty() {
        println!("   No expenses with usable dates.");
        return;
    }

    println!(
        "   {:<20} {:>10} {:>6} {:>10} {:>7} {:<11} {:>8}",
        "Category", "Total", "Count", "Monthly", "Months", "Trend", "Growth"
    );
    println!("   {}", "─".repeat(80));
    for (category, s) in &analysis.categories {
        println!(
            "   {:<20} {:>10.2} {:>6} {:>10.2} {:>7} {:<11} {:>7.1}%",
            truncate(category, 20),
            s.total_spent,
            s.transaction_count,
            s.monthly_average,
            s.months_with_data,
            s.trend.as_str(),
            s.growth_rate
        );
    }
}

fn print_forecasts(forecasts: &[ForecastResult]) {
    println!();
    if forecasts.is_empty() {
        println!("   Nothing to forecast.");
        return;
    }

    println!(
        "   {:<20} {:>10} {:>8} {:>10} {:>8} {:>8}",
        "Category", "Predicted", "Daily", "Trend adj", "Season", "Conf"
    );
    println!("   {}", "─".repeat(70));
    for f in forecasts {
        println!(
            "   {:<20} {:>10.2} {:>8.2} {:>10} {:>8} {:>7.0}%",
            truncate(&f.category, 20),
            f.predicted_amount,
            f.daily_average,
            f.prediction_factors.trend_adjustment,
            f.prediction_factors.seasonality_adjustment,
            f.confidence * 100.0
        );
    }
}

fn print_alerts(alerts: &[Alert]) {
    println!();
    if alerts.is_empty() {
        println!("   ✅ All budgets on track.");
        return;
    }

    for alert in alerts {
        let icon = match alert.severity {
            AlertSeverity::High => "🔴",
            AlertSeverity::Medium => "🟠",
            AlertSeverity::Low => "🟡",
        };
        println!("   {} [{}] {}", icon, alert.alert_type, alert.message);
        println!(
            "      Spent {:.2} of {:.2} ({:.1}%), projected {:.2} ({:.1}%) by month end",
            alert.current_spending,
            alert.budget_limit,
            alert.percentage,
            alert.predicted_month_end,
            alert.predicted_percentage
        );
    }
}
