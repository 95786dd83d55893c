//! Pattern predictor command implementations (train, predict, history)
//!
//! The learned table lives in the pattern snapshot file between runs: `train`
//! writes it, `predict` and `status` read it. Each single prediction is
//! appended to the history file beside the snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendcast_core::{
    predictor::validate_training_set, EngineConfig, PatternPredictor, PatternStore,
    PredictionMethod, PredictionQuery,
};

use super::{load_records, print_json, truncate};

/// Predictor restored from the snapshot, or untrained if there is none
pub fn load_predictor(config: &EngineConfig, store: &PatternStore) -> Result<PatternPredictor> {
    let predictor = PatternPredictor::with_config(config.predictor.clone());
    if let Some(table) = store.load().context("Failed to load pattern snapshot")? {
        predictor.replace(table)?;
    }
    Ok(predictor)
}

pub fn cmd_train(
    config: &EngineConfig,
    store: &PatternStore,
    file: &Path,
    force: bool,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let predictor = load_predictor(config, store)?;
    if predictor.is_trained() && !force {
        println!("Patterns already trained. Use --force to retrain.");
        return Ok(());
    }

    let records = load_records(file)?;
    validate_training_set(&records, config.predictor.service_min_training_records)
        .context("Training data rejected")?;

    let summary = predictor.train_at(&records, today)?;
    store
        .save(&*predictor.snapshot()?)
        .context("Failed to save pattern snapshot")?;

    if json {
        return print_json(&summary);
    }

    println!("🧠 Trained on {} expenses", summary.total_expenses);
    println!("   Average amount:  {:.2}", summary.average_amount);
    println!("   Categories:      {}", summary.categories_found);
    println!("   Counterparties:  {}", summary.counterparties_found);
    println!("   Months:          {}", summary.months_found);
    println!("   Saved to {}", store.path().display());
    Ok(())
}

pub fn cmd_predict(
    config: &EngineConfig,
    store: &PatternStore,
    query: &PredictionQuery,
    method: &str,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let method: PredictionMethod = method.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let predictor = load_predictor(config, store)?;

    let estimate = predictor
        .predict_at(query, method, today)
        .context("Run `spendcast train --file <expenses>` first")?;

    let mut history = store.load_history()?;
    history.record(query, &estimate);
    store
        .save_history(&history)
        .context("Failed to save prediction history")?;

    if json {
        return print_json(&estimate);
    }

    let factors = &estimate.factors;
    println!(
        "💡 Predicted amount: {:.2} (confidence {:.0}%)",
        estimate.predicted_amount,
        estimate.confidence * 100.0
    );
    println!("   Method:        {}", estimate.method_used);
    println!("   Category:      {} (avg {:.2})", factors.category, factors.category_avg);
    println!("   Counterparty:  avg {:.2}", factors.person_avg);
    println!("   Month:         avg {:.2}", factors.month_avg);

    let advice = &estimate.advice;
    println!(
        "   Spending:      {} ({})",
        advice.spending_level, advice.expense_category
    );
    for tip in &advice.recommendations {
        println!("   💬 {}", tip);
    }
    Ok(())
}

pub fn cmd_compare(
    config: &EngineConfig,
    store: &PatternStore,
    query: &PredictionQuery,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let predictor = load_predictor(config, store)?;
    let comparison = predictor
        .compare_at(query, today)
        .context("Run `spendcast train --file <expenses>` first")?;

    if json {
        return print_json(&comparison);
    }

    println!();
    println!("⚖️  Model comparison");
    println!("   {:<14} {:>10} {:>6}", "Method", "Predicted", "Conf");
    println!("   {}", "─".repeat(32));
    for (method, estimate) in &comparison.predictions {
        println!(
            "   {:<14} {:>10.2} {:>5.0}%",
            method,
            estimate.predicted_amount,
            estimate.confidence * 100.0
        );
    }

    let stats = &comparison.statistics;
    let rec = &comparison.recommendation;
    println!();
    println!(
        "   Range {:.2} - {:.2}, mean {:.2}, std {:.2}",
        stats.min_prediction, stats.max_prediction, stats.mean_prediction, stats.std_prediction
    );
    println!(
        "   Agreement: {} ({})",
        rec.confidence_level, rec.recommendation
    );
    println!(
        "   Recommended: {} → {:.2}",
        rec.recommended_model, rec.recommended_amount
    );
    Ok(())
}

pub fn cmd_history(store: &PatternStore, json: bool) -> Result<()> {
    let history = store.load_history()?;
    let Some(analytics) = history.analytics() else {
        if json {
            return print_json(&serde_json::json!({ "message": "No prediction history available" }));
        }
        println!("No prediction history available.");
        return Ok(());
    };

    if json {
        return print_json(&analytics);
    }

    println!();
    println!("📜 Prediction history");
    println!("   Predictions:   {}", analytics.total_predictions);
    println!("   Average:       {:.2}", analytics.average_predicted_amount);
    println!(
        "   Range:         {:.2} - {:.2}",
        analytics.prediction_range.min, analytics.prediction_range.max
    );
    println!("   Most used:     {}", analytics.most_used_method);
    println!();
    for entry in &analytics.recent_predictions {
        println!(
            "   {}  {:>10.2}  {:<20} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.prediction,
            entry.method,
            truncate(&entry.query.subject, 30)
        );
    }
    Ok(())
}
