//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use spendcast_core::{BudgetLimit, EngineConfig, PatternStore, PredictionQuery};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const EXPENSES_JSON: &str = r#"[
    {"amount": 100, "category": "Food", "subject": "Team lunch", "counterparty": "Cafe", "date": "2024-04-10"},
    {"amount": 150, "category": "Food", "subject": "Dinner", "counterparty": "Bistro", "date": "2024-05-10"},
    {"amount": 200, "category": "Food", "subject": "Lunch", "counterparty": "Cafe", "date": "2024-06-02"},
    {"amount": 40, "category": "Transport", "subject": "Taxi", "counterparty": "Uber", "date": "2024-06-03"},
    {"amount": 900, "category": "Rent", "subject": "Monthly rent", "counterparty": "Landlord", "date": "2024-06-01"},
    {"amount": 25, "category": "Fun", "subject": "Movie", "counterparty": "Cinema", "date": "not a date"}
]"#;

const EXPENSES_CSV: &str = "date,amount,expenseType,subject,to\n\
2024-04-10,100,Food,Team lunch,Cafe\n\
2024-05-10,150,Food,Dinner,Bistro\n\
2024-06-02,200,Food,Lunch,Cafe\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
}

/// Temp dir holding the expense files, with a pattern store inside it
fn setup() -> (TempDir, PathBuf, PathBuf, PatternStore) {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("expenses.json");
    let csv = dir.path().join("expenses.csv");
    fs::write(&json, EXPENSES_JSON).unwrap();
    fs::write(&csv, EXPENSES_CSV).unwrap();
    let store = PatternStore::new(dir.path().join("state").join("patterns.json"));
    (dir, json, csv, store)
}

// ========== Shared Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Groceries", 20), "Groceries");
    assert_eq!(truncate("Entertainment & Leisure", 10), "Enterte...");
    assert_eq!(truncate("Café déjeuner", 8), "Café ...");
}

#[test]
fn test_parse_limits_overrides_config() {
    let mut configured = BTreeMap::new();
    configured.insert("Food".to_string(), BudgetLimit::new(300.0));
    configured.insert("Rent".to_string(), BudgetLimit::new(1000.0));

    let limits = commands::parse_limits(
        &configured,
        &["Food=450".to_string(), " Fun & Games = 50.5".to_string()],
    )
    .unwrap();

    assert_eq!(limits.len(), 3);
    assert_eq!(limits["Food"].monthly_limit, 450.0);
    assert_eq!(limits["Rent"].monthly_limit, 1000.0);
    assert_eq!(limits["Fun & Games"].monthly_limit, 50.5);
}

#[test]
fn test_parse_limits_rejects_bad_entries() {
    let empty = BTreeMap::new();
    assert!(commands::parse_limits(&empty, &["Food".to_string()]).is_err());
    assert!(commands::parse_limits(&empty, &["Food=lots".to_string()]).is_err());
    assert!(commands::parse_limits(&empty, &["=100".to_string()]).is_err());
}

#[test]
fn test_resolve_today() {
    assert_eq!(commands::resolve_today(Some("2024-06-20")).unwrap(), today());
    assert!(commands::resolve_today(Some("20/06/2024")).is_err());
    assert!(commands::resolve_today(None).is_ok());
}

#[test]
fn test_load_records_by_extension() {
    let (_dir, json, csv, _store) = setup();
    assert_eq!(commands::load_records(&json).unwrap().len(), 6);
    assert_eq!(commands::load_records(&csv).unwrap().len(), 3);
    assert!(commands::load_records(&PathBuf::from("/nonexistent/expenses.json")).is_err());
}

#[test]
fn test_load_config_with_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[budgets]\nFood = 120\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.budgets["Food"].monthly_limit, 120.0);

    fs::write(&path, "[analysis]\nshort_window = 1\n").unwrap();
    assert!(commands::load_config(Some(&path)).is_err());
}

#[test]
fn test_pattern_store_explicit_path() {
    let store = commands::pattern_store(Some(&PathBuf::from("/tmp/p.json"))).unwrap();
    assert_eq!(store.path(), PathBuf::from("/tmp/p.json").as_path());
}

// ========== Analysis Command Tests ==========

#[test]
fn test_cmd_analyze() {
    let (_dir, json, csv, _store) = setup();
    let config = EngineConfig::default();
    assert!(commands::cmd_analyze(&config, &json, false).is_ok());
    assert!(commands::cmd_analyze(&config, &csv, true).is_ok());
}

#[test]
fn test_cmd_forecast() {
    let (_dir, json, _csv, _store) = setup();
    let config = EngineConfig::default();

    assert!(commands::cmd_forecast(&config, &json, None, None, today(), false).is_ok());
    assert!(commands::cmd_forecast(&config, &json, Some("Food"), Some(7), today(), true).is_ok());
}

#[test]
fn test_cmd_forecast_unknown_category() {
    let (_dir, json, _csv, _store) = setup();
    let result = commands::cmd_forecast(
        &EngineConfig::default(),
        &json,
        Some("Yachts"),
        None,
        today(),
        false,
    );
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("No historical data for category: Yachts"));
}

#[test]
fn test_cmd_alerts() {
    let (_dir, json, _csv, _store) = setup();
    let config = EngineConfig::default();
    let limits = vec!["Food=150".to_string(), "Rent=1000".to_string()];

    assert!(commands::cmd_alerts(&config, &json, &limits, today(), false).is_ok());
    assert!(commands::cmd_alerts(&config, &json, &limits, today(), true).is_ok());
    // No budgets at all is not an error
    assert!(commands::cmd_alerts(&config, &json, &[], today(), false).is_ok());
    assert!(commands::cmd_alerts(&config, &json, &["Food:150".to_string()], today(), false).is_err());
}

#[test]
fn test_cmd_insights() {
    let (_dir, json, _csv, _store) = setup();
    let mut config = EngineConfig::default();
    config
        .budgets
        .insert("Rent".to_string(), BudgetLimit::new(1000.0));

    assert!(commands::cmd_insights(&config, &json, &[], None, today(), false).is_ok());
    assert!(commands::cmd_insights(&config, &json, &[], Some(14), today(), true).is_ok());
}

// ========== Pattern Command Tests ==========

#[test]
fn test_cmd_train_saves_snapshot() {
    let (_dir, json, _csv, store) = setup();
    let config = EngineConfig::default();

    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();

    let table = store.load().unwrap().expect("snapshot should be saved");
    assert!(table.is_trained);
    assert_eq!(table.training_size, 6);
    assert_eq!(table.person_patterns["cafe"], 150.0);
}

#[test]
fn test_cmd_train_requires_force_to_retrain() {
    let (dir, json, _csv, store) = setup();
    let config = EngineConfig::default();
    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();

    let smaller = dir.path().join("smaller.json");
    fs::write(
        &smaller,
        r#"[
            {"amount": 10, "subject": "bus", "to": "Metro", "date": "2024-01-01"},
            {"amount": 10, "subject": "bus", "to": "Metro", "date": "2024-01-02"},
            {"amount": 10, "subject": "bus", "to": "Metro", "date": "2024-01-03"},
            {"amount": 10, "subject": "bus", "to": "Metro", "date": "2024-01-04"},
            {"amount": 10, "subject": "bus", "to": "Metro", "date": "2024-01-05"}
        ]"#,
    )
    .unwrap();

    // Without --force the existing snapshot is kept
    commands::cmd_train(&config, &store, &smaller, false, today(), false).unwrap();
    assert_eq!(store.load().unwrap().unwrap().training_size, 6);

    commands::cmd_train(&config, &store, &smaller, true, today(), true).unwrap();
    assert_eq!(store.load().unwrap().unwrap().training_size, 5);
}

#[test]
fn test_cmd_train_enforces_service_minimum() {
    let (_dir, _json, csv, store) = setup();
    let config = EngineConfig::default();

    // Three records pass the engine minimum but not the CLI's stricter one
    let result = commands::cmd_train(&config, &store, &csv, false, today(), false);
    assert!(result.is_err());
    assert!(store.load().unwrap().is_none());

    let mut relaxed = EngineConfig::default();
    relaxed.predictor.service_min_training_records = 3;
    assert!(commands::cmd_train(&relaxed, &store, &csv, false, today(), false).is_ok());
}

#[test]
fn test_cmd_predict() {
    let (_dir, json, _csv, store) = setup();
    let config = EngineConfig::default();
    let query = PredictionQuery::new("lunch", "Cafe", "2024-07-01");

    // Untrained
    assert!(commands::cmd_predict(&config, &store, &query, "auto", today(), false).is_err());

    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();
    assert!(commands::cmd_predict(&config, &store, &query, "auto", today(), false).is_ok());
    assert!(commands::cmd_predict(&config, &store, &query, "ensemble", today(), true).is_ok());
    assert!(commands::cmd_predict(&config, &store, &query, "neural", today(), false).is_err());
}

#[test]
fn test_cmd_predict_records_history() {
    let (_dir, json, _csv, store) = setup();
    let config = EngineConfig::default();
    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();

    // Nothing recorded yet
    assert!(commands::cmd_history(&store, false).is_ok());
    assert!(commands::cmd_history(&store, true).is_ok());

    let query = PredictionQuery::new("lunch", "Cafe", "2024-07-01");
    commands::cmd_predict(&config, &store, &query, "auto", today(), false).unwrap();
    commands::cmd_predict(&config, &store, &query, "linear", today(), true).unwrap();
    commands::cmd_predict(&config, &store, &query, "auto", today(), false).unwrap();

    let history = store.load_history().unwrap();
    assert_eq!(history.len(), 3);
    let analytics = history.analytics().unwrap();
    assert_eq!(analytics.most_used_method, "auto_linear");

    assert!(commands::cmd_history(&store, false).is_ok());
    assert!(commands::cmd_history(&store, true).is_ok());
}

#[test]
fn test_cmd_compare() {
    let (_dir, json, _csv, store) = setup();
    let config = EngineConfig::default();
    let query = PredictionQuery::new("lunch", "Cafe", "2024-07-01");

    assert!(commands::cmd_compare(&config, &store, &query, today(), false).is_err());

    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();
    assert!(commands::cmd_compare(&config, &store, &query, today(), false).is_ok());
    assert!(commands::cmd_compare(&config, &store, &query, today(), true).is_ok());

    // Comparisons are not single predictions and stay out of the history
    assert!(store.load_history().unwrap().is_empty());
}

#[test]
fn test_cmd_status() {
    let (dir, json, _csv, store) = setup();
    let config = EngineConfig::default();
    let missing = dir.path().join("missing.toml");

    assert!(commands::cmd_status(Some(&missing), &config, &store, false).is_ok());

    commands::cmd_train(&config, &store, &json, false, today(), false).unwrap();
    assert!(commands::cmd_status(Some(&missing), &config, &store, true).is_ok());
}
