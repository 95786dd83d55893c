//! Spendcast Core Library
//!
//! Expense analytics and forecasting engine:
//! - Date normalization for heterogeneous expense dates
//! - Per-category monthly aggregation with parsing statistics
//! - Trend, growth rate and seasonality inference
//! - Confidence-scored category spending forecasts
//! - Budget threshold alerts
//! - Pattern-learning point predictor with file-backed snapshots
//! - Spending advice, model comparison and prediction history

pub mod advice;
pub mod aggregate;
pub mod alerts;
pub mod confidence;
pub mod config;
pub mod dates;
pub mod error;
pub mod forecast;
pub mod history;
pub mod import;
pub mod insights;
pub mod models;
pub mod predictor;
pub mod store;
pub mod trend;

pub use advice::{categorize_expense, SpendingAdvice, SpendingLevel};
pub use aggregate::{aggregate, CategoryAggregator};
pub use alerts::{evaluate_alerts, Alert, AlertSeverity, AlertType, BudgetAlertEvaluator, BudgetLimit};
pub use confidence::ConfidenceBreakdown;
pub use config::{AlertConfig, AnalysisConfig, EngineConfig, ForecastConfig, PredictorConfig};
pub use error::{Error, Result};
pub use forecast::{forecast, CategoryForecaster, ForecastResult, PredictionFactors};
pub use history::{HistoryAnalytics, HistoryEntry, PredictionHistory};
pub use insights::{CategoryInsights, InsightEngine, InsightSummary};
pub use models::{
    CategoryAnalysis, CategoryStats, ExpenseRecord, MonthKey, MonthlySummary, ParsingStats, Trend,
};
pub use predictor::{
    classify_subject, validate_training_set, AgreementLevel, ComparisonRecommendation,
    ComparisonStatistics, ModelComparison, PatternPredictor, PatternTable, PointEstimate,
    PredictionFactorsUsed, PredictionMethod, PredictionQuery, PredictorStatus, TrainingSummary,
};
pub use store::PatternStore;
pub use trend::TrendAnalyzer;
