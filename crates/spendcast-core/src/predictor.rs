//! Pattern-based point predictor
//!
//! Learns three lookup tables from training records (mean amount per
//! keyword-derived category, per counterparty and per calendar month) and
//! predicts a single expense as the mean of whichever lookups hit.
//!
//! The learned [`PatternTable`] is immutable once built. Retraining builds a
//! fresh table and swaps it in under a short write lock, so a concurrent
//! reader always predicts from either the old table or the new one.
//!
//! The method labels (`linear`, `polynomial`, ...) select nothing: every
//! label runs the same heuristic and is echoed back in `method_used`.
//! [`PatternPredictor::compare_at`] still runs each one and reports how far
//! they agree.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::advice::SpendingAdvice;
use crate::config::PredictorConfig;
use crate::dates;
use crate::error::{Error, Result};
use crate::models::{round_to, ExpenseRecord};
use crate::trend::mean;

/// Subject keywords per pattern category, checked top to bottom
pub const KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "food",
        &["lunch", "dinner", "breakfast", "food", "meal", "restaurant"],
    ),
    ("transport", &["taxi", "bus", "uber", "ola", "transport", "fuel"]),
    ("entertainment", &["movie", "party", "entertainment", "fun"]),
    ("shopping", &["shopping", "clothes", "buy"]),
    ("bills", &["bill", "electricity", "rent"]),
];

/// Pattern category for subjects that match no keyword
pub const UNMATCHED_CATEGORY: &str = "other";

/// Derive a pattern category from free-text subject, first match wins
pub fn classify_subject(subject: &str) -> &'static str {
    let subject = subject.to_lowercase();
    KEYWORD_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| subject.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(UNMATCHED_CATEGORY)
}

/// Learned lookup tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternTable {
    pub category_patterns: BTreeMap<String, f64>,
    /// Keyed by lower-cased counterparty
    pub person_patterns: BTreeMap<String, f64>,
    /// Keyed by calendar month (1-12)
    pub monthly_patterns: BTreeMap<u32, f64>,
    pub is_trained: bool,
    #[serde(default)]
    pub training_size: usize,
    /// Mean of all positive training amounts
    #[serde(default)]
    pub training_mean: Option<f64>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

impl PatternTable {
    /// Build a table from training records
    ///
    /// Records without a positive amount are ignored. A record whose date
    /// does not parse is filed under `today`'s month.
    pub fn learn(records: &[ExpenseRecord], today: NaiveDate) -> Self {
        let mut categories: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut persons: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut months: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        let mut amounts = Vec::new();

        for record in records {
            let amount = match record.amount {
                Some(a) if a.is_finite() && a > 0.0 => a,
                _ => continue,
            };
            amounts.push(amount);

            let month = dates::parse(&record.date)
                .map(|d| d.month())
                .unwrap_or_else(|| today.month());
            months.entry(month).or_default().push(amount);

            categories
                .entry(classify_subject(&record.subject).to_string())
                .or_default()
                .push(amount);

            let person = record.counterparty.trim().to_lowercase();
            if !person.is_empty() {
                persons.entry(person).or_default().push(amount);
            }
        }

        Self {
            category_patterns: means(categories),
            person_patterns: means(persons),
            monthly_patterns: means(months),
            is_trained: true,
            training_size: records.len(),
            training_mean: if amounts.is_empty() {
                None
            } else {
                Some(mean(&amounts))
            },
            trained_at: Some(Utc::now()),
        }
    }

    /// Serialize for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a table written by [`PatternTable::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        let table: PatternTable = serde_json::from_str(json)?;
        if let Some(month) = table
            .monthly_patterns
            .keys()
            .find(|m| !(1..=12).contains(*m))
        {
            return Err(Error::InvalidData(format!(
                "Invalid month in pattern table: {}",
                month
            )));
        }
        Ok(table)
    }
}

fn means<K: Ord>(groups: BTreeMap<K, Vec<f64>>) -> BTreeMap<K, f64> {
    groups
        .into_iter()
        .map(|(key, amounts)| (key, mean(&amounts)))
        .collect()
}

/// Prediction method label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    #[default]
    Auto,
    Linear,
    Polynomial,
    TimeSeries,
    Ensemble,
}

impl PredictionMethod {
    /// Methods run by a comparison, in report order
    pub const COMPARED: [PredictionMethod; 4] = [
        Self::Linear,
        Self::Polynomial,
        Self::TimeSeries,
        Self::Ensemble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Linear => "linear",
            Self::Polynomial => "polynomial",
            Self::TimeSeries => "time_series",
            Self::Ensemble => "ensemble",
        }
    }
}

impl std::str::FromStr for PredictionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "linear" => Ok(Self::Linear),
            "polynomial" => Ok(Self::Polynomial),
            "time_series" | "timeseries" => Ok(Self::TimeSeries),
            "ensemble" => Ok(Self::Ensemble),
            _ => Err(format!("Unknown prediction method: {}", s)),
        }
    }
}

impl std::fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense to predict
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionQuery {
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "to")]
    pub counterparty: String,
    #[serde(default)]
    pub date: String,
}

impl PredictionQuery {
    pub fn new(
        subject: impl Into<String>,
        counterparty: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            counterparty: counterparty.into(),
            date: date.into(),
        }
    }
}

/// Averages looked up for a prediction (0 when the key was not learned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactorsUsed {
    pub category: String,
    pub category_avg: f64,
    pub person_avg: f64,
    pub month_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    pub predicted_amount: f64,
    pub method_used: String,
    pub confidence: f64,
    pub factors: PredictionFactorsUsed,
    #[serde(flatten)]
    pub advice: SpendingAdvice,
}

/// Spread of the predictions in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStatistics {
    pub min_prediction: f64,
    pub max_prediction: f64,
    pub mean_prediction: f64,
    /// Population standard deviation
    pub std_prediction: f64,
    /// max - min
    pub spread: f64,
    pub models_count: usize,
}

/// How far the compared methods agree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementLevel {
    Low,
    Medium,
    High,
}

impl AgreementLevel {
    /// Spread relative to the mean: above 0.5 is low, above 0.2 medium
    pub fn from_spread(spread: f64, mean: f64) -> Self {
        if mean <= 0.0 {
            return Self::Low;
        }
        let ratio = spread / mean;
        if ratio > 0.5 {
            Self::Low
        } else if ratio > 0.2 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    fn advice(&self) -> &'static str {
        match self {
            Self::Low => "High variance between models. Consider gathering more data.",
            Self::Medium => "Moderate agreement between models. Prediction is reasonably reliable.",
            Self::High => "Strong agreement between models. Prediction is highly reliable.",
        }
    }
}

impl std::fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecommendation {
    pub confidence_level: AgreementLevel,
    pub recommendation: String,
    /// Method with the highest confidence, first one on ties
    pub recommended_model: PredictionMethod,
    pub recommended_amount: f64,
}

/// Predictions from every method for the same query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub query: PredictionQuery,
    pub timestamp: DateTime<Utc>,
    /// Keyed by method name
    pub predictions: BTreeMap<String, PointEstimate>,
    pub statistics: ComparisonStatistics,
    pub recommendation: ComparisonRecommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub total_expenses: usize,
    pub average_amount: f64,
    pub categories_found: usize,
    pub counterparties_found: usize,
    pub months_found: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorStatus {
    pub is_trained: bool,
    pub training_size: usize,
    pub trained_at: Option<DateTime<Utc>>,
    pub categories: usize,
    pub persons: usize,
    pub monthly: usize,
}

/// Point predictor over a swappable learned table
#[derive(Debug)]
pub struct PatternPredictor {
    table: RwLock<Arc<PatternTable>>,
    config: PredictorConfig,
}

impl Default for PatternPredictor {
    fn default() -> Self {
        Self::with_config(PredictorConfig::default())
    }
}

impl PatternPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self {
            table: RwLock::new(Arc::new(PatternTable::default())),
            config,
        }
    }

    /// Train on records, filing undated records under the current month
    pub fn train(&self, records: &[ExpenseRecord]) -> Result<TrainingSummary> {
        self.train_at(records, Local::now().date_naive())
    }

    /// Train on records, filing undated records under `today`'s month
    ///
    /// Fewer than `min_training_records` records is a validation error and
    /// leaves the current table in place.
    pub fn train_at(&self, records: &[ExpenseRecord], today: NaiveDate) -> Result<TrainingSummary> {
        if records.len() < self.config.min_training_records {
            return Err(Error::Validation(format!(
                "Need at least {} expenses for training, got {}",
                self.config.min_training_records,
                records.len()
            )));
        }

        let table = PatternTable::learn(records, today);
        let summary = TrainingSummary {
            total_expenses: records.len(),
            average_amount: round_to(table.training_mean.unwrap_or(0.0), 2),
            categories_found: table.category_patterns.len(),
            counterparties_found: table.person_patterns.len(),
            months_found: table.monthly_patterns.len(),
        };

        self.replace(table)?;
        info!(
            records = summary.total_expenses,
            categories = summary.categories_found,
            counterparties = summary.counterparties_found,
            "Pattern tables trained"
        );
        Ok(summary)
    }

    /// Predict one expense, using the current month for undated queries
    pub fn predict(&self, query: &PredictionQuery, method: PredictionMethod) -> Result<PointEstimate> {
        self.predict_at(query, method, Local::now().date_naive())
    }

    pub fn predict_at(
        &self,
        query: &PredictionQuery,
        method: PredictionMethod,
        today: NaiveDate,
    ) -> Result<PointEstimate> {
        let table = self.snapshot()?;
        if !table.is_trained {
            return Err(Error::NotTrained);
        }

        let category = classify_subject(&query.subject);
        let month = dates::parse(&query.date)
            .map(|d| d.month())
            .unwrap_or_else(|| today.month());
        let person = query.counterparty.trim().to_lowercase();

        let category_avg = table.category_patterns.get(category).copied().unwrap_or(0.0);
        let person_avg = table.person_patterns.get(&person).copied().unwrap_or(0.0);
        let month_avg = table.monthly_patterns.get(&month).copied().unwrap_or(0.0);

        let signals: Vec<f64> = [category_avg, person_avg, month_avg]
            .into_iter()
            .filter(|v| *v > 0.0)
            .collect();

        let (predicted, confidence) = if signals.is_empty() {
            let fallback = table
                .training_mean
                .unwrap_or(self.config.default_prediction);
            (fallback, 0.5)
        } else {
            let confidence = (0.6 + 0.1 * signals.len() as f64).min(0.95);
            (mean(&signals), confidence)
        };

        debug!(
            category,
            signals = signals.len(),
            predicted = predicted,
            "Point prediction"
        );

        Ok(PointEstimate {
            predicted_amount: round_to(predicted, 2),
            method_used: format!("{}_linear", method.as_str()),
            confidence: round_to(confidence, 2),
            factors: PredictionFactorsUsed {
                category: category.to_string(),
                category_avg,
                person_avg,
                month_avg,
            },
            advice: SpendingAdvice::for_prediction(&query.subject, round_to(predicted, 2)),
        })
    }

    /// Run every method on one query and report their agreement
    pub fn compare(&self, query: &PredictionQuery) -> Result<ModelComparison> {
        self.compare_at(query, Local::now().date_naive())
    }

    pub fn compare_at(&self, query: &PredictionQuery, today: NaiveDate) -> Result<ModelComparison> {
        let mut runs = Vec::with_capacity(PredictionMethod::COMPARED.len());
        for method in PredictionMethod::COMPARED {
            runs.push((method, self.predict_at(query, method, today)?));
        }

        let amounts: Vec<f64> = runs.iter().map(|(_, e)| e.predicted_amount).collect();
        let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = mean(&amounts);
        let std = (amounts.iter().map(|a| (a - avg).powi(2)).sum::<f64>()
            / amounts.len() as f64)
            .sqrt();
        let spread = max - min;

        let (best_method, best) = runs
            .iter()
            .fold(None, |best: Option<&(PredictionMethod, PointEstimate)>, run| {
                match best {
                    Some(b) if b.1.confidence >= run.1.confidence => Some(b),
                    _ => Some(run),
                }
            })
            .map(|(m, e)| (*m, e.predicted_amount))
            .unwrap_or((PredictionMethod::Linear, avg));

        let level = AgreementLevel::from_spread(spread, avg);
        debug!(models = amounts.len(), spread = spread, level = %level, "Model comparison");

        Ok(ModelComparison {
            query: query.clone(),
            timestamp: Utc::now(),
            predictions: runs
                .into_iter()
                .map(|(method, estimate)| (method.as_str().to_string(), estimate))
                .collect(),
            statistics: ComparisonStatistics {
                min_prediction: min,
                max_prediction: max,
                mean_prediction: round_to(avg, 2),
                std_prediction: round_to(std, 2),
                spread: round_to(spread, 2),
                models_count: amounts.len(),
            },
            recommendation: ComparisonRecommendation {
                confidence_level: level,
                recommendation: level.advice().to_string(),
                recommended_model: best_method,
                recommended_amount: best,
            },
        })
    }

    /// Current table; stays consistent even if a retrain swaps it later
    pub fn snapshot(&self) -> Result<Arc<PatternTable>> {
        let table = self
            .table
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire pattern table lock".into()))?;
        Ok(Arc::clone(&table))
    }

    /// Swap in a complete table
    pub fn replace(&self, table: PatternTable) -> Result<()> {
        let next = Arc::new(table);
        let mut current = self
            .table
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire pattern table lock".into()))?;
        *current = next;
        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().map(|t| t.is_trained).unwrap_or(false)
    }

    /// Export the learned state as JSON
    pub fn export(&self) -> Result<String> {
        self.snapshot()?.to_json()
    }

    /// Replace the learned state with a previously exported one
    pub fn import(&self, json: &str) -> Result<()> {
        let table = PatternTable::from_json(json)?;
        self.replace(table)
    }

    pub fn status(&self) -> Result<PredictorStatus> {
        let table = self.snapshot()?;
        Ok(PredictorStatus {
            is_trained: table.is_trained,
            training_size: table.training_size,
            trained_at: table.trained_at,
            categories: table.category_patterns.len(),
            persons: table.person_patterns.len(),
            monthly: table.monthly_patterns.len(),
        })
    }
}

/// Check a training set against a caller's stricter policy
///
/// Requires at least `min` records, each with a date and a numeric amount.
pub fn validate_training_set(records: &[ExpenseRecord], min: usize) -> Result<()> {
    if records.len() < min {
        return Err(Error::Validation(format!(
            "Need at least {} expenses for training, got {}",
            min,
            records.len()
        )));
    }

    for (i, record) in records.iter().enumerate() {
        if record.date.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Expense {} is missing a date",
                i + 1
            )));
        }
        if record.amount.is_none() {
            return Err(Error::Validation(format!(
                "Expense {} is missing a numeric amount",
                i + 1
            )));
        }
    }
    Ok(())
}
