//! Domain models for spendcast

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category assigned to records that arrive without one
pub const DEFAULT_CATEGORY: &str = "Other";

/// A raw expense as supplied by the caller
///
/// Records are read-only input: nothing in the engine mutates them. The
/// `amount` is `None` when the source field was missing or not numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<f64>,
    #[serde(default, alias = "expenseType", deserialize_with = "deserialize_label")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub subject: String,
    #[serde(default, alias = "to", deserialize_with = "deserialize_text")]
    pub counterparty: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub date: String,
}

impl ExpenseRecord {
    pub fn new(amount: f64, category: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            category: Some(category.into()),
            subject: String::new(),
            counterparty: String::new(),
            date: date.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = counterparty.into();
        self
    }

    /// Category label, falling back to "Other" when absent or blank
    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// True when the amount is present, finite and not negative
    pub fn has_valid_amount(&self) -> bool {
        matches!(self.amount, Some(a) if a.is_finite() && a >= 0.0)
    }

    /// Amount with missing, negative or non-finite values coerced to 0
    pub fn coerced_amount(&self) -> f64 {
        match self.amount {
            Some(a) if a.is_finite() && a > 0.0 => a,
            _ => 0.0,
        }
    }
}

/// Parse an amount string leniently, handling currency symbols and commas
///
/// Returns None for anything that is not a finite number after cleanup.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₹', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything that is neither a number nor a string (bools, objects) is
    // treated as a non-numeric amount rather than failing the whole batch
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let amount = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64().filter(|a| a.is_finite()),
        Some(serde_json::Value::String(s)) => parse_amount(&s),
        _ => None,
    };
    Ok(amount)
}

/// Text form of a loosely typed JSON field: null and containers become empty
fn value_to_text(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value_to_text(raw))
}

fn deserialize_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let text = value_to_text(raw);
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Aggregation bucket for a calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key: {}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range in month key: {}", s));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Totals for one category within one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

/// Coarse spending direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Increasing,
    Decreasing,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        }
    }
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "increasing" => Ok(Self::Increasing),
            "decreasing" => Ok(Self::Decreasing),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Historical statistics for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_transaction: f64,
    /// Average over months with activity, not calendar months
    pub monthly_average: f64,
    pub months_with_data: usize,
    pub monthly_data: BTreeMap<MonthKey, MonthlySummary>,
    /// Per-month totals in chronological order
    pub monthly_totals: Vec<f64>,
    pub trend: Trend,
    pub growth_rate: f64,
    /// Calendar month (1-12) to seasonal factor
    pub seasonality: BTreeMap<u32, f64>,
}

impl CategoryStats {
    /// Total spent in the given month (0 if the month has no bucket)
    pub fn spent_in(&self, month: MonthKey) -> f64 {
        self.monthly_data.get(&month).map(|m| m.total).unwrap_or(0.0)
    }
}

/// Tally of date parsing outcomes for one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingStats {
    pub successful: usize,
    pub failed: usize,
    /// Records kept with their amount coerced to 0
    pub invalid_amounts: usize,
    /// Percentage of records with a usable date (100 for an empty batch)
    pub success_rate: f64,
}

impl ParsingStats {
    pub fn new(successful: usize, failed: usize, invalid_amounts: usize) -> Self {
        let attempted = successful + failed;
        let success_rate = if attempted > 0 {
            successful as f64 / attempted as f64 * 100.0
        } else {
            100.0
        };
        Self {
            successful,
            failed,
            invalid_amounts,
            success_rate,
        }
    }

    pub fn success_rate_label(&self) -> String {
        format!("{:.1}%", self.success_rate)
    }
}

/// Output of one aggregation pass over a batch of records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub categories: BTreeMap<String, CategoryStats>,
    pub parsing_stats: ParsingStats,
    pub analysis_date: DateTime<Utc>,
}

impl CategoryAnalysis {
    pub fn get(&self, category: &str) -> Option<&CategoryStats> {
        self.categories.get(category)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Round to a fixed number of decimal places for reporting
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
