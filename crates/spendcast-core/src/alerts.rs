//! Budget threshold alerts
//!
//! Compares this month's spend per category against its monthly budget and
//! projects month-end spend from the category's monthly average. Each
//! category yields at most one alert, picked by priority:
//!
//! 1. `EXCEEDED`: already at or over the limit
//! 2. `WILL_EXCEED`: projected to reach the limit by month end
//! 3. `WARNING`: already past the warning threshold
//! 4. `CAUTION`: projected to pass the warning threshold

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AlertConfig;
use crate::models::{round_to, CategoryAnalysis, CategoryStats, MonthKey};

/// Monthly spending limit for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub monthly_limit: f64,
}

impl BudgetLimit {
    pub fn new(monthly_limit: f64) -> Self {
        Self { monthly_limit }
    }
}

/// Kind of budget alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Exceeded,
    WillExceed,
    Warning,
    Caution,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exceeded => "EXCEEDED",
            Self::WillExceed => "WILL_EXCEED",
            Self::Warning => "WARNING",
            Self::Caution => "CAUTION",
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self {
            Self::Exceeded | Self::WillExceed => AlertSeverity::High,
            Self::Warning => AlertSeverity::Medium,
            Self::Caution => AlertSeverity::Low,
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget alert for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub category: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub current_spending: f64,
    pub budget_limit: f64,
    /// Percent of the limit already spent
    pub percentage: f64,
    pub predicted_month_end: f64,
    pub predicted_percentage: f64,
    pub severity: AlertSeverity,
}

/// Evaluates budgets against the current month's spend
#[derive(Debug, Clone, Default)]
pub struct BudgetAlertEvaluator {
    config: AlertConfig,
}

impl BudgetAlertEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Evaluate every budget, returning alerts in category name order
    ///
    /// Budgets for categories absent from the analysis, and budgets with a
    /// non-positive limit, are skipped.
    pub fn evaluate(
        &self,
        analysis: &CategoryAnalysis,
        limits: &BTreeMap<String, BudgetLimit>,
        today: NaiveDate,
    ) -> Vec<Alert> {
        let alerts: Vec<Alert> = limits
            .iter()
            .filter_map(|(category, limit)| {
                if limit.monthly_limit.is_nan() || limit.monthly_limit <= 0.0 {
                    debug!(category = %category, "Skipping non-positive budget");
                    return None;
                }
                let stats = analysis.get(category)?;
                self.evaluate_category(category, stats, limit.monthly_limit, today)
            })
            .collect();

        info!(
            budgets = limits.len(),
            alerts = alerts.len(),
            "Budget evaluation complete"
        );
        alerts
    }

    fn evaluate_category(
        &self,
        category: &str,
        stats: &CategoryStats,
        monthly_limit: f64,
        today: NaiveDate,
    ) -> Option<Alert> {
        let current = stats.spent_in(MonthKey::from_date(today));
        let percentage = current / monthly_limit * 100.0;

        let remaining = days_remaining(today);
        let predicted_month_end = if remaining > 0 && stats.monthly_average > 0.0 {
            current + stats.monthly_average / 30.0 * f64::from(remaining)
        } else {
            current
        };
        let predicted_percentage = predicted_month_end / monthly_limit * 100.0;

        let alert_type = self.classify(percentage, predicted_percentage)?;
        debug!(
            category,
            alert = alert_type.as_str(),
            percentage = percentage,
            "Budget alert raised"
        );

        Some(Alert {
            category: category.to_string(),
            alert_type,
            message: self.message(alert_type, category),
            current_spending: round_to(current, 2),
            budget_limit: monthly_limit,
            percentage: round_to(percentage, 1),
            predicted_month_end: round_to(predicted_month_end, 2),
            predicted_percentage: round_to(predicted_percentage, 1),
            severity: alert_type.severity(),
        })
    }

    /// Pick the alert for the given usage, first match wins
    pub fn classify(&self, percentage: f64, predicted_percentage: f64) -> Option<AlertType> {
        let limit = self.config.limit_percent;
        let warning = self.config.warning_percent;

        if percentage >= limit {
            Some(AlertType::Exceeded)
        } else if predicted_percentage >= limit {
            Some(AlertType::WillExceed)
        } else if percentage >= warning {
            Some(AlertType::Warning)
        } else if predicted_percentage >= warning {
            Some(AlertType::Caution)
        } else {
            None
        }
    }

    fn message(&self, alert_type: AlertType, category: &str) -> String {
        match alert_type {
            AlertType::Exceeded => format!("Budget exceeded for {}", category),
            AlertType::WillExceed => format!("Likely to exceed budget for {}", category),
            AlertType::Warning => format!(
                "{}% of budget used for {}",
                self.config.warning_percent, category
            ),
            AlertType::Caution => format!(
                "May reach {}% budget for {}",
                self.config.warning_percent, category
            ),
        }
    }
}

/// Days left in `today`'s month after today
fn days_remaining(today: NaiveDate) -> u32 {
    days_in_month(today).saturating_sub(today.day())
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

/// Evaluate budgets with the default thresholds
pub fn evaluate_alerts(
    analysis: &CategoryAnalysis,
    limits: &BTreeMap<String, BudgetLimit>,
    today: NaiveDate,
) -> Vec<Alert> {
    BudgetAlertEvaluator::new().evaluate(analysis, limits, today)
}
