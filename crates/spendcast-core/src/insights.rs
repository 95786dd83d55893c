//! Category insights - one pass producing analysis, forecasts and alerts
//!
//! [`InsightEngine`] wires the aggregator, forecaster and alert evaluator to
//! a shared [`EngineConfig`], so every analysis in a run uses the same
//! thresholds.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::CategoryAggregator;
use crate::alerts::{Alert, AlertSeverity, BudgetAlertEvaluator, BudgetLimit};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::forecast::{CategoryForecaster, ForecastResult};
use crate::models::{CategoryAnalysis, ExpenseRecord};
use crate::trend::TrendAnalyzer;

/// Combined report for a batch of expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInsights {
    pub analysis: CategoryAnalysis,
    pub predictions: BTreeMap<String, ForecastResult>,
    pub alerts: Vec<Alert>,
    pub summary: InsightSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_categories: usize,
    pub total_alerts: usize,
    pub high_priority_alerts: usize,
}

/// Analysis pipeline configured from one [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    aggregator: CategoryAggregator,
    forecaster: CategoryForecaster,
    evaluator: BudgetAlertEvaluator,
}

impl InsightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let analyzer = TrendAnalyzer::with_config(config.analysis.clone());
        Self {
            aggregator: CategoryAggregator::with_analyzer(analyzer.clone()),
            forecaster: CategoryForecaster::with_config(config.forecast.clone(), analyzer),
            evaluator: BudgetAlertEvaluator::with_config(config.alerts.clone()),
        }
    }

    pub fn analyze(&self, records: &[ExpenseRecord]) -> CategoryAnalysis {
        self.aggregator.aggregate(records)
    }

    pub fn forecast(
        &self,
        category: &str,
        analysis: &CategoryAnalysis,
        horizon_days: u32,
        today: NaiveDate,
    ) -> Result<ForecastResult> {
        self.forecaster
            .forecast(category, analysis, horizon_days, today)
    }

    pub fn forecast_all(
        &self,
        analysis: &CategoryAnalysis,
        horizon_days: u32,
        today: NaiveDate,
    ) -> BTreeMap<String, ForecastResult> {
        self.forecaster.forecast_all(analysis, horizon_days, today)
    }

    pub fn alerts(
        &self,
        analysis: &CategoryAnalysis,
        limits: &BTreeMap<String, BudgetLimit>,
        today: NaiveDate,
    ) -> Vec<Alert> {
        self.evaluator.evaluate(analysis, limits, today)
    }

    /// Aggregate, forecast every category and evaluate budgets
    pub fn build(
        &self,
        records: &[ExpenseRecord],
        limits: &BTreeMap<String, BudgetLimit>,
        horizon_days: u32,
        today: NaiveDate,
    ) -> CategoryInsights {
        let analysis = self.analyze(records);
        let predictions = self.forecast_all(&analysis, horizon_days, today);
        let alerts = self.alerts(&analysis, limits, today);

        let summary = InsightSummary {
            total_categories: analysis.categories.len(),
            total_alerts: alerts.len(),
            high_priority_alerts: alerts
                .iter()
                .filter(|a| a.severity == AlertSeverity::High)
                .count(),
        };

        info!(
            categories = summary.total_categories,
            alerts = summary.total_alerts,
            high = summary.high_priority_alerts,
            "Category insights built"
        );

        CategoryInsights {
            analysis,
            predictions,
            alerts,
            summary,
        }
    }
}

/// Build insights with default thresholds
pub fn build(
    records: &[ExpenseRecord],
    limits: &BTreeMap<String, BudgetLimit>,
    horizon_days: u32,
    today: NaiveDate,
) -> CategoryInsights {
    InsightEngine::new().build(records, limits, horizon_days, today)
}
