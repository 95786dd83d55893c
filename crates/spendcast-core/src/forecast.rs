//! Per-category spending forecast
//!
//! Projects the next `horizon_days` of spend from a category's monthly
//! average, nudged by its recent trend and by the seasonal factor of the
//! current calendar month. Output is a pure function of the stats snapshot,
//! the horizon and `today`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ForecastConfig;
use crate::confidence::{self, ConfidenceBreakdown};
use crate::error::{Error, Result};
use crate::models::{round_to, CategoryAnalysis, CategoryStats, Trend};
use crate::trend::TrendAnalyzer;

/// Days the monthly average is assumed to cover
const MONTH_DAYS: f64 = 30.0;

/// Forecast for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub category: String,
    pub predicted_amount: f64,
    pub confidence: f64,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub daily_average: f64,
    pub monthly_average: f64,
    pub days_predicted: u32,
    pub trend: Trend,
    pub growth_rate: f64,
    pub trend_multiplier: f64,
    pub seasonality_factor: f64,
    pub prediction_factors: PredictionFactors,
}

/// How the base average was adjusted, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactors {
    pub base_monthly_avg: f64,
    /// Signed percentage, e.g. "+12.5%"
    pub trend_adjustment: String,
    pub seasonality_adjustment: String,
}

/// Forecasts category spend from aggregated history
#[derive(Debug, Clone, Default)]
pub struct CategoryForecaster {
    config: ForecastConfig,
    analyzer: TrendAnalyzer,
}

impl CategoryForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForecastConfig, analyzer: TrendAnalyzer) -> Self {
        Self { config, analyzer }
    }

    /// Forecast one category
    ///
    /// Fails with [`Error::NotFound`] when the category has no history.
    pub fn forecast(
        &self,
        category: &str,
        analysis: &CategoryAnalysis,
        horizon_days: u32,
        today: NaiveDate,
    ) -> Result<ForecastResult> {
        let stats = analysis
            .get(category)
            .ok_or_else(|| Error::NotFound(category.to_string()))?;
        Ok(self.forecast_stats(category, stats, horizon_days, today))
    }

    /// Forecast every category in the analysis, keyed by category
    pub fn forecast_all(
        &self,
        analysis: &CategoryAnalysis,
        horizon_days: u32,
        today: NaiveDate,
    ) -> BTreeMap<String, ForecastResult> {
        analysis
            .categories
            .iter()
            .map(|(category, stats)| {
                (
                    category.clone(),
                    self.forecast_stats(category, stats, horizon_days, today),
                )
            })
            .collect()
    }

    fn forecast_stats(
        &self,
        category: &str,
        stats: &CategoryStats,
        horizon_days: u32,
        today: NaiveDate,
    ) -> ForecastResult {
        let base = stats.monthly_average;
        let trend_multiplier = self.trend_multiplier(stats.trend, stats.growth_rate);
        let seasonality_factor = self
            .analyzer
            .seasonality_factor(&stats.seasonality, today.month());

        let mut predicted = (base * trend_multiplier * seasonality_factor).max(0.0);
        if horizon_days != 30 {
            predicted = predicted / MONTH_DAYS * f64::from(horizon_days);
        }

        let daily_average = if horizon_days > 0 {
            predicted / f64::from(horizon_days)
        } else {
            0.0
        };

        let breakdown = confidence::breakdown(
            &stats.monthly_totals,
            stats.months_with_data,
            stats.growth_rate,
        );
        let confidence = breakdown.score;

        debug!(
            category,
            predicted = predicted,
            confidence = confidence,
            "Forecast computed"
        );

        ForecastResult {
            category: category.to_string(),
            predicted_amount: round_to(predicted, 2),
            confidence: round_to(confidence, 2),
            confidence_breakdown: breakdown.rounded(),
            daily_average: round_to(daily_average, 2),
            monthly_average: round_to(base, 2),
            days_predicted: horizon_days,
            trend: stats.trend,
            growth_rate: round_to(stats.growth_rate, 2),
            trend_multiplier: round_to(trend_multiplier, 3),
            seasonality_factor: round_to(seasonality_factor, 3),
            prediction_factors: PredictionFactors {
                base_monthly_avg: round_to(base, 2),
                trend_adjustment: adjustment_label(trend_multiplier),
                seasonality_adjustment: adjustment_label(seasonality_factor),
            },
        }
    }

    /// Multiplier applied for the category's trend direction
    ///
    /// Only applied when trend and growth rate agree on the direction.
    pub fn trend_multiplier(&self, trend: Trend, growth_rate: f64) -> f64 {
        match trend {
            Trend::Increasing if growth_rate > 0.0 => {
                1.0 + (growth_rate / 100.0).min(self.config.max_trend_boost)
            }
            Trend::Decreasing if growth_rate < 0.0 => {
                1.0 + (growth_rate / 100.0).max(-self.config.max_trend_cut)
            }
            _ => 1.0,
        }
    }
}

/// Format a multiplier as a signed percentage change ("+12.5%", "-3.0%")
fn adjustment_label(multiplier: f64) -> String {
    let sign = if multiplier > 1.0 { "+" } else { "" };
    format!("{}{:.1}%", sign, (multiplier - 1.0) * 100.0)
}

/// Forecast one category with default settings
pub fn forecast(
    category: &str,
    analysis: &CategoryAnalysis,
    horizon_days: u32,
    today: NaiveDate,
) -> Result<ForecastResult> {
    CategoryForecaster::new().forecast(category, analysis, horizon_days, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::ExpenseRecord;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn analysis_of(category: &str, totals: &[(&str, f64)]) -> CategoryAnalysis {
        let records: Vec<ExpenseRecord> = totals
            .iter()
            .map(|(date, amount)| ExpenseRecord::new(*amount, category, *date))
            .collect();
        aggregate(&records)
    }

    fn rising() -> CategoryAnalysis {
        analysis_of(
            "food",
            &[("2024-01-10", 100.0), ("2024-02-10", 150.0), ("2024-03-10", 200.0)],
        )
    }

    #[test]
    fn test_forecast_increasing_category() {
        let result = forecast("food", &rising(), 30, day(2024, 3, 20)).unwrap();

        // base 150, growth capped at 50 -> x1.5, no seasonality
        assert_eq!(result.predicted_amount, 225.0);
        assert_eq!(result.daily_average, 7.5);
        assert_eq!(result.monthly_average, 150.0);
        assert_eq!(result.trend, Trend::Increasing);
        assert_eq!(result.trend_multiplier, 1.5);
        assert_eq!(result.seasonality_factor, 1.0);
        assert_eq!(result.confidence, 0.63);
        assert_eq!(result.confidence_breakdown.data_volume, 0.7);
        assert_eq!(result.confidence_breakdown.score, result.confidence);
        assert_eq!(result.prediction_factors.trend_adjustment, "+50.0%");
        assert_eq!(result.prediction_factors.seasonality_adjustment, "0.0%");
    }

    #[test]
    fn test_forecast_decreasing_category() {
        let analysis = analysis_of(
            "bills",
            &[("2024-01-05", 200.0), ("2024-02-05", 200.0), ("2024-03-05", 100.0)],
        );
        let result = forecast("bills", &analysis, 30, day(2024, 3, 20)).unwrap();

        // growth -50 -> cut capped at 30%
        assert_eq!(result.trend, Trend::Decreasing);
        assert_eq!(result.trend_multiplier, 0.7);
        assert_eq!(result.prediction_factors.trend_adjustment, "-30.0%");
        assert!((result.predicted_amount - 116.67).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_rescales_horizon() {
        let analysis = rising();
        let result = forecast("food", &analysis, 15, day(2024, 3, 20)).unwrap();
        assert_eq!(result.predicted_amount, 112.5);
        assert_eq!(result.daily_average, 7.5);
        assert_eq!(result.days_predicted, 15);

        let result = forecast("food", &analysis, 0, day(2024, 3, 20)).unwrap();
        assert_eq!(result.predicted_amount, 0.0);
        assert_eq!(result.daily_average, 0.0);
    }

    #[test]
    fn test_forecast_applies_clamped_seasonality() {
        let analysis = analysis_of(
            "travel",
            &[
                ("2024-01-10", 100.0),
                ("2024-02-10", 100.0),
                ("2024-03-10", 100.0),
                ("2024-04-10", 300.0),
            ],
        );

        // April factor is 2.0, clamped to 1.5
        let april = forecast("travel", &analysis, 30, day(2024, 4, 20)).unwrap();
        assert_eq!(april.seasonality_factor, 1.5);
        assert_eq!(april.predicted_amount, 337.5);
        assert_eq!(april.prediction_factors.seasonality_adjustment, "+50.0%");

        // No June history, so no seasonal adjustment
        let june = forecast("travel", &analysis, 30, day(2024, 6, 1)).unwrap();
        assert_eq!(june.seasonality_factor, 1.0);
        assert_eq!(june.predicted_amount, 225.0);
    }

    #[test]
    fn test_forecast_unknown_category() {
        let err = forecast("yachts", &rising(), 30, day(2024, 3, 20)).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref c) if c == "yachts"));
        assert_eq!(err.to_string(), "No historical data for category: yachts");
    }

    #[test]
    fn test_trend_multiplier_requires_agreement() {
        let forecaster = CategoryForecaster::new();
        assert_eq!(forecaster.trend_multiplier(Trend::Increasing, -5.0), 1.0);
        assert_eq!(forecaster.trend_multiplier(Trend::Decreasing, 5.0), 1.0);
        assert_eq!(forecaster.trend_multiplier(Trend::Stable, 40.0), 1.0);
        assert!((forecaster.trend_multiplier(Trend::Increasing, 20.0) - 1.2).abs() < 1e-9);
        assert!((forecaster.trend_multiplier(Trend::Decreasing, -10.0) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_never_negative() {
        let analysis = analysis_of("misc", &[("2024-01-01", 0.0), ("2024-02-01", 0.0)]);
        for horizon in [0, 1, 7, 30, 90] {
            let result = forecast("misc", &analysis, horizon, day(2024, 2, 10)).unwrap();
            assert!(result.predicted_amount >= 0.0);
            assert!((0.2..=0.95).contains(&result.confidence));
        }
    }

    #[test]
    fn test_forecast_all_covers_every_category() {
        let records = vec![
            ExpenseRecord::new(10.0, "food", "2024-01-01"),
            ExpenseRecord::new(20.0, "bills", "2024-01-01"),
            ExpenseRecord::new(30.0, "transport", "2024-01-01"),
        ];
        let analysis = aggregate(&records);
        let all = CategoryForecaster::new().forecast_all(&analysis, 30, day(2024, 1, 15));

        let keys: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bills", "food", "transport"]);
        assert_eq!(all["bills"].predicted_amount, 20.0);
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let analysis = rising();
        let a = forecast("food", &analysis, 21, day(2024, 3, 20)).unwrap();
        let b = forecast("food", &analysis, 21, day(2024, 3, 20)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_adjustment_label() {
        assert_eq!(adjustment_label(1.125), "+12.5%");
        assert_eq!(adjustment_label(0.97), "-3.0%");
        assert_eq!(adjustment_label(1.0), "0.0%");
    }
}
