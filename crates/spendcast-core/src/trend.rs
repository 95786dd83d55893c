//! Trend, growth rate and seasonality inference over monthly totals
//!
//! All inputs are chronologically ordered monthly totals for one category.
//! Degenerate inputs (too few months, zero means) fall back to neutral
//! values instead of erroring:
//! - trend needs 2 months, growth rate needs 3; the asymmetry is deliberate
//!   and changing it would change reported output
//! - seasonality needs `min_seasonality_months` buckets

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::models::{MonthKey, MonthlySummary, Trend};

/// Derives direction, growth and seasonal factors for a category
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalysisConfig,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Compare the early and late halves of the recent window
    ///
    /// The window is the last `long_window` months when that many exist,
    /// otherwise the last `short_window` (or fewer, down to 2).
    pub fn trend(&self, monthly_totals: &[f64]) -> Trend {
        if monthly_totals.len() < 2 {
            return Trend::Stable;
        }

        let window_len = if monthly_totals.len() >= self.config.long_window {
            self.config.long_window
        } else {
            self.config.short_window.min(monthly_totals.len())
        };
        let recent = &monthly_totals[monthly_totals.len() - window_len..];
        if recent.len() < 2 {
            return Trend::Stable;
        }

        let mid = recent.len() / 2;
        let first_half = mean(&recent[..mid]);
        let second_half = mean(&recent[mid..]);

        if first_half == 0.0 || !first_half.is_finite() {
            return Trend::Stable;
        }

        let change_percent = (second_half - first_half) / first_half * 100.0;

        if change_percent.abs() < self.config.stable_change_percent {
            Trend::Stable
        } else if change_percent > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }

    /// Percent change of the latest month against the mean of all prior months
    ///
    /// Returns 0 for fewer than 3 months (including exactly 2) or when the
    /// prior mean is not positive. Clamped to +/- `growth_rate_cap`.
    pub fn growth_rate(&self, monthly_totals: &[f64]) -> f64 {
        if monthly_totals.len() < 3 {
            return 0.0;
        }

        let (last, prior) = match monthly_totals.split_last() {
            Some((last, prior)) => (*last, prior),
            None => return 0.0,
        };
        let prior_mean = mean(prior);
        if prior_mean <= 0.0 || !prior_mean.is_finite() {
            return 0.0;
        }

        let cap = self.config.growth_rate_cap;
        let rate = (last - prior_mean) / prior_mean * 100.0;
        rate.clamp(-cap, cap)
    }

    /// Average spend per calendar month relative to the overall monthly average
    pub fn seasonality(
        &self,
        monthly_data: &BTreeMap<MonthKey, MonthlySummary>,
    ) -> BTreeMap<u32, f64> {
        let mut factors = BTreeMap::new();
        if monthly_data.len() < self.config.min_seasonality_months {
            return factors;
        }

        let all_totals: Vec<f64> = monthly_data.values().map(|m| m.total).collect();
        let overall = mean(&all_totals);
        if overall <= 0.0 || !overall.is_finite() {
            return factors;
        }

        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (key, summary) in monthly_data {
            by_month.entry(key.month).or_default().push(summary.total);
        }

        for (month, totals) in by_month {
            factors.insert(month, mean(&totals) / overall);
        }
        factors
    }

    /// Seasonal factor for a calendar month, clamped to damp extreme swings
    pub fn seasonality_factor(&self, seasonality: &BTreeMap<u32, f64>, month: u32) -> f64 {
        match seasonality.get(&month) {
            Some(factor) if factor.is_finite() => factor.clamp(
                self.config.seasonality_floor,
                self.config.seasonality_ceiling,
            ),
            _ => 1.0,
        }
    }
}

/// Arithmetic mean (0 for an empty slice)
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
