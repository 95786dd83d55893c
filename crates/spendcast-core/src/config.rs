//! Engine configuration
//!
//! Thresholds for trend detection, forecasting, alerting and pattern
//! training, plus per-category monthly budgets.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path if it exists, else the override in the data dir
//!    (~/.local/share/spendcast/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Override files only need the keys they change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::alerts::BudgetLimit;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendcast.toml");

/// Thresholds used by trend, growth and seasonality analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Half-over-half change (percent) below which a trend is stable
    pub stable_change_percent: f64,
    /// Months examined when at least this many exist
    pub long_window: usize,
    /// Months examined otherwise
    pub short_window: usize,
    /// Growth rate clamp, in percent either way
    pub growth_rate_cap: f64,
    /// Minimum monthly buckets before seasonality is computed
    pub min_seasonality_months: usize,
    pub seasonality_floor: f64,
    pub seasonality_ceiling: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stable_change_percent: 10.0,
            long_window: 6,
            short_window: 3,
            growth_rate_cap: 50.0,
            min_seasonality_months: 4,
            seasonality_floor: 0.5,
            seasonality_ceiling: 1.5,
        }
    }
}

/// Forecast horizon and trend adjustment caps
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    /// Cap on the upward trend adjustment (0.5 = +50%)
    pub max_trend_boost: f64,
    /// Cap on the downward trend adjustment (0.3 = -30%)
    pub max_trend_cut: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            max_trend_boost: 0.5,
            max_trend_cut: 0.3,
        }
    }
}

/// Budget usage thresholds, in percent of the monthly limit
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    pub warning_percent: f64,
    pub limit_percent: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            warning_percent: 80.0,
            limit_percent: 100.0,
        }
    }
}

/// Pattern predictor training policy
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Hard minimum; fewer records is a training error
    pub min_training_records: usize,
    /// Stricter minimum applied at the service boundary
    pub service_min_training_records: usize,
    /// Estimate when the training set had no usable amounts
    pub default_prediction: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_training_records: 3,
            service_min_training_records: 5,
            default_prediction: 150.0,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub forecast: ForecastConfig,
    pub alerts: AlertConfig,
    pub predictor: PredictorConfig,
    /// Monthly budget per category
    pub budgets: BTreeMap<String, BudgetLimit>,
}

impl EngineConfig {
    /// Load configuration (override first, then embedded defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match resolve_path(override_path, default_config_path()) {
            Some(path) => {
                debug!(path = %path.display(), "Loading config override");
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::InvalidData(format!(
                        "Failed to read config {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::parse(&content)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Parse config from TOML content, merged over the built-in defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

        let mut config = EngineConfig::default();

        if let Some(analysis) = raw.analysis {
            let a = &mut config.analysis;
            if let Some(v) = analysis.stable_change_percent {
                a.stable_change_percent = v;
            }
            if let Some(v) = analysis.long_window {
                a.long_window = v;
            }
            if let Some(v) = analysis.short_window {
                a.short_window = v;
            }
            if let Some(v) = analysis.growth_rate_cap {
                a.growth_rate_cap = v;
            }
            if let Some(v) = analysis.min_seasonality_months {
                a.min_seasonality_months = v;
            }
            if let Some(v) = analysis.seasonality_floor {
                a.seasonality_floor = v;
            }
            if let Some(v) = analysis.seasonality_ceiling {
                a.seasonality_ceiling = v;
            }
        }

        if let Some(forecast) = raw.forecast {
            if let Some(v) = forecast.horizon_days {
                config.forecast.horizon_days = v;
            }
            if let Some(v) = forecast.max_trend_boost {
                config.forecast.max_trend_boost = v;
            }
            if let Some(v) = forecast.max_trend_cut {
                config.forecast.max_trend_cut = v;
            }
        }

        if let Some(alerts) = raw.alerts {
            if let Some(v) = alerts.warning_percent {
                config.alerts.warning_percent = v;
            }
            if let Some(v) = alerts.limit_percent {
                config.alerts.limit_percent = v;
            }
        }

        if let Some(predictor) = raw.predictor {
            if let Some(v) = predictor.min_training_records {
                config.predictor.min_training_records = v;
            }
            if let Some(v) = predictor.service_min_training_records {
                config.predictor.service_min_training_records = v;
            }
            if let Some(v) = predictor.default_prediction {
                config.predictor.default_prediction = v;
            }
        }

        if let Some(budgets) = raw.budgets {
            config.budgets = budgets
                .into_iter()
                .map(|(category, monthly_limit)| (category, BudgetLimit::new(monthly_limit)))
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        if a.short_window < 2 || a.long_window < a.short_window {
            return Err(Error::InvalidData(format!(
                "Trend windows must satisfy 2 <= short_window ({}) <= long_window ({})",
                a.short_window, a.long_window
            )));
        }
        check_non_negative("stable_change_percent", a.stable_change_percent)?;
        check_non_negative("growth_rate_cap", a.growth_rate_cap)?;
        check_non_negative("seasonality_floor", a.seasonality_floor)?;
        check_non_negative("seasonality_ceiling", a.seasonality_ceiling)?;
        if a.seasonality_floor > a.seasonality_ceiling {
            return Err(Error::InvalidData(
                "seasonality_floor must not exceed seasonality_ceiling".into(),
            ));
        }
        check_non_negative("max_trend_boost", self.forecast.max_trend_boost)?;
        check_non_negative("max_trend_cut", self.forecast.max_trend_cut)?;
        check_non_negative("warning_percent", self.alerts.warning_percent)?;
        check_non_negative("limit_percent", self.alerts.limit_percent)?;
        check_non_negative("default_prediction", self.predictor.default_prediction)?;
        if self.predictor.min_training_records == 0 {
            return Err(Error::InvalidData(
                "min_training_records must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Pick the override file to read, if any
///
/// A missing explicit path is reported and skipped, not fatal.
fn resolve_path(explicit: Option<&Path>, data_dir_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "Config file not found, falling back");
    }
    data_dir_path.filter(|path| path.exists())
}

/// Reject a value that is NaN, infinite or negative
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidData(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )));
    }
    Ok(())
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analysis: Option<RawAnalysis>,
    forecast: Option<RawForecast>,
    alerts: Option<RawAlerts>,
    predictor: Option<RawPredictor>,
    budgets: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    stable_change_percent: Option<f64>,
    long_window: Option<usize>,
    short_window: Option<usize>,
    growth_rate_cap: Option<f64>,
    min_seasonality_months: Option<usize>,
    seasonality_floor: Option<f64>,
    seasonality_ceiling: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    horizon_days: Option<u32>,
    max_trend_boost: Option<f64>,
    max_trend_cut: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAlerts {
    warning_percent: Option<f64>,
    limit_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPredictor {
    min_training_records: Option<usize>,
    service_min_training_records: Option<usize>,
    default_prediction: Option<f64>,
}
