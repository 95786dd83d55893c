//! Forecast confidence scoring
//!
//! Blends three terms into a score bounded to [0.2, 0.95]:
//! - data volume (how many months of history)
//! - consistency (1 - coefficient of variation of monthly totals)
//! - volatility (how extreme the growth rate is)

use serde::{Deserialize, Serialize};

use crate::models::round_to;
use crate::trend::mean;

pub const MIN_CONFIDENCE: f64 = 0.2;
pub const MAX_CONFIDENCE: f64 = 0.95;

const DATA_VOLUME_WEIGHT: f64 = 0.4;
const CONSISTENCY_WEIGHT: f64 = 0.4;
const VOLATILITY_WEIGHT: f64 = 0.2;

/// The individual terms behind a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub data_volume: f64,
    pub consistency: f64,
    pub volatility: f64,
    pub score: f64,
}

impl ConfidenceBreakdown {
    /// Every term rounded to 2 decimal places, for output
    pub fn rounded(&self) -> Self {
        Self {
            data_volume: round_to(self.data_volume, 2),
            consistency: round_to(self.consistency, 2),
            volatility: round_to(self.volatility, 2),
            score: round_to(self.score, 2),
        }
    }
}

/// Score how far a forecast built on this history can be trusted
pub fn confidence(monthly_totals: &[f64], months_with_data: usize, growth_rate: f64) -> f64 {
    breakdown(monthly_totals, months_with_data, growth_rate).score
}

/// Same as [`confidence`], keeping the individual terms
pub fn breakdown(
    monthly_totals: &[f64],
    months_with_data: usize,
    growth_rate: f64,
) -> ConfidenceBreakdown {
    let data_volume = data_volume_term(months_with_data);
    let consistency = consistency_term(monthly_totals);
    let volatility = volatility_term(growth_rate);

    let blended = data_volume * DATA_VOLUME_WEIGHT
        + consistency * CONSISTENCY_WEIGHT
        + volatility * VOLATILITY_WEIGHT;

    ConfidenceBreakdown {
        data_volume,
        consistency,
        volatility,
        score: blended.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
    }
}

fn data_volume_term(months_with_data: usize) -> f64 {
    match months_with_data {
        m if m >= 12 => 0.9,
        m if m >= 6 => 0.8,
        m if m >= 3 => 0.7,
        _ => 0.5,
    }
}

fn consistency_term(monthly_totals: &[f64]) -> f64 {
    if monthly_totals.len() < 2 {
        return 0.5;
    }

    let avg = mean(monthly_totals);
    if avg <= 0.0 || !avg.is_finite() {
        return 0.5;
    }

    // Population variance
    let variance = monthly_totals
        .iter()
        .map(|x| (x - avg).powi(2))
        .sum::<f64>()
        / monthly_totals.len() as f64;
    let cv = variance.sqrt() / avg;
    if !cv.is_finite() {
        return 0.5;
    }

    (1.0 - cv).clamp(0.3, 0.9)
}

fn volatility_term(growth_rate: f64) -> f64 {
    let magnitude = growth_rate.abs();
    if magnitude > 40.0 {
        0.3
    } else if magnitude > 15.0 {
        0.6
    } else {
        // Includes NaN, which compares false above
        0.9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_volume_steps() {
        assert_eq!(data_volume_term(0), 0.5);
        assert_eq!(data_volume_term(2), 0.5);
        assert_eq!(data_volume_term(3), 0.7);
        assert_eq!(data_volume_term(6), 0.8);
        assert_eq!(data_volume_term(12), 0.9);
        assert_eq!(data_volume_term(40), 0.9);
    }

    #[test]
    fn test_consistency_perfectly_flat() {
        // cv = 0 -> 1.0, clamped to 0.9
        assert_eq!(consistency_term(&[100.0, 100.0, 100.0]), 0.9);
    }

    #[test]
    fn test_consistency_degenerate_inputs() {
        assert_eq!(consistency_term(&[]), 0.5);
        assert_eq!(consistency_term(&[100.0]), 0.5);
        assert_eq!(consistency_term(&[0.0, 0.0, 0.0]), 0.5);
    }

    #[test]
    fn test_consistency_high_variance_floor() {
        // mean 50, population stddev 50 -> cv 1 -> 0, floored at 0.3
        assert_eq!(consistency_term(&[0.0, 100.0]), 0.3);
    }

    #[test]
    fn test_volatility_bands() {
        assert_eq!(volatility_term(0.0), 0.9);
        assert_eq!(volatility_term(15.0), 0.9);
        assert_eq!(volatility_term(-20.0), 0.6);
        assert_eq!(volatility_term(40.0), 0.6);
        assert_eq!(volatility_term(50.0), 0.3);
        assert_eq!(volatility_term(f64::NAN), 0.9);
    }

    #[test]
    fn test_confidence_weighted_blend() {
        // 3 months (0.7), cv 0 (0.9), growth 0 (0.9)
        // 0.28 + 0.36 + 0.18 = 0.82
        let score = confidence(&[100.0, 100.0, 100.0], 3, 0.0);
        assert!((score - 0.82).abs() < 1e-9);

        let parts = breakdown(&[100.0, 100.0, 100.0], 3, 0.0);
        assert_eq!(parts.data_volume, 0.7);
        assert_eq!(parts.consistency, 0.9);
        assert_eq!(parts.volatility, 0.9);
    }

    #[test]
    fn test_confidence_always_bounded() {
        let histories: [&[f64]; 6] = [
            &[],
            &[0.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[1.0, 10_000.0, 0.0, 5.0],
            &[100.0; 24],
            &[f64::MAX, 0.0],
        ];
        for totals in histories {
            for months in [0, 1, 3, 6, 12, 100] {
                for growth in [-50.0, -20.0, 0.0, 16.0, 41.0, 50.0, f64::NAN] {
                    let score = confidence(totals, months, growth);
                    assert!(
                        (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&score),
                        "score {} out of range for {:?} / {} / {}",
                        score,
                        totals,
                        months,
                        growth
                    );
                }
            }
        }
    }

    #[test]
    fn test_confidence_ceiling() {
        // 12+ months, flat, stable: 0.36 + 0.36 + 0.18 = 0.90
        let score = confidence(&[100.0; 12], 12, 0.0);
        assert!((score - 0.9).abs() < 1e-9);
    }
}
