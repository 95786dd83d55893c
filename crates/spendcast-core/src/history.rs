//! Prediction history
//!
//! Keeps the most recent point predictions (bounded) so usage can be
//! summarized later. The history is plain data; [`crate::store::PatternStore`]
//! persists it beside the pattern snapshot.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::round_to;
use crate::predictor::{PointEstimate, PredictionQuery};

/// Entries kept before the oldest are dropped
pub const HISTORY_CAPACITY: usize = 1000;

/// Entries shown as recent in analytics
const RECENT_ENTRIES: usize = 10;

/// One recorded prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub query: PredictionQuery,
    pub prediction: f64,
    pub method: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRange {
    pub min: f64,
    pub max: f64,
}

/// Summary of the recorded predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAnalytics {
    pub total_predictions: usize,
    pub average_predicted_amount: f64,
    pub prediction_range: PredictionRange,
    pub most_used_method: String,
    /// Newest last
    pub recent_predictions: Vec<HistoryEntry>,
}

/// Bounded log of past predictions, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionHistory {
    entries: VecDeque<HistoryEntry>,
}

impl PredictionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Append a prediction, dropping the oldest past capacity
    pub fn record(&mut self, query: &PredictionQuery, estimate: &PointEstimate) {
        self.push(HistoryEntry {
            timestamp: Utc::now(),
            query: query.clone(),
            prediction: estimate.predicted_amount,
            method: estimate.method_used.clone(),
            confidence: estimate.confidence,
        });
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Summarize the history, `None` when nothing has been recorded
    pub fn analytics(&self) -> Option<HistoryAnalytics> {
        if self.entries.is_empty() {
            return None;
        }

        let amounts: Vec<f64> = self
            .entries
            .iter()
            .map(|e| e.prediction)
            .filter(|p| *p > 0.0)
            .collect();

        let (average, min, max) = if amounts.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                amounts.iter().sum::<f64>() / amounts.len() as f64,
                amounts.iter().copied().fold(f64::INFINITY, f64::min),
                amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        let recent = self
            .entries
            .iter()
            .skip(self.entries.len().saturating_sub(RECENT_ENTRIES))
            .cloned()
            .collect();

        Some(HistoryAnalytics {
            total_predictions: self.entries.len(),
            average_predicted_amount: round_to(average, 2),
            prediction_range: PredictionRange { min, max },
            most_used_method: self.most_used_method(),
            recent_predictions: recent,
        })
    }

    /// Most frequent method; ties go to the one used first
    fn most_used_method(&self) -> String {
        // method -> (count, first position)
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            counts.entry(entry.method.as_str()).or_insert((0, i)).0 += 1;
        }

        counts
            .into_iter()
            .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(method, _)| method.to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}
