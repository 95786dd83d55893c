//! Category aggregation
//!
//! Groups raw expense records by category and calendar month and derives the
//! per-category statistics every other analysis builds on. Records whose date
//! cannot be parsed are skipped and counted, never fatal.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::dates;
use crate::models::{
    CategoryAnalysis, CategoryStats, ExpenseRecord, MonthKey, MonthlySummary, ParsingStats,
};
use crate::trend::TrendAnalyzer;

/// Builds [`CategoryStats`] for every category in a batch
#[derive(Debug, Clone, Default)]
pub struct CategoryAggregator {
    analyzer: TrendAnalyzer,
}

/// Running totals for one category while the batch is scanned
#[derive(Debug, Default)]
struct CategoryAccumulator {
    transaction_count: usize,
    months: BTreeMap<MonthKey, (f64, usize)>,
}

impl CategoryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analyzer(analyzer: TrendAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Aggregate a batch of records into per-category statistics
    pub fn aggregate(&self, records: &[ExpenseRecord]) -> CategoryAnalysis {
        let mut accumulators: BTreeMap<String, CategoryAccumulator> = BTreeMap::new();
        let mut successful = 0;
        let mut failed = 0;
        let mut invalid_amounts = 0;

        for record in records {
            let Some(date) = dates::parse(&record.date) else {
                debug!(date = %record.date, "Could not parse date, skipping expense");
                failed += 1;
                continue;
            };
            successful += 1;

            if !record.has_valid_amount() {
                debug!(amount = ?record.amount, "Invalid amount, counting as 0");
                invalid_amounts += 1;
            }

            let acc = accumulators
                .entry(record.category_or_default().to_string())
                .or_default();
            acc.transaction_count += 1;

            let bucket = acc.months.entry(MonthKey::from_date(date)).or_insert((0.0, 0));
            bucket.0 += record.coerced_amount();
            bucket.1 += 1;
        }

        if failed > 0 {
            warn!(failed, successful, "Some expenses had unparseable dates");
        }

        let categories: BTreeMap<String, CategoryStats> = accumulators
            .into_iter()
            .map(|(category, acc)| {
                let stats = self.build_stats(acc);
                (category, stats)
            })
            .collect();

        let parsing_stats = ParsingStats::new(successful, failed, invalid_amounts);
        info!(
            categories = categories.len(),
            parsed = successful,
            failed,
            success_rate = %parsing_stats.success_rate_label(),
            "Category analysis complete"
        );

        CategoryAnalysis {
            categories,
            parsing_stats,
            analysis_date: Utc::now(),
        }
    }

    fn build_stats(&self, acc: CategoryAccumulator) -> CategoryStats {
        let monthly_data: BTreeMap<MonthKey, MonthlySummary> = acc
            .months
            .into_iter()
            .map(|(month, (total, count))| {
                let average = if count > 0 { total / count as f64 } else { 0.0 };
                (
                    month,
                    MonthlySummary {
                        total,
                        count,
                        average,
                    },
                )
            })
            .collect();

        let monthly_totals: Vec<f64> = monthly_data.values().map(|m| m.total).collect();
        let months_with_data = monthly_data.len();

        // Summed from the monthly totals so the two always agree exactly
        let total_spent: f64 = monthly_totals.iter().sum();

        let average_transaction = if acc.transaction_count > 0 {
            total_spent / acc.transaction_count as f64
        } else {
            0.0
        };
        let monthly_average = if months_with_data > 0 {
            total_spent / months_with_data as f64
        } else {
            0.0
        };

        let trend = self.analyzer.trend(&monthly_totals);
        let growth_rate = self.analyzer.growth_rate(&monthly_totals);
        let seasonality = self.analyzer.seasonality(&monthly_data);

        CategoryStats {
            total_spent,
            transaction_count: acc.transaction_count,
            average_transaction,
            monthly_average,
            months_with_data,
            monthly_data,
            monthly_totals,
            trend,
            growth_rate,
            seasonality,
        }
    }
}

/// Aggregate with default thresholds
pub fn aggregate(records: &[ExpenseRecord]) -> CategoryAnalysis {
    CategoryAggregator::new().aggregate(records)
}
