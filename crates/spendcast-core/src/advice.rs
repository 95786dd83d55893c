//! Spending advice attached to point predictions
//!
//! Places a predicted amount in context: a broader expense category than the
//! pattern tables use, a coarse spending level and plain-language
//! recommendations.

use serde::{Deserialize, Serialize};

/// Expense categories for advice, checked top to bottom
///
/// Wider than the predictor's lookup categories: adds healthcare and
/// education.
pub const EXPENSE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "food",
        &["lunch", "dinner", "breakfast", "food", "meal", "restaurant"],
    ),
    ("transport", &["taxi", "bus", "uber", "ola", "transport", "fuel"]),
    ("entertainment", &["movie", "party", "entertainment", "fun"]),
    ("shopping", &["shopping", "clothes", "buy"]),
    ("bills", &["bill", "electricity", "rent"]),
    ("healthcare", &["doctor", "medicine", "hospital"]),
    ("education", &["book", "course", "education"]),
];

/// Expense category for free-text subject, "other" when nothing matches
pub fn categorize_expense(subject: &str) -> &'static str {
    let subject = subject.to_lowercase();
    EXPENSE_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| subject.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or("other")
}

/// Coarse size of a single expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl SpendingLevel {
    /// Upper bounds are inclusive: 100, 500, 2000
    pub fn from_amount(amount: f64) -> Self {
        if amount <= 100.0 {
            Self::Low
        } else if amount <= 500.0 {
            Self::Medium
        } else if amount <= 2000.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl std::fmt::Display for SpendingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advice for one predicted expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAdvice {
    pub expense_category: String,
    pub spending_level: SpendingLevel,
    pub recommendations: Vec<String>,
}

impl SpendingAdvice {
    pub fn for_prediction(subject: &str, amount: f64) -> Self {
        let category = categorize_expense(subject);
        Self {
            expense_category: category.to_string(),
            spending_level: SpendingLevel::from_amount(amount),
            recommendations: recommendations(amount, category),
        }
    }
}

/// Recommendations for an amount in a given expense category
pub fn recommendations(amount: f64, category: &str) -> Vec<String> {
    let mut tips = Vec::new();

    if amount > 1000.0 {
        tips.push("Consider if this expense is necessary".to_string());
        tips.push("Look for alternatives to reduce cost".to_string());
    }
    if category == "food" && amount > 500.0 {
        tips.push("Consider cooking at home to save money".to_string());
    }
    if category == "transport" && amount > 300.0 {
        tips.push("Consider public transport or carpooling".to_string());
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_expense() {
        assert_eq!(categorize_expense("Team LUNCH"), "food");
        assert_eq!(categorize_expense("doctor visit"), "healthcare");
        assert_eq!(categorize_expense("Rust course"), "education");
        assert_eq!(categorize_expense("gift"), "other");
        // First match wins: "bus" before "book"
        assert_eq!(categorize_expense("bus to book fair"), "transport");
    }

    #[test]
    fn test_spending_level_cut_points() {
        assert_eq!(SpendingLevel::from_amount(0.0), SpendingLevel::Low);
        assert_eq!(SpendingLevel::from_amount(100.0), SpendingLevel::Low);
        assert_eq!(SpendingLevel::from_amount(100.01), SpendingLevel::Medium);
        assert_eq!(SpendingLevel::from_amount(500.0), SpendingLevel::Medium);
        assert_eq!(SpendingLevel::from_amount(2000.0), SpendingLevel::High);
        assert_eq!(SpendingLevel::from_amount(2000.5), SpendingLevel::VeryHigh);
        assert_eq!(SpendingLevel::VeryHigh.to_string(), "very_high");
    }

    #[test]
    fn test_recommendations() {
        assert!(recommendations(50.0, "food").is_empty());
        assert_eq!(
            recommendations(600.0, "food"),
            vec!["Consider cooking at home to save money"]
        );
        assert_eq!(
            recommendations(350.0, "transport"),
            vec!["Consider public transport or carpooling"]
        );
        assert_eq!(recommendations(1500.0, "bills").len(), 2);
        assert_eq!(recommendations(1500.0, "food").len(), 3);
    }

    #[test]
    fn test_advice_serializes_level_in_snake_case() {
        let advice = SpendingAdvice::for_prediction("Hospital bill", 2500.0);
        assert_eq!(advice.expense_category, "bills");
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["spending_level"], "very_high");
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 2);
    }
}
