//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analysis` - Analysis commands (analyze, forecast, alerts, insights)
//! - `core` - Shared utilities (config, records, budgets, output)
//! - `patterns` - Pattern predictor commands (train, predict)
//! - `status` - Status command

pub mod analysis;
pub mod core;
pub mod patterns;
pub mod status;

// Re-export command functions for main.rs
pub use analysis::*;
pub use core::*;
pub use patterns::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
