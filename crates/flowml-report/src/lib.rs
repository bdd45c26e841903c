//! Reporting over decoded predictions.
//!
//! - **summary**: normal/attack counts and the per-attack breakdown
//! - **metrics**: accuracy and a per-class report for labeled batches

pub mod metrics;
pub mod summary;

pub use metrics::{AverageMetrics, ClassMetrics, ClassificationReport, classification_report};
pub use summary::{AttackCount, PredictionSummary};
