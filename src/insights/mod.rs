//! Insights module - aggregation pipelines and bundle assembly

mod aggregator;
mod bundle;

pub use aggregator::{Aggregation, InsightAggregator, SalesMetrics};
pub use bundle::{InsightBundle, InsightEngine, Insights};
