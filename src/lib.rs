//! Sales Insights - role inference, statistics and chart-ready aggregations
//! for arbitrary tabular sales exports.
//!
//! The engine takes a loaded table and returns an [`InsightBundle`]: either
//! the full set of insights or a single error message, never both.
//!
//! ```
//! use polars::prelude::*;
//! use sales_insights::InsightEngine;
//!
//! let df = DataFrame::new(vec![
//!     Column::new("Order Date".into(), ["2024-01-01", "2024-01-02"]),
//!     Column::new("Total Amount".into(), [10.0, 20.0]),
//! ])
//! .unwrap();
//!
//! let bundle = InsightEngine::analyze(&df);
//! let insights = bundle.insights().unwrap();
//! assert_eq!(insights.metrics.as_ref().unwrap().total_sales, 30.0);
//! ```

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod insights;
pub mod logging;
pub mod stats;

pub use config::Config;
pub use data::{ColumnRole, ColumnRoles, TableLoader};
pub use error::EngineError;
pub use insights::{InsightBundle, InsightEngine, Insights};
