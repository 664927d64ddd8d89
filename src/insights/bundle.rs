//! Insight Bundle assembly
//! Composes classification, statistics and aggregation into one bundle and
//! turns any failure into the bundle's error variant.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::aggregator::{InsightAggregator, SalesMetrics};
use crate::charts::ChartSeries;
use crate::data::{ColumnRoles, TableLoader, TablePreview, PREVIEW_ROWS};
use crate::error::EngineError;
use crate::stats::{StatsCalculator, SummaryStats};

/// Everything derived from one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub roles: ColumnRoles,
    pub preview: TablePreview,
    /// HTML rendering of `preview`.
    pub data_preview: String,
    pub summary_stats: SummaryStats,
    /// HTML rendering of `summary_stats`.
    pub summary_table: String,
    pub metrics: Option<SalesMetrics>,
    pub charts: BTreeMap<String, ChartSeries>,
}

/// Result of one engine invocation: either full insights or a single message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightBundle {
    Success(Box<Insights>),
    Failure { error: String },
}

impl InsightBundle {
    pub fn is_success(&self) -> bool {
        matches!(self, InsightBundle::Success(_))
    }

    pub fn insights(&self) -> Option<&Insights> {
        match self {
            InsightBundle::Success(insights) => Some(insights.as_ref()),
            InsightBundle::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InsightBundle::Success(_) => None,
            InsightBundle::Failure { error } => Some(error.as_str()),
        }
    }
}

impl From<Result<Insights, EngineError>> for InsightBundle {
    fn from(result: Result<Insights, EngineError>) -> Self {
        match result {
            Ok(insights) => InsightBundle::Success(Box::new(insights)),
            Err(e) => {
                tracing::warn!(error = %e, "insight engine failed");
                InsightBundle::Failure {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Entry points of the engine. Each call is independent and holds no state.
pub struct InsightEngine;

impl InsightEngine {
    /// Analyze an already loaded table.
    pub fn analyze(df: &DataFrame) -> InsightBundle {
        Self::try_analyze(df).into()
    }

    /// Load a file with `loader`, then analyze it. Loader failures become the
    /// error variant like any other failure.
    pub fn analyze_file(path: impl AsRef<Path>, loader: &TableLoader) -> InsightBundle {
        loader
            .load(path)
            .map_err(EngineError::from)
            .and_then(|df| Self::try_analyze(&df))
            .into()
    }

    /// Fallible core used by the entry points.
    pub fn try_analyze(df: &DataFrame) -> Result<Insights, EngineError> {
        tracing::info!(rows = df.height(), columns = df.width(), "analyzing table");

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let roles = ColumnRoles::classify(&columns);

        let preview = TablePreview::from_dataframe(df, PREVIEW_ROWS)?;
        let summary_stats = StatsCalculator::summarize(df)?;
        let aggregation = InsightAggregator::aggregate(df, &roles)?;

        tracing::info!(
            charts = aggregation.charts.len(),
            numeric_columns = summary_stats.len(),
            "analysis complete"
        );

        Ok(Insights {
            total_records: df.height(),
            data_preview: preview.to_html(),
            summary_table: summary_stats.to_html(),
            columns,
            roles,
            preview,
            summary_stats,
            metrics: aggregation.metrics,
            charts: aggregation.charts,
        })
    }
}
