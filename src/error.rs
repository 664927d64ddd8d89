//! Error types for the insight engine.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::data::LoaderError;

/// Every way a single engine invocation can fail.
///
/// The engine never hands these to the presentation layer directly; the
/// assembly boundary turns them into [`InsightBundle::Failure`](crate::InsightBundle)
/// carrying the `Display` text.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unreadable table: {0}")]
    UnreadableTable(#[from] LoaderError),
    #[error("Could not interpret column '{column}': {reason}")]
    ParseFailure { column: String, reason: String },
    #[error("Table access failed: {0}")]
    Polars(#[from] PolarsError),
}

impl EngineError {
    pub(crate) fn parse_failure(column: &str, reason: impl Into<String>) -> Self {
        EngineError::ParseFailure {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
