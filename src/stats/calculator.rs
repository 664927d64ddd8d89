//! Statistics Calculator Module
//! Descriptive statistics for every numeric column of a table.

use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::fmt::Write;

use crate::data::{escape_html, Coerced, DataProcessor};

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q1: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q3: f64,
    pub max: f64,
}

/// Statistics for all numeric columns, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SummaryStats {
    columns: Vec<ColumnStats>,
}

impl SummaryStats {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|s| s.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnStats> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render in the layout of a `describe()` table: one row per statistic,
    /// one column per numeric column. Empty when there is nothing to show.
    pub fn to_html(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        let rows: [(&str, fn(&ColumnStats) -> Option<f64>); 8] = [
            ("count", |s| Some(s.count as f64)),
            ("mean", |s| Some(s.mean)),
            ("std", |s| s.std),
            ("min", |s| Some(s.min)),
            ("25%", |s| Some(s.q1)),
            ("50%", |s| Some(s.median)),
            ("75%", |s| Some(s.q3)),
            ("max", |s| Some(s.max)),
        ];

        let mut html = String::from("<table class=\"table table-striped\">\n  <thead>\n    <tr>\n      <th></th>\n");
        for stats in &self.columns {
            let _ = writeln!(html, "      <th>{}</th>", escape_html(&stats.column));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for (label, extract) in rows {
            let _ = writeln!(html, "    <tr>\n      <th>{label}</th>");
            for stats in &self.columns {
                match extract(stats) {
                    Some(v) => {
                        let _ = writeln!(html, "      <td>{v:.6}</td>");
                    }
                    None => html.push_str("      <td>NaN</td>\n"),
                }
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Summarize every column whose non-missing cells all parse as numbers.
    pub fn summarize(df: &DataFrame) -> PolarsResult<SummaryStats> {
        let mut columns = Vec::new();

        for column in df.get_columns() {
            let cells = DataProcessor::numeric_cells(column)?;
            if cells.iter().any(Coerced::is_invalid) {
                continue;
            }
            let values: Vec<f64> = cells.into_iter().filter_map(Coerced::value).collect();
            if let Some(stats) = Self::compute_descriptive_stats(column.name().as_str(), &values) {
                columns.push(stats);
            }
        }

        tracing::debug!(numeric_columns = columns.len(), "summary statistics computed");
        Ok(SummaryStats { columns })
    }

    /// Compute descriptive statistics for an array of values.
    ///
    /// Returns `None` for an empty slice.
    pub fn compute_descriptive_stats(column: &str, values: &[f64]) -> Option<ColumnStats> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().mean();
        let std = if n > 1 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        Some(ColumnStats {
            column: column.to_string(),
            count: n,
            mean,
            std,
            min: sorted[0],
            q1: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q3: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        let (lo, hi) = (sorted_values[lower], sorted_values[upper]);
        if lower == upper {
            lo
        } else {
            (lo + (hi - lo) * frac).max(lo).min(hi)
        }
    }
}
