//! Tabular preview of the first rows, with an HTML rendering for display.

use polars::prelude::*;
use serde::Serialize;
use std::fmt::Write;

use super::DataProcessor;

/// Number of rows shown in a preview.
pub const PREVIEW_ROWS: usize = 5;

/// First rows of a table as plain text cells. Missing cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn from_dataframe(df: &DataFrame, max_rows: usize) -> PolarsResult<Self> {
        let head = df.head(Some(max_rows));
        let columns: Vec<String> = head
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = vec![Vec::with_capacity(columns.len()); head.height()];
        for column in head.get_columns() {
            for (row, cell) in rows.iter_mut().zip(DataProcessor::text_cells(column)?) {
                row.push(cell.unwrap_or_default());
            }
        }

        Ok(Self { columns, rows })
    }

    /// Render as an HTML table with a leading row-index column.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"table table-striped\">\n  <thead>\n    <tr>\n      <th></th>\n");
        for name in &self.columns {
            let _ = writeln!(html, "      <th>{}</th>", escape_html(name));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for (idx, row) in self.rows.iter().enumerate() {
            let _ = writeln!(html, "    <tr>\n      <th>{idx}</th>");
            for cell in row {
                let _ = writeln!(html, "      <td>{}</td>", escape_html(cell));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
