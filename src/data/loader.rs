//! Table Loader Module
//! Reads CSV exports with Polars and spreadsheets with calamine into a
//! single in-memory DataFrame.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate, NaiveTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Unsupported file type '{extension}'; expected one of: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },
    #[error("File is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to open workbook: {0}")]
    Workbook(String),
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
}

/// Excel's 1900 date system counts days from this date.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

static EMPTY_CELL: Data = Data::Empty;

/// Loads uploaded sales exports subject to an upload policy.
#[derive(Debug, Clone)]
pub struct TableLoader {
    max_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TableLoader {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_bytes: config.max_upload_bytes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    /// Load a file, dispatching on its extension.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let path = path.as_ref();
        let extension = self.check_extension(path)?;

        let size = std::fs::metadata(path)?.len();
        if size > self.max_bytes {
            return Err(LoaderError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        tracing::info!(path = %path.display(), size, "loading table");
        let df = if extension == "csv" {
            Self::load_csv(path)?
        } else {
            Self::load_workbook(path)?
        };
        tracing::info!(rows = df.height(), columns = df.width(), "table loaded");
        Ok(df)
    }

    fn check_extension(&self, path: &Path) -> Result<String, LoaderError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if self.allowed_extensions.contains(&extension) {
            Ok(extension)
        } else {
            Err(LoaderError::UnsupportedExtension {
                extension,
                allowed: self.allowed_extensions.join(", "),
            })
        }
    }

    /// Load a CSV file using Polars.
    ///
    /// The schema is inferred from every row so no readable cell is nulled.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let path = PathBuf::from(path);
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Load the first worksheet of an xlsx/xls workbook.
    pub fn load_workbook(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| LoaderError::Workbook(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoaderError::EmptyWorkbook)?
            .map_err(|e| LoaderError::Workbook(e.to_string()))?;

        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
        Ok(Self::rows_to_dataframe(&rows)?)
    }

    /// Build a DataFrame from spreadsheet rows; the first row is the header.
    pub fn rows_to_dataframe(rows: &[Vec<Data>]) -> PolarsResult<DataFrame> {
        let Some(header_row) = rows.first() else {
            return Ok(DataFrame::default());
        };
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let headers = unique_headers(header_row, width);

        let mut columns = Vec::with_capacity(width);
        for (col_idx, header) in headers.iter().enumerate() {
            let cells: Vec<&Data> = rows
                .iter()
                .skip(1)
                .map(|row| row.get(col_idx).unwrap_or(&EMPTY_CELL))
                .collect();

            let all_numeric = cells
                .iter()
                .all(|cell| matches!(cell, Data::Int(_) | Data::Float(_) | Data::Empty | Data::Error(_)));
            let any_numeric = cells
                .iter()
                .any(|cell| matches!(cell, Data::Int(_) | Data::Float(_)));

            let column = if all_numeric && any_numeric {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(i) => Some(*i as f64),
                        Data::Float(f) => Some(*f),
                        _ => None,
                    })
                    .collect();
                Column::new(header.as_str().into(), values)
            } else {
                let values: Vec<Option<String>> = cells.iter().map(|cell| cell_text(cell)).collect();
                Column::new(header.as_str().into(), values)
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }
}

/// Text form of a spreadsheet cell; empty and error cells are missing.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            excel_serial_to_text(dt.as_f64()).unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Render an Excel serial date-time as `YYYY-MM-DD HH:MM:SS`.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let days = serial.trunc() as u64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as u32;
    let date = NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds.min(86_399), 0)?;
    Some(date.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Header names with blanks filled and duplicates suffixed `.1`, `.2`, ...
fn unique_headers(header_row: &[Data], width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    (0..width)
        .map(|idx| {
            let base = header_row
                .get(idx)
                .and_then(cell_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Unnamed: {idx}"));

            let mut name = base.clone();
            let mut counter = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{counter}");
                counter += 1;
            }
            name
        })
        .collect()
}
