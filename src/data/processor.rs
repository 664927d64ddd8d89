//! Data Processor Module
//! Explicit per-cell coercion of uncontrolled table values into numbers,
//! calendar dates and group labels.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Textual markers read as a missing cell.
const NULL_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// Label used for rows whose group key is missing.
pub const BLANK_LABEL: &str = "(blank)";

/// Date-only layouts tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%b %d, %Y",
    "%d %b %Y",
];

/// Date-time layouts tried in order. Time of day is discarded after parsing.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// Outcome of converting one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    /// The cell converted cleanly.
    Value(T),
    /// The cell is absent (null, blank, or a null marker).
    Missing,
    /// The cell holds something that cannot be read as `T`; the raw text is kept.
    Invalid(String),
}

impl<T> Coerced<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Coerced::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Coerced::Invalid(_))
    }
}

/// Returns true for primitive numeric polars dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_missing_text(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_MARKERS.contains(&trimmed)
}

/// Parse a single text cell as a number.
pub fn parse_number(raw: &str) -> Coerced<f64> {
    if is_missing_text(raw) {
        return Coerced::Missing;
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_nan() => Coerced::Missing,
        Ok(v) if v.is_infinite() => Coerced::Invalid(raw.to_string()),
        Ok(v) => Coerced::Value(v),
        Err(_) => Coerced::Invalid(raw.to_string()),
    }
}

/// Parse a single text cell as a calendar date.
pub fn parse_date(raw: &str) -> Coerced<NaiveDate> {
    if is_missing_text(raw) {
        return Coerced::Missing;
    }
    let s = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Coerced::Value(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Coerced::Value(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Coerced::Value(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Coerced::Value(dt.date_naive());
    }
    // Native datetimes rendered by polars can carry a zone suffix after the clock.
    if let Some(head) = s.get(..10) {
        let separator = s.as_bytes().get(10).copied();
        if matches!(separator, Some(b' ') | Some(b'T')) {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Coerced::Value(date);
            }
        }
    }

    Coerced::Invalid(raw.to_string())
}

/// Converts whole table columns into per-row coerced cells.
pub struct DataProcessor;

impl DataProcessor {
    /// Numeric view of a column, one entry per row.
    pub fn numeric_cells(column: &Column) -> PolarsResult<Vec<Coerced<f64>>> {
        let dtype = column.dtype();

        if is_numeric_dtype(dtype) {
            let value_f64 = column.cast(&DataType::Float64)?;
            let value_ca = value_f64.f64()?;
            return Ok(value_ca
                .into_iter()
                .map(|v| match v {
                    Some(v) if v.is_finite() => Coerced::Value(v),
                    Some(v) if v.is_infinite() => Coerced::Invalid(v.to_string()),
                    _ => Coerced::Missing,
                })
                .collect());
        }

        if dtype == &DataType::String {
            let ca = column.as_materialized_series().str()?;
            return Ok(ca
                .into_iter()
                .map(|v| v.map(parse_number).unwrap_or(Coerced::Missing))
                .collect());
        }

        // Booleans, temporal and nested values are not amounts.
        Ok(Self::text_cells(column)?
            .into_iter()
            .map(|v| match v {
                Some(raw) if !is_missing_text(&raw) => Coerced::Invalid(raw),
                _ => Coerced::Missing,
            })
            .collect())
    }

    /// Calendar-date view of a column, one entry per row.
    pub fn date_cells(column: &Column) -> PolarsResult<Vec<Coerced<NaiveDate>>> {
        if is_numeric_dtype(column.dtype()) {
            return Ok(Self::text_cells(column)?
                .into_iter()
                .map(|v| match v {
                    Some(raw) => Coerced::Invalid(raw),
                    None => Coerced::Missing,
                })
                .collect());
        }

        Ok(Self::text_cells(column)?
            .into_iter()
            .map(|v| v.as_deref().map(parse_date).unwrap_or(Coerced::Missing))
            .collect())
    }

    /// Group-label view of a column. Null and blank keys are `None`.
    pub fn label_cells(column: &Column) -> PolarsResult<Vec<Option<String>>> {
        Ok(Self::text_cells(column)?
            .into_iter()
            .map(|v| v.filter(|raw| !raw.trim().is_empty()))
            .collect())
    }

    /// Raw text of every cell, `None` for nulls.
    pub fn text_cells(column: &Column) -> PolarsResult<Vec<Option<String>>> {
        let as_text = if column.dtype() == &DataType::String {
            column.clone()
        } else {
            column.cast(&DataType::String)?
        };
        let ca = as_text.as_materialized_series().str()?;
        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }
}
