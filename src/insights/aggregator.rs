//! Insight Aggregator
//! Runs the distribution, time-series and ranking pipelines over the
//! columns picked by role classification.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::charts::{
    ChartPlotter, ChartSeries, RankedEntry, TimePoint, RANKING_LIMIT, SALES_DISTRIBUTION,
    SALES_TIMELINE, TOP_PRODUCTS,
};
use crate::data::{Coerced, ColumnRole, ColumnRoles, DataProcessor, BLANK_LABEL};
use crate::error::EngineError;

/// Headline figures for the primary amount column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesMetrics {
    pub total_sales: f64,
    pub average_sale: f64,
    pub max_sale: f64,
    pub min_sale: f64,
}

impl SalesMetrics {
    /// Metrics over a non-empty slice of amounts.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let total_sales: f64 = values.iter().sum();
        Some(Self {
            total_sales,
            average_sale: total_sales / values.len() as f64,
            max_sale: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_sale: values.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }
}

/// Output of every pipeline that ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub metrics: Option<SalesMetrics>,
    pub charts: BTreeMap<String, ChartSeries>,
}

pub struct InsightAggregator;

impl InsightAggregator {
    /// Run each pipeline whose required roles are present.
    ///
    /// Every pipeline needs an amount column, so without one nothing runs.
    pub fn aggregate(df: &DataFrame, roles: &ColumnRoles) -> Result<Aggregation, EngineError> {
        let mut aggregation = Aggregation::default();

        let Some(amount_col) = roles.primary(ColumnRole::Amount) else {
            tracing::debug!("no amount column; skipping aggregation");
            return Ok(aggregation);
        };
        let amounts = DataProcessor::numeric_cells(df.column(amount_col)?)?;

        let values = Self::distribution_values(amount_col, &amounts)?;
        aggregation.metrics = SalesMetrics::from_values(&values);
        aggregation.charts.insert(
            SALES_DISTRIBUTION.to_string(),
            ChartPlotter::sales_distribution(&values),
        );

        if let Some(date_col) = roles.primary(ColumnRole::Date) {
            let dates = DataProcessor::date_cells(df.column(date_col)?)?;
            let points = Self::daily_totals(&dates, &amounts);
            if points.is_empty() {
                tracing::warn!(date_col, amount_col, "no rows with a readable date; skipping timeline");
            } else {
                tracing::debug!(date_col, days = points.len(), "timeline built");
                aggregation
                    .charts
                    .insert(SALES_TIMELINE.to_string(), ChartPlotter::sales_timeline(points));
            }
        }

        if let Some(product_col) = roles.primary(ColumnRole::Product) {
            let labels = DataProcessor::label_cells(df.column(product_col)?)?;
            let entries = Self::top_groups(&labels, &amounts, RANKING_LIMIT);
            tracing::debug!(product_col, entries = entries.len(), "ranking built");
            aggregation
                .charts
                .insert(TOP_PRODUCTS.to_string(), ChartPlotter::top_products(entries));
        }

        Ok(aggregation)
    }

    /// Amounts feeding the distribution and headline metrics.
    ///
    /// This step is not guarded: an unreadable amount fails the whole
    /// invocation. A column with no numbers yields an empty slice.
    pub fn distribution_values(
        column: &str,
        amounts: &[Coerced<f64>],
    ) -> Result<Vec<f64>, EngineError> {
        let mut values = Vec::with_capacity(amounts.len());
        for cell in amounts {
            match cell {
                Coerced::Value(v) => values.push(*v),
                Coerced::Missing => {}
                Coerced::Invalid(raw) => {
                    return Err(EngineError::parse_failure(
                        column,
                        format!("'{raw}' is not a number"),
                    ));
                }
            }
        }
        Ok(values)
    }

    /// Sum amounts per calendar day, ascending by date.
    ///
    /// Rows whose date or amount did not convert are dropped.
    pub fn daily_totals(dates: &[Coerced<NaiveDate>], amounts: &[Coerced<f64>]) -> Vec<TimePoint> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, amount) in dates.iter().zip(amounts) {
            if let (Coerced::Value(date), Coerced::Value(amount)) = (date, amount) {
                *totals.entry(*date).or_insert(0.0) += amount;
            }
        }

        totals
            .into_iter()
            .map(|(date, value)| TimePoint { date, value })
            .collect()
    }

    /// The `limit` groups with the largest summed amount, descending.
    ///
    /// Every label forms a group even when none of its amounts converted
    /// (its sum is then zero). Missing keys form their own group, shown as
    /// [`BLANK_LABEL`] but never merged with a real label of that text.
    /// Ties keep first-encountered order.
    pub fn top_groups(
        labels: &[Option<String>],
        amounts: &[Coerced<f64>],
        limit: usize,
    ) -> Vec<RankedEntry> {
        let mut groups: Vec<RankedEntry> = Vec::new();
        let mut index: HashMap<Option<&str>, usize> = HashMap::new();

        for (label, amount) in labels.iter().zip(amounts) {
            let slot = *index.entry(label.as_deref()).or_insert_with(|| {
                groups.push(RankedEntry {
                    label: label.as_deref().unwrap_or(BLANK_LABEL).to_string(),
                    value: 0.0,
                });
                groups.len() - 1
            });
            if let Coerced::Value(v) = amount {
                groups[slot].value += v;
            }
        }

        groups.sort_by(|a, b| b.value.total_cmp(&a.value));
        groups.truncate(limit);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> Coerced<NaiveDate> {
        Coerced::Value(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    fn amount(v: f64) -> Coerced<f64> {
        Coerced::Value(v)
    }

    #[test]
    fn metrics_cover_all_values() {
        let metrics = SalesMetrics::from_values(&[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(metrics.total_sales, 30.0);
        assert_eq!(metrics.average_sale, 10.0);
        assert_eq!(metrics.max_sale, 10.0);
        assert_eq!(metrics.min_sale, 10.0);
        assert!(SalesMetrics::from_values(&[]).is_none());
    }

    #[test]
    fn distribution_skips_missing_but_rejects_text() {
        let ok = InsightAggregator::distribution_values("sales", &[amount(1.0), Coerced::Missing]).unwrap();
        assert_eq!(ok, vec![1.0]);

        let err = InsightAggregator::distribution_values(
            "sales",
            &[amount(1.0), Coerced::Invalid("abc".to_string())],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ParseFailure { ref column, .. } if column == "sales"));

        let empty = InsightAggregator::distribution_values("sales", &[Coerced::Missing]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn daily_totals_group_and_sort_by_day() {
        let dates = vec![date(3), date(1), Coerced::Invalid("soon".to_string()), date(3), date(2)];
        let amounts = vec![amount(5.0), amount(1.0), amount(100.0), amount(2.0), Coerced::Missing];
        let points = InsightAggregator::daily_totals(&dates, &amounts);

        let days: Vec<u32> = points.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(days, vec![1, 3]);
        assert_eq!(points[0].value, 1.0);
        assert_eq!(points[1].value, 7.0);
    }

    #[test]
    fn ranking_sums_per_label_and_keeps_first_on_ties() {
        let labels: Vec<Option<String>> = ["b", "a", "c", "a", "b", "d"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let amounts = vec![
            amount(2.0),
            amount(1.0),
            amount(5.0),
            amount(1.0),
            Coerced::Missing,
            Coerced::Invalid("x".to_string()),
        ];
        let ranked = InsightAggregator::top_groups(&labels, &amounts, RANKING_LIMIT);
        let order: Vec<(&str, f64)> = ranked.iter().map(|e| (e.label.as_str(), e.value)).collect();
        assert_eq!(order, vec![("c", 5.0), ("b", 2.0), ("a", 2.0), ("d", 0.0)]);
    }

    #[test]
    fn ranking_is_capped() {
        let labels: Vec<Option<String>> = (0..15).map(|i| Some(format!("p{i}"))).collect();
        let amounts: Vec<Coerced<f64>> = (0..15).map(|i| amount(f64::from(i))).collect();
        let ranked = InsightAggregator::top_groups(&labels, &amounts, RANKING_LIMIT);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].label, "p14");
        assert_eq!(ranked[9].label, "p5");
    }

    #[test]
    fn missing_keys_do_not_merge_with_a_blank_named_product() {
        let labels = vec![None, Some(BLANK_LABEL.to_string()), None];
        let amounts = vec![amount(1.0), amount(5.0), amount(2.0)];
        let ranked = InsightAggregator::top_groups(&labels, &amounts, RANKING_LIMIT);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].value, 5.0);
        assert_eq!(ranked[1].value, 3.0);
        assert!(ranked.iter().all(|e| e.label == BLANK_LABEL));
    }

    #[test]
    fn empty_amount_column_still_aggregates() {
        let df = DataFrame::new(vec![
            Column::new("order date".into(), vec![Some("2024-01-01"), Some("2024-01-02")]),
            Column::new("total".into(), vec![None::<f64>, None]),
            Column::new("product".into(), vec![Some("A"), Some("B")]),
        ])
        .unwrap();
        let roles = ColumnRoles::classify(["order date", "total", "product"]);
        let aggregation = InsightAggregator::aggregate(&df, &roles).unwrap();

        assert!(aggregation.metrics.is_none());
        assert!(!aggregation.charts.contains_key(SALES_TIMELINE));
        match &aggregation.charts[SALES_DISTRIBUTION].data {
            crate::charts::SeriesData::Histogram { bins } => assert!(bins.is_empty()),
            other => panic!("unexpected series {other:?}"),
        }
    }

    #[test]
    fn aggregate_without_amount_runs_nothing() {
        let df = DataFrame::new(vec![Column::new("order date".into(), vec!["2024-01-01"])]).unwrap();
        let roles = ColumnRoles::classify(["order date"]);
        let aggregation = InsightAggregator::aggregate(&df, &roles).unwrap();
        assert_eq!(aggregation, Aggregation::default());
    }
}
