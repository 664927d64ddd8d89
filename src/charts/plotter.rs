//! Chart Plotter Module
//! Builds chart-ready data series for a plotting frontend.

use chrono::NaiveDate;
use serde::Serialize;

/// Key of the amount-distribution chart.
pub const SALES_DISTRIBUTION: &str = "sales_distribution";
/// Key of the amount-over-time chart.
pub const SALES_TIMELINE: &str = "sales_timeline";
/// Key of the top-products chart.
pub const TOP_PRODUCTS: &str = "top_products";

/// Number of equal-width bins in the amount histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Maximum number of entries in a ranking.
pub const RANKING_LIMIT: usize = 10;

/// One histogram bar covering `[start, end)`; the last bar also includes `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
}

/// The plotted data of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesData {
    Histogram { bins: Vec<HistogramBin> },
    TimeSeries { points: Vec<TimePoint> },
    Ranking { entries: Vec<RankedEntry> },
}

/// A precomputed chart: data plus title and axis labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(flatten)]
    pub data: SeriesData,
}

/// Creates chart series from aggregated values.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn sales_distribution(values: &[f64]) -> ChartSeries {
        ChartSeries {
            title: "Sales Amount Distribution".to_string(),
            x_label: "Amount".to_string(),
            y_label: "Frequency".to_string(),
            data: SeriesData::Histogram {
                bins: Self::histogram_bins(values, HISTOGRAM_BINS),
            },
        }
    }

    pub fn sales_timeline(points: Vec<TimePoint>) -> ChartSeries {
        ChartSeries {
            title: "Sales Over Time".to_string(),
            x_label: "Date".to_string(),
            y_label: "Sales Amount".to_string(),
            data: SeriesData::TimeSeries { points },
        }
    }

    pub fn top_products(entries: Vec<RankedEntry>) -> ChartSeries {
        ChartSeries {
            title: format!("Top {RANKING_LIMIT} Products by Sales"),
            x_label: "Product".to_string(),
            y_label: "Sales Amount".to_string(),
            data: SeriesData::Ranking { entries },
        }
    }

    /// Bucket values into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// When every value is identical a single bin holds them all.
    pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            return vec![HistogramBin {
                start: min,
                end: max,
                count: values.len(),
            }];
        }

        // Halved so the span between extreme finite values stays finite.
        let half_span = max / 2.0 - min / 2.0;
        let edge = |i: usize| min + half_span * (2.0 * i as f64 / bins as f64);

        let mut counts = vec![0usize; bins];
        for &v in values {
            let position = (v / 2.0 - min / 2.0) / half_span * bins as f64;
            let idx = if position.is_nan() {
                bins - 1
            } else {
                position.floor() as usize
            };
            counts[idx.min(bins - 1)] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: edge(i),
                end: if i + 1 == bins { max } else { edge(i + 1) },
                count,
            })
            .collect()
    }
}
