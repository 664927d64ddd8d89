//! Charts module - Chart-ready data series

mod plotter;

pub use plotter::{
    ChartPlotter, ChartSeries, HistogramBin, RankedEntry, SeriesData, TimePoint, HISTOGRAM_BINS,
    RANKING_LIMIT, SALES_DISTRIBUTION, SALES_TIMELINE, TOP_PRODUCTS,
};
