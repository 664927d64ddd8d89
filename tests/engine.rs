use polars::prelude::*;
use sales_insights::charts::{SeriesData, SALES_DISTRIBUTION, SALES_TIMELINE, TOP_PRODUCTS};
use sales_insights::{ColumnRole, InsightBundle, InsightEngine, Insights};

fn success(bundle: &InsightBundle) -> &Insights {
    bundle
        .insights()
        .unwrap_or_else(|| panic!("expected success, got {:?}", bundle.error()))
}

fn sample_orders() -> DataFrame {
    DataFrame::new(vec![
        Column::new(
            "Order Date".into(),
            ["2024-01-02", "2024-01-01", "2024-01-02"],
        ),
        Column::new("Total Amount".into(), [10.0, 25.5, 4.5]),
        Column::new("Item".into(), ["Widget", "Gadget", "Widget"]),
    ])
    .unwrap()
}

#[test]
fn typical_export_produces_all_three_charts() {
    let bundle = InsightEngine::analyze(&sample_orders());
    let insights = success(&bundle);

    assert_eq!(insights.total_records, 3);
    assert_eq!(insights.columns, vec!["Order Date", "Total Amount", "Item"]);
    assert_eq!(insights.roles.columns(ColumnRole::Date), ["Order Date"]);
    assert_eq!(insights.roles.columns(ColumnRole::Amount), ["Total Amount"]);
    assert_eq!(insights.roles.columns(ColumnRole::Product), ["Item"]);
    assert!(insights.roles.columns(ColumnRole::Customer).is_empty());

    let keys: Vec<&str> = insights.charts.keys().map(String::as_str).collect();
    assert_eq!(keys, vec![SALES_DISTRIBUTION, SALES_TIMELINE, TOP_PRODUCTS]);

    match &insights.charts[SALES_TIMELINE].data {
        SeriesData::TimeSeries { points } => {
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].date.to_string(), "2024-01-01");
            assert_eq!(points[0].value, 25.5);
            assert_eq!(points[1].value, 14.5);
        }
        other => panic!("unexpected series {other:?}"),
    }

    match &insights.charts[TOP_PRODUCTS].data {
        SeriesData::Ranking { entries } => {
            assert_eq!(entries[0].label, "Gadget");
            assert_eq!(entries[1].label, "Widget");
            assert_eq!(entries[1].value, 14.5);
        }
        other => panic!("unexpected series {other:?}"),
    }

    let metrics = insights.metrics.as_ref().expect("metrics");
    assert_eq!(metrics.total_sales, 40.0);
    assert_eq!(metrics.max_sale, 25.5);
    assert_eq!(metrics.min_sale, 4.5);
}

#[test]
fn unmatched_columns_yield_no_charts_or_metrics() {
    let df = DataFrame::new(vec![
        Column::new("id".into(), ["a1", "a2"]),
        Column::new("note".into(), ["first", "second"]),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    assert!(insights.charts.is_empty());
    assert!(insights.summary_stats.is_empty());
    assert!(insights.metrics.is_none());
    for role in ColumnRole::ALL {
        assert!(!insights.roles.has(role));
    }
}

#[test]
fn identical_amounts_fall_into_one_bin() {
    let df = DataFrame::new(vec![Column::new("sales".into(), [10i64, 10, 10])]).unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    let metrics = insights.metrics.as_ref().unwrap();
    assert_eq!(metrics.total_sales, 30.0);
    assert_eq!(metrics.average_sale, 10.0);

    match &insights.charts[SALES_DISTRIBUTION].data {
        SeriesData::Histogram { bins } => {
            assert_eq!(bins.len(), 1);
            assert_eq!(bins[0].count, 3);
        }
        other => panic!("unexpected series {other:?}"),
    }
}

#[test]
fn unparseable_date_drops_its_amount_from_timeline() {
    let df = DataFrame::new(vec![
        Column::new(
            "date".into(),
            ["2024-02-01", "2024-02-01", "someday", "2024-02-03", "2024-02-04"],
        ),
        Column::new("amount".into(), [1.0, 2.0, 100.0, 3.0, 4.0]),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    match &insights.charts[SALES_TIMELINE].data {
        SeriesData::TimeSeries { points } => {
            let total: f64 = points.iter().map(|p| p.value).sum();
            assert_eq!(total, 10.0);
            assert_eq!(points.len(), 3);
        }
        other => panic!("unexpected series {other:?}"),
    }
}

#[test]
fn all_dates_unreadable_skips_timeline_only() {
    let df = DataFrame::new(vec![
        Column::new("created".into(), ["soon", "later"]),
        Column::new("price".into(), [1.0, 2.0]),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    assert!(insights.charts.contains_key(SALES_DISTRIBUTION));
    assert!(!insights.charts.contains_key(SALES_TIMELINE));
}

#[test]
fn ranking_keeps_ten_largest_products() {
    let products: Vec<String> = (0..15).map(|i| format!("product-{i:02}")).collect();
    let amounts: Vec<f64> = (0..15).map(|i| f64::from(i) * 10.0).collect();
    let df = DataFrame::new(vec![
        Column::new("product".into(), products),
        Column::new("revenue".into(), amounts),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    match &insights.charts[TOP_PRODUCTS].data {
        SeriesData::Ranking { entries } => {
            assert_eq!(entries.len(), 10);
            assert_eq!(entries[0].label, "product-14");
            assert_eq!(entries[9].label, "product-05");
            assert!(entries.windows(2).all(|w| w[0].value >= w[1].value));
        }
        other => panic!("unexpected series {other:?}"),
    }
}

#[test]
fn non_numeric_amount_fails_whole_invocation() {
    let df = DataFrame::new(vec![
        Column::new("item".into(), ["a", "b"]),
        Column::new("price".into(), ["$10", "12"]),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    assert!(!bundle.is_success());
    let message = bundle.error().unwrap();
    assert!(message.contains("price"), "{message}");
    assert!(message.contains("$10"), "{message}");

    let json = serde_json::to_value(&bundle).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object.contains_key("error"));
}

#[test]
fn preview_and_stats_are_rendered() {
    let bundle = InsightEngine::analyze(&sample_orders());
    let insights = success(&bundle);

    assert_eq!(insights.preview.rows.len(), 3);
    assert!(insights.data_preview.contains("<th>Order Date</th>"));
    assert!(insights.data_preview.contains("<td>Widget</td>"));

    let stats = insights.summary_stats.get("Total Amount").expect("amount stats");
    assert_eq!(stats.count, 3);
    assert!(stats.min <= stats.q1 && stats.q1 <= stats.median);
    assert!(stats.median <= stats.q3 && stats.q3 <= stats.max);
    assert!(insights.summary_table.contains("<th>Total Amount</th>"));
}

#[test]
fn repeated_runs_are_identical() {
    let df = sample_orders();
    let first = serde_json::to_string(&InsightEngine::analyze(&df)).unwrap();
    let second = serde_json::to_string(&InsightEngine::analyze(&df)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn success_json_has_expected_shape() {
    let bundle = InsightEngine::analyze(&sample_orders());
    let json = serde_json::to_value(&bundle).unwrap();

    assert!(json.get("error").is_none());
    assert_eq!(json["total_records"], 3);
    assert_eq!(json["roles"]["date"][0], "Order Date");
    assert_eq!(json["metrics"]["total_sales"], 40.0);
    assert_eq!(json["charts"]["sales_distribution"]["kind"], "histogram");
    assert_eq!(json["charts"]["sales_timeline"]["points"][0]["date"], "2024-01-01");
    assert_eq!(json["summary_stats"][0]["column"], "Total Amount");
    assert!(json["summary_stats"][0].get("50%").is_some());
}

#[test]
fn all_blank_amounts_still_succeed() {
    let df = DataFrame::new(vec![
        Column::new("product".into(), ["a", "b"]),
        Column::new("total".into(), [None::<f64>, None]),
    ])
    .unwrap();

    let bundle = InsightEngine::analyze(&df);
    let insights = success(&bundle);
    assert!(insights.metrics.is_none());
    match &insights.charts[SALES_DISTRIBUTION].data {
        SeriesData::Histogram { bins } => assert!(bins.is_empty()),
        other => panic!("unexpected series {other:?}"),
    }
    match &insights.charts[TOP_PRODUCTS].data {
        SeriesData::Ranking { entries } => assert!(entries.iter().all(|e| e.value == 0.0)),
        other => panic!("unexpected series {other:?}"),
    }
}
