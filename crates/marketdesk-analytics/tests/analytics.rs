// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics over a seeded temp-file database.

use chrono::Utc;
use marketdesk_analytics::{AnalyticsEngine, Window};
use marketdesk_config::model::AnalyticsConfig;
use marketdesk_core::{MarketdeskError, OrderStatus, Period};
use marketdesk_storage::models::NewProduct;
use marketdesk_storage::queries::products;
use marketdesk_test_utils::{OZON_ID, TestHarness, WILDBERRIES_ID, credentials};

/// Three orders this week, one the week before, one three weeks ago.
async fn seeded() -> TestHarness {
    let harness = TestHarness::new().await.unwrap();
    let seed = [
        ("A-1", OZON_ID, "anna@example.com", OrderStatus::Delivered, 1000.0, 1),
        ("B-1", WILDBERRIES_ID, "boris@example.com", OrderStatus::Cancelled, 500.0, 2),
        ("C-1", OZON_ID, "anna@example.com", OrderStatus::New, 300.0, 0),
        ("D-1", OZON_ID, "vera@example.com", OrderStatus::Shipped, 200.0, 10),
        ("E-1", WILDBERRIES_ID, "vera@example.com", OrderStatus::Delivered, 700.0, 20),
    ];
    for (number, mp, email, status, total, days_ago) in seed {
        harness
            .seed_order(number, mp, email, status, total, days_ago)
            .await
            .unwrap();
    }
    harness
}

fn engine(harness: &TestHarness) -> AnalyticsEngine {
    AnalyticsEngine::new(harness.db.clone(), &AnalyticsConfig::default())
}

#[tokio::test]
async fn weekly_summary_counts_all_statuses_and_compares_to_previous_week() {
    let harness = seeded().await;
    let window = Window::trailing(Period::Week, Utc::now());
    let summary = engine(&harness).summary(&window).await.unwrap();

    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.total_revenue, 1800.0);
    assert_eq!(summary.average_order_value, 600.0);
    assert_eq!(summary.active_marketplaces, 2);
    // 3 orders against 1 the week before.
    assert_eq!(summary.growth_rate, 200.0);
}

#[tokio::test]
async fn report_includes_daily_series_and_breakdown() {
    let harness = seeded().await;
    let report = engine(&harness).report("7d").await.unwrap();

    assert_eq!(report.period, "7d");
    assert_eq!(report.daily.len(), 3);
    assert!(report.daily.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(report.daily.iter().map(|p| p.orders).sum::<i64>(), 3);

    assert_eq!(report.by_marketplace.len(), 2);
    assert_eq!(report.by_marketplace[0].name, "Ozon");
    assert_eq!(report.by_marketplace[0].orders, 2);
    assert_eq!(report.by_marketplace[0].revenue, 1300.0);
    assert_eq!(report.by_marketplace[1].marketplace_id, WILDBERRIES_ID);
    assert_eq!(report.by_marketplace[1].revenue, 500.0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["summary"]["totalOrders"].is_number());
    assert!(json["byMarketplace"].is_array());
}

#[tokio::test]
async fn monthly_report_reaches_older_orders() {
    let harness = seeded().await;
    let report = engine(&harness).report("30d").await.unwrap();
    assert_eq!(report.summary.total_orders, 5);
    assert_eq!(report.summary.total_revenue, 2700.0);
    // Nothing in the 30 days before that.
    assert_eq!(report.summary.growth_rate, 100.0);
}

#[tokio::test]
async fn empty_database_reports_zeroes() {
    let harness = TestHarness::new().await.unwrap();
    let report = engine(&harness).report("90d").await.unwrap();
    assert_eq!(report.summary.total_orders, 0);
    assert_eq!(report.summary.average_order_value, 0.0);
    assert_eq!(report.summary.growth_rate, 0.0);
    assert!(report.daily.is_empty());
    assert!(report.by_marketplace.is_empty());
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let harness = TestHarness::new().await.unwrap();
    let err = engine(&harness).report("14d").await.unwrap_err();
    assert!(matches!(err, MarketdeskError::Validation(_)));
    let err = engine(&harness).conversion_funnel("").await.unwrap_err();
    assert!(matches!(err, MarketdeskError::Validation(_)));
}

#[tokio::test]
async fn funnel_excludes_cancelled_orders() {
    let harness = seeded().await;
    let funnel = engine(&harness).conversion_funnel("7d").await.unwrap();
    assert_eq!(funnel.completed, 2);
    assert_eq!(funnel.views, 6);
    assert_eq!(funnel.cart_adds, 4);
    assert_eq!(funnel.checkouts, 3);
    assert!(funnel.synthetic);
}

#[tokio::test]
async fn dashboard_snapshot_reflects_catalog_and_orders() {
    let harness = seeded().await;
    harness
        .connect(1, "ozon", &credentials("key", Some("42")))
        .await
        .unwrap();
    for (sku, stock) in [("LOW-1", 3), ("FULL-1", 50), ("LOW-2", 0)] {
        products::create_product(
            &harness.db,
            &NewProduct {
                sku: sku.to_string(),
                name: format!("Product {sku}"),
                price: 100.0,
                stock,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let config = AnalyticsConfig {
        low_stock_threshold: 10,
        recent_orders_limit: 2,
    };
    let snapshot = AnalyticsEngine::new(harness.db.clone(), &config)
        .dashboard_snapshot()
        .await
        .unwrap();

    assert_eq!(snapshot.stats.total_marketplaces, 6);
    assert_eq!(snapshot.stats.connected_marketplaces, 1);
    assert_eq!(snapshot.stats.total_products, 3);
    assert_eq!(snapshot.stats.total_orders, 5);
    assert_eq!(snapshot.stats.total_revenue, 2700.0);

    assert_eq!(snapshot.recent_orders.len(), 2);
    assert_eq!(snapshot.recent_orders[0].order_number, "C-1");

    let low: Vec<_> = snapshot
        .low_stock_products
        .iter()
        .map(|p| p.sku.as_str())
        .collect();
    assert_eq!(low, vec!["LOW-2", "LOW-1"]);
}
