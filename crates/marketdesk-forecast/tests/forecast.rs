// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{Duration, Utc};
use marketdesk_config::model::ForecastConfig;
use marketdesk_core::{MarketdeskError, OrderStatus, format_timestamp};
use marketdesk_forecast::{AnomalyKind, ForecastEngine, MAX_CONFIDENCE, RiskLevel, Severity};
use marketdesk_storage::models::{NewOrder, NewOrderItem, NewProduct, Product};
use marketdesk_storage::queries::{orders, products};
use marketdesk_test_utils::{OZON_ID, TestHarness, WILDBERRIES_ID};

fn engine(harness: &TestHarness) -> ForecastEngine {
    ForecastEngine::new(harness.db.clone(), &ForecastConfig::default())
}

async fn create(harness: &TestHarness, sku: &str, category: &str) -> Product {
    products::create_product(
        &harness.db,
        &NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            price: 100.0,
            stock: 20,
            category: Some(category.to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

/// One order of `quantity` x `sku`, `days_ago` days before now.
async fn sell(
    harness: &TestHarness,
    number: &str,
    sku: &str,
    quantity: i64,
    status: OrderStatus,
    days_ago: i64,
) {
    let new = NewOrder {
        order_number: number.to_string(),
        customer_id: None,
        marketplace_id: Some(OZON_ID),
        status,
        fulfillment_type: None,
        total_amount: 100.0 * quantity as f64,
        items_count: quantity,
        shipping_address: None,
        created_at: format_timestamp(Utc::now() - Duration::days(days_ago)),
        shipped_at: None,
    };
    let item = NewOrderItem {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        quantity,
        price: 100.0,
    };
    orders::insert_order(&harness.db, &new, &[item]).await.unwrap();
}

#[tokio::test]
async fn sales_forecast_applies_weekly_trend() {
    let harness = TestHarness::new().await.unwrap();
    let product = create(&harness, "TWS-001", "Electronics").await;
    // One unit a day two weeks ago, two a day last week.
    for days_ago in 0..14 {
        let qty = if days_ago < 7 { 2 } else { 1 };
        sell(&harness, &format!("S-{days_ago}"), "TWS-001", qty, OrderStatus::Delivered, days_ago).await;
    }

    let forecast = engine(&harness)
        .sales_forecast(product.id, None)
        .await
        .unwrap();

    assert_eq!(forecast.data_points, 14);
    assert_eq!(forecast.avg_daily_sales, 1.5);
    assert_eq!(forecast.trend_factor, 2.0);
    assert_eq!(forecast.forecast.len(), 7);
    // 1.5 x 2.0 x 1.02 = 3.06 on day one, 1.5 x 2.0 x 1.14 = 3.42 on day seven.
    assert!(forecast.forecast.iter().all(|p| p.predicted_sales == 3));
    assert!((forecast.confidence - 0.84).abs() < 1e-9);
    assert!(forecast.forecast.iter().all(|p| p.confidence <= MAX_CONFIDENCE));

    let stored = engine(&harness)
        .list_predictions(Some("sales_forecast"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].product_id, Some(product.id));
    assert_eq!(stored[0].prediction_value.as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn sales_forecast_without_history_is_empty() {
    let harness = TestHarness::new().await.unwrap();
    let product = create(&harness, "NEW-1", "Electronics").await;
    let forecast = engine(&harness)
        .sales_forecast(product.id, Some(14))
        .await
        .unwrap();
    assert!(forecast.forecast.is_empty());
    assert_eq!(forecast.confidence, 0.0);
    assert!(forecast.message.is_some());
    assert!(engine(&harness).list_predictions(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn sales_forecast_validates_inputs() {
    let harness = TestHarness::new().await.unwrap();
    let product = create(&harness, "TWS-001", "Electronics").await;
    let engine = engine(&harness);

    for horizon in [0, 91] {
        let err = engine
            .sales_forecast(product.id, Some(horizon))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketdeskError::Validation(_)), "{horizon}");
    }
    assert_eq!(
        engine.sales_forecast(product.id, Some(90)).await.unwrap().product_id,
        product.id
    );

    let err = engine.sales_forecast(9999, None).await.unwrap_err();
    assert!(matches!(err, MarketdeskError::NotFound { entity: "product", .. }));
}

#[tokio::test]
async fn returns_prediction_rates_risk() {
    let harness = TestHarness::new().await.unwrap();
    let product = create(&harness, "JEANS-CL-01", "Clothing").await;
    for i in 0..10 {
        let status = if i < 2 {
            OrderStatus::Returned
        } else {
            OrderStatus::Delivered
        };
        sell(&harness, &format!("R-{i}"), "JEANS-CL-01", 1, status, i).await;
    }

    let prediction = engine(&harness)
        .returns_prediction(product.id)
        .await
        .unwrap();
    assert_eq!(prediction.total_orders, 10);
    assert_eq!(prediction.returned_orders, 2);
    assert_eq!(prediction.return_probability, 0.2);
    assert_eq!(prediction.risk_level, Some(RiskLevel::High));
    assert_eq!(prediction.confidence, 0.6);

    let stored = engine(&harness)
        .list_predictions(Some("returns_prediction"))
        .await
        .unwrap();
    assert_eq!(stored[0].prediction_value["riskLevel"], "high");
}

#[tokio::test]
async fn returns_prediction_falls_back_without_orders() {
    let harness = TestHarness::new().await.unwrap();
    let product = create(&harness, "TSHIRT-001", "Clothing").await;
    let prediction = engine(&harness)
        .returns_prediction(product.id)
        .await
        .unwrap();
    assert_eq!(prediction.return_probability, 0.05);
    assert_eq!(prediction.confidence, 0.3);
    assert!(prediction.risk_level.is_none());
    assert!(prediction.message.is_some());

    let err = engine(&harness).returns_prediction(404).await.unwrap_err();
    assert!(matches!(err, MarketdeskError::NotFound { .. }));
}

#[tokio::test]
async fn anomaly_detection_flags_revenue_spike() {
    let harness = TestHarness::new().await.unwrap();
    for days_ago in 0..7 {
        let total = if days_ago == 0 { 1000.0 } else { 100.0 };
        harness
            .seed_order(
                &format!("W-{days_ago}"),
                WILDBERRIES_ID,
                "anna@example.com",
                OrderStatus::Delivered,
                total,
                days_ago,
            )
            .await
            .unwrap();
    }

    let report = engine(&harness)
        .anomaly_detection(WILDBERRIES_ID)
        .await
        .unwrap();
    assert_eq!(report.data_points, 7);
    assert_eq!(report.anomalies.len(), 1);
    let spike = &report.anomalies[0];
    assert_eq!(spike.kind, AnomalyKind::Spike);
    assert_eq!(spike.severity, Severity::Medium);
    assert_eq!(spike.deviation, 2.45);
    assert_eq!(spike.revenue, 1000.0);
    assert_eq!(report.avg_revenue, 228.57);

    let stored = engine(&harness)
        .list_predictions(Some("anomaly_detection"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].marketplace_id, Some(WILDBERRIES_ID));
    assert_eq!(stored[0].confidence_score, 0.85);
    assert_eq!(stored[0].prediction_value["anomaliesCount"], 1);
}

#[tokio::test]
async fn anomaly_detection_needs_a_week_of_data() {
    let harness = TestHarness::new().await.unwrap();
    for days_ago in 0..3 {
        harness
            .seed_order(
                &format!("O-{days_ago}"),
                OZON_ID,
                "boris@example.com",
                OrderStatus::New,
                100.0,
                days_ago,
            )
            .await
            .unwrap();
    }
    let report = engine(&harness).anomaly_detection(OZON_ID).await.unwrap();
    assert!(report.anomalies.is_empty());
    assert_eq!(report.data_points, 3);
    assert!(report.message.is_some());
    assert!(engine(&harness).list_predictions(None).await.unwrap().is_empty());

    let err = engine(&harness).anomaly_detection(77).await.unwrap_err();
    assert!(matches!(err, MarketdeskError::NotFound { .. }));
}

#[tokio::test]
async fn demand_forecast_ranks_category() {
    let harness = TestHarness::new().await.unwrap();
    let jeans = create(&harness, "JEANS-CL-01", "Clothing").await;
    let shirt = create(&harness, "TSHIRT-001", "Clothing").await;
    let idle = create(&harness, "SOCKS-01", "Clothing").await;
    create(&harness, "PB-20K", "Accessories").await;

    sell(&harness, "D-1", "TSHIRT-001", 3, OrderStatus::Delivered, 1).await;
    sell(&harness, "D-2", "JEANS-CL-01", 1, OrderStatus::Delivered, 2).await;
    sell(&harness, "D-3", "PB-20K", 9, OrderStatus::Delivered, 2).await;
    // Outside the 30-day history.
    sell(&harness, "D-4", "JEANS-CL-01", 50, OrderStatus::Delivered, 45).await;

    let demand = engine(&harness).demand_forecast("Clothing").await.unwrap();
    assert_eq!(demand.total_sales, 4);
    let ids: Vec<i64> = demand.forecast.iter().map(|d| d.product_id).collect();
    assert_eq!(ids, vec![shirt.id, jeans.id, idle.id]);

    assert_eq!(demand.forecast[0].demand_score, 75.0);
    assert_eq!(demand.forecast[0].recommended_stock, 5);
    assert_eq!(demand.forecast[1].demand_score, 25.0);
    assert_eq!(demand.forecast[1].recommended_stock, 2);
    assert_eq!(demand.forecast[2].total_quantity, 0);
    assert_eq!(demand.forecast[2].demand_score, 0.0);

    let empty = engine(&harness).demand_forecast("Garden").await.unwrap();
    assert!(empty.forecast.is_empty());
    assert_eq!(empty.total_sales, 0);
}

#[tokio::test]
async fn unknown_prediction_type_is_rejected() {
    let harness = TestHarness::new().await.unwrap();
    let err = engine(&harness)
        .list_predictions(Some("weather"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketdeskError::Validation(_)));
}
