// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router behavior end to end: envelope, auth, dispatch, and webhooks.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use marketdesk_analytics::AnalyticsEngine;
use marketdesk_config::model::{AnalyticsConfig, ForecastConfig};
use marketdesk_core::{OrderStatus, UpstreamFailure};
use marketdesk_forecast::ForecastEngine;
use marketdesk_gateway::{AppState, AuthConfig, router};
use marketdesk_prometheus::PrometheusExporter;
use marketdesk_sync::{OzonWebhookProcessor, SyncEngine};
use marketdesk_test_utils::{
    MockClientFactory, MockMarketplace, MockOperation, OZON_ID, TestHarness, credentials, order,
    product,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    harness: TestHarness,
    ozon: MockMarketplace,
    router: Router,
}

async fn app(bearer_token: Option<&str>) -> TestApp {
    let harness = TestHarness::new().await.unwrap();
    let ozon = MockMarketplace::new("ozon");
    let factory = Arc::new(MockClientFactory::new().with_marketplace(ozon.clone()));
    let db = harness.db.clone();
    let state = AppState {
        db: db.clone(),
        sync: SyncEngine::new(db.clone(), factory),
        analytics: AnalyticsEngine::new(db.clone(), &AnalyticsConfig::default()),
        forecast: ForecastEngine::new(db.clone(), &ForecastConfig::default()),
        webhooks: OzonWebhookProcessor::new(db),
        default_user_id: 1,
        app_name: "marketdesk-test".to_string(),
        metrics: PrometheusExporter::detached(),
        started_at: Instant::now(),
    };
    let auth = AuthConfig {
        bearer_token: bearer_token.map(str::to_string),
    };
    TestApp {
        harness,
        ozon,
        router: router(state, auth),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = app(None).await;
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["name"], "marketdesk-test");
}

#[tokio::test]
async fn metrics_render_as_text() {
    let app = app(Some("secret")).await;
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn unknown_and_missing_actions_are_bad_requests() {
    let app = app(None).await;
    for uri in ["/api/crm?action=dropTables", "/api/crm", "/api/sync?action=nope"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "error");
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["kind"], "validation_error");
    }
}

#[tokio::test]
async fn bearer_token_guards_api_but_not_public_routes() {
    let app = app(Some("secret")).await;

    let (status, body) = send(&app.router, get("/api/crm?action=getMarketplaces")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthorized");

    let request = Request::builder()
        .uri("/api/crm?action=getMarketplaces")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, request).await.0, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/crm?action=getMarketplaces")
        .header("authorization", "Bearer secret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    assert_eq!(send(&app.router, get("/health")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = app(Some("secret")).await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/crm?action=getOrders")
        .header("origin", "https://shop.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn connect_is_scoped_to_the_acting_user() {
    let app = app(None).await;
    let (status, body) = send(
        &app.router,
        post(
            "/api/crm?action=connectMarketplace",
            json!({"name": "Ozon", "apiKey": "key-1", "clientId": "42"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["marketplace"]["slug"], "ozon");
    assert!(body["data"]["integration"].get("api_key").is_none());

    let (_, body) = send(&app.router, get("/api/crm?action=getMarketplaces")).await;
    let ozon = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["slug"] == "ozon")
        .cloned()
        .unwrap();
    assert_eq!(ozon["is_connected"], true);

    let request = Request::builder()
        .uri("/api/crm?action=getMarketplaces")
        .header("x-user-id", "2")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app.router, request).await;
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|m| m["is_connected"] == false)
    );
}

#[tokio::test]
async fn connect_validates_credentials_and_marketplace() {
    let app = app(None).await;
    let (status, _) = send(
        &app.router,
        post(
            "/api/crm?action=connectMarketplace",
            json!({"name": "ozon", "apiKey": "key-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        post(
            "/api/crm?action=connectMarketplace",
            json!({"name": "Etsy", "apiKey": "key-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn invalid_user_header_is_rejected() {
    let app = app(None).await;
    let request = Request::builder()
        .uri("/api/crm?action=getOrders")
        .header("x-user-id", "abc")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, request).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_sync_reports_counts() {
    let app = app(None).await;
    app.harness
        .connect(1, "ozon", &credentials("key", Some("42")))
        .await
        .unwrap();
    app.ozon
        .set_products(vec![product("TWS-001", 3490.0, 45), product("PB-20K", 2190.0, 67)]);
    app.ozon.set_orders(vec![order(
        "OZ-1",
        OrderStatus::Processing,
        "anna@example.com",
        "TWS-001",
        1,
        3490.0,
        1,
    )]);

    let (status, body) = send(
        &app.router,
        post("/api/sync?action=fullSync", json!({"marketplaceId": OZON_ID})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["products"], 2);
    assert_eq!(body["data"]["orders"]["created"], 1);
    assert!(body["data"]["lastSync"].is_string());
}

#[tokio::test]
async fn partial_full_sync_is_an_error_with_the_report() {
    let app = app(None).await;
    app.harness
        .connect(1, "ozon", &credentials("key", Some("42")))
        .await
        .unwrap();
    app.ozon.set_products(vec![product("TWS-001", 3490.0, 45)]);
    app.ozon
        .fail(MockOperation::FetchOrders, UpstreamFailure::Status(503));

    let (status, body) = send(
        &app.router,
        post("/api/sync?action=fullSync", json!({"marketplaceId": OZON_ID})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["kind"], "sync_incomplete");
    assert_eq!(body["data"]["products"], 1);
    assert_eq!(body["data"]["failedStep"], "orders");
}

#[tokio::test]
async fn sync_requires_a_connection() {
    let app = app(None).await;
    let (status, body) = send(
        &app.router,
        get("/api/sync?action=syncProducts&marketplaceId=1"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_connected");
    assert!(app.ozon.calls().is_empty());
}

#[tokio::test]
async fn product_create_and_soft_delete() {
    let app = app(None).await;
    let (status, body) = send(
        &app.router,
        post(
            "/api/crm?action=createProduct",
            json!({"sku": "SW-PRO-01", "name": "Smart watch", "price": 8990, "stock": 23}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();

    let delete = format!("/api/crm?action=deleteProduct&productId={id}");
    assert_eq!(send(&app.router, post(&delete, Value::Null)).await.0, StatusCode::OK);
    assert_eq!(
        send(&app.router, post(&delete, Value::Null)).await.0,
        StatusCode::NOT_FOUND
    );

    let (_, body) = send(&app.router, get("/api/crm?action=getProducts")).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app.router,
        post("/api/crm?action=createProduct", json!({"sku": "", "name": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_status_updates_follow_transitions() {
    let app = app(None).await;
    let id = app
        .harness
        .seed_order("A-1", OZON_ID, "anna@example.com", OrderStatus::New, 500.0, 0)
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        post(
            "/api/crm?action=updateOrderStatus",
            json!({"orderId": id, "status": "shipped"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "shipped");
    assert!(body["data"]["shipped_at"].is_string());

    let (status, _) = send(
        &app.router,
        post(
            "/api/crm?action=updateOrderStatus",
            json!({"orderId": id, "status": "new"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        post(
            "/api/crm?action=updateOrderStatus",
            json!({"orderId": 999, "status": "shipped"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn orders_filter_by_status() {
    let app = app(None).await;
    for (number, status) in [
        ("A-1", OrderStatus::New),
        ("A-2", OrderStatus::Shipped),
        ("A-3", OrderStatus::New),
    ] {
        app.harness
            .seed_order(number, OZON_ID, "anna@example.com", status, 100.0, 0)
            .await
            .unwrap();
    }
    let (_, body) = send(&app.router, get("/api/crm?action=getOrders&status=new")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app.router, get("/api/crm?action=getOrders&limit=1")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app.router, get("/api/crm?action=getOrders&status=lost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_views_are_served() {
    let app = app(None).await;
    app.harness
        .seed_order("A-1", OZON_ID, "anna@example.com", OrderStatus::Delivered, 100.0, 1)
        .await
        .unwrap();

    let (status, body) = send(&app.router, get("/api/crm?action=getAnalytics&period=7d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"]["totalOrders"], 1);

    let (status, body) = send(&app.router, get("/api/crm?action=getDashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["totalOrders"], 1);

    let (status, body) = send(
        &app.router,
        get("/api/crm?action=getConversionFunnel&period=7d"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["synthetic"], true);

    let (status, _) = send(&app.router, get("/api/crm?action=getAnalytics&period=2d")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn marketplace_actions_accept_request_credentials() {
    let app = app(None).await;
    let (status, body) = send(
        &app.router,
        post(
            "/api/marketplace?action=updatePrice",
            json!({
                "marketplaceId": OZON_ID,
                "apiKey": "inline",
                "clientId": "9",
                "offerId": "TWS-001",
                "price": 3290
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["linked"], false);

    let (status, _) = send(
        &app.router,
        post(
            "/api/marketplace?action=updatePrice",
            json!({"marketplaceId": OZON_ID, "offerId": "TWS-001"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forecast_routes_validate_subjects() {
    let app = app(None).await;
    let (status, body) = send(&app.router, get("/api/ml?action=salesForecast&productId=42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");

    let (status, body) = send(&app.router, get("/api/ml?action=getPredictions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (status, _) = send(&app.router, get("/api/ml?action=demandForecast")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ozon_webhook_always_acknowledges() {
    let app = app(Some("secret")).await;
    let new_posting = json!({
        "message_type": "TYPE_NEW_POSTING",
        "posting": {
            "posting_number": "0300-1",
            "order_id": 300,
            "products": [{"offer_id": "TWS-001", "name": "Earbuds", "price": "3490", "quantity": 1}]
        }
    });
    let (status, body) = send(&app.router, post("/webhooks/ozon", new_posting)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let (status, body) = send(
        &app.router,
        post("/webhooks/ozon", json!({"message_type": "TYPE_PING"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/ozon")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error_logged");
}
