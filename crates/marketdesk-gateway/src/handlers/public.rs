// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unauthenticated routes: health, Prometheus metrics, and the Ozon webhook.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub database: &'static str,
}

/// GET /health
///
/// 503 when the database does not answer.
pub async fn health(State(state): State<AppState>) -> Response {
    let database_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            false
        }
    };
    let body = HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        name: state.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        database: if database_ok { "ok" } else { "unavailable" },
    };
    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}

/// POST /webhooks/ozon
///
/// Always 200 so Ozon does not redeliver; the outcome is in the body.
pub async fn ozon_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = state.webhooks.handle(&body).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": outcome })),
    )
        .into_response()
}
