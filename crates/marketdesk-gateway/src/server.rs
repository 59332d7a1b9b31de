// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use marketdesk_analytics::AnalyticsEngine;
use marketdesk_core::MarketdeskError;
use marketdesk_forecast::ForecastEngine;
use marketdesk_prometheus::PrometheusExporter;
use marketdesk_storage::Database;
use marketdesk_sync::{OzonWebhookProcessor, SyncEngine};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for request handlers. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sync: SyncEngine,
    pub analytics: AnalyticsEngine,
    pub forecast: ForecastEngine,
    pub webhooks: OzonWebhookProcessor,
    /// User assumed when a request has no `X-User-Id` header.
    pub default_user_id: i64,
    pub app_name: String,
    pub metrics: PrometheusExporter,
    pub started_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

/// All routes with CORS and request tracing.
///
/// - `GET|POST /api/{crm,sync,marketplace,ml}?action=` (bearer auth when configured)
/// - `POST /webhooks/ozon`
/// - `GET /health`, `GET /metrics`
pub fn router(state: AppState, auth: AuthConfig) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::public::health))
        .route("/metrics", get(handlers::public::metrics))
        .route("/webhooks/ozon", post(handlers::public::ozon_webhook))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/api/crm",
            get(handlers::crm::handle).post(handlers::crm::handle),
        )
        .route(
            "/api/sync",
            get(handlers::sync::handle).post(handlers::sync::handle),
        )
        .route(
            "/api/marketplace",
            get(handlers::marketplace::handle).post(handlers::marketplace::handle),
        )
        .route(
            "/api/ml",
            get(handlers::ml::handle).post(handlers::ml::handle),
        )
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), MarketdeskError> {
    if config.auth.bearer_token.is_none() {
        tracing::warn!("no bearer token configured; /api routes are open");
    }
    let app = router(state, config.auth.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MarketdeskError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("Marketdesk listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| MarketdeskError::Internal(format!("server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug_redacts_token() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            auth: AuthConfig {
                bearer_token: Some("secret".to_string()),
            },
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(!debug.contains("secret"));
    }
}
