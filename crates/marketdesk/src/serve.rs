// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `marketdesk serve`: wire storage, engines, and the HTTP gateway.

use std::sync::Arc;
use std::time::Instant;

use marketdesk_analytics::AnalyticsEngine;
use marketdesk_config::model::MarketdeskConfig;
use marketdesk_core::MarketdeskError;
use marketdesk_forecast::ForecastEngine;
use marketdesk_gateway::{AppState, AuthConfig, ServerConfig, start_server};
use marketdesk_marketplace::HttpClientFactory;
use marketdesk_prometheus::PrometheusExporter;
use marketdesk_storage::Database;
use marketdesk_sync::{OzonWebhookProcessor, SyncEngine};
use tracing::{info, warn};

/// Open the configured database, creating its parent directory if needed.
pub async fn open_database(config: &MarketdeskConfig) -> Result<Database, MarketdeskError> {
    let path = std::path::Path::new(&config.storage.database_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| MarketdeskError::Storage {
            source: Box::new(e),
        })?;
    }
    Database::open_with_options(&config.storage.database_path, config.storage.wal_mode).await
}

/// Sync engine backed by real marketplace clients.
pub fn sync_engine(config: &MarketdeskConfig, db: Database) -> SyncEngine {
    let factory = HttpClientFactory::from_config(&config.marketplaces);
    if config.marketplaces.simulated_fallback {
        warn!("simulated marketplace fallback is enabled; unsupported marketplaces will serve demo data");
    }
    SyncEngine::new(db, Arc::new(factory)).with_order_window(config.marketplaces.order_window_days)
}

/// Shared handler state for the gateway.
pub fn build_state(
    config: &MarketdeskConfig,
    db: Database,
    metrics: PrometheusExporter,
) -> AppState {
    AppState {
        sync: sync_engine(config, db.clone()),
        analytics: AnalyticsEngine::new(db.clone(), &config.analytics),
        forecast: ForecastEngine::new(db.clone(), &config.forecast),
        webhooks: OzonWebhookProcessor::new(db.clone()),
        db,
        default_user_id: config.server.default_user_id,
        app_name: config.app.name.clone(),
        metrics,
        started_at: Instant::now(),
    }
}

pub async fn run_serve(config: MarketdeskConfig) -> Result<(), MarketdeskError> {
    init_tracing(&config.app.log_level);

    let db = open_database(&config).await?;
    info!(path = %config.storage.database_path, "database opened");

    let metrics = match PrometheusExporter::install() {
        Ok(exporter) => exporter,
        Err(e) => {
            warn!(error = %e, "metrics recorder unavailable; /metrics will be empty");
            PrometheusExporter::detached()
        }
    };

    let state = build_state(&config, db, metrics);
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
    };
    start_server(&server, state).await
}

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("marketdesk={log_level},warn")));

    // A second init (tests, repeated runs in one process) is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
