// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Marketdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Marketdesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MarketdeskConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP listener and API access.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Marketplace API clients and fallback credentials.
    #[serde(default)]
    pub marketplaces: MarketplacesConfig,

    /// Analytics thresholds.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Forecast bounds.
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "marketdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/api` routes. `None` leaves the API open.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// User id assumed when a request carries no `X-User-Id` header.
    #[serde(default = "default_user_id")]
    pub default_user_id: i64,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .field("default_user_id", &self.default_user_id)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            default_user_id: default_user_id(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_user_id() -> i64 {
    1
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("marketdesk").join("marketdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("marketdesk.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Marketplace client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MarketplacesConfig {
    /// Timeout for each outbound marketplace request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Trailing window for order sync, in days.
    #[serde(default = "default_order_window_days")]
    pub order_window_days: i64,

    /// Serve demo data for marketplaces without a real adapter.
    /// Never enable in production.
    #[serde(default)]
    pub simulated_fallback: bool,

    /// Ozon Seller API endpoint and fallback credentials.
    #[serde(default)]
    pub ozon: OzonConfig,

    /// Wildberries supplier API endpoint and fallback credentials.
    #[serde(default)]
    pub wildberries: WildberriesConfig,
}

impl Default for MarketplacesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            order_window_days: default_order_window_days(),
            simulated_fallback: false,
            ozon: OzonConfig::default(),
            wildberries: WildberriesConfig::default(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_order_window_days() -> i64 {
    30
}

/// Ozon Seller API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OzonConfig {
    /// API base URL.
    #[serde(default = "default_ozon_base_url")]
    pub base_url: String,

    /// Fallback `Client-Id` used when no integration record has one.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Fallback `Api-Key` used when no integration record has one.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for OzonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OzonConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for OzonConfig {
    fn default() -> Self {
        Self {
            base_url: default_ozon_base_url(),
            client_id: None,
            api_key: None,
        }
    }
}

fn default_ozon_base_url() -> String {
    "https://api-seller.ozon.ru".to_string()
}

/// Wildberries supplier API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WildberriesConfig {
    /// API base URL.
    #[serde(default = "default_wildberries_base_url")]
    pub base_url: String,

    /// Fallback `Authorization` key used when no integration record has one.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for WildberriesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WildberriesConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl Default for WildberriesConfig {
    fn default() -> Self {
        Self {
            base_url: default_wildberries_base_url(),
            api_key: None,
        }
    }
}

fn default_wildberries_base_url() -> String {
    "https://suppliers-api.wildberries.ru".to_string()
}

/// Analytics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Products with stock strictly below this are reported as low stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,

    /// Number of recent orders on the dashboard.
    #[serde(default = "default_recent_orders_limit")]
    pub recent_orders_limit: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            recent_orders_limit: default_recent_orders_limit(),
        }
    }
}

fn default_low_stock_threshold() -> i64 {
    10
}

fn default_recent_orders_limit() -> i64 {
    10
}

/// Forecast configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Horizon used when a sales forecast request names none.
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,

    /// Largest accepted sales forecast horizon.
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: default_horizon_days(),
            max_horizon_days: default_max_horizon_days(),
        }
    }
}

fn default_horizon_days() -> u32 {
    7
}

fn default_max_horizon_days() -> u32 {
    90
}
