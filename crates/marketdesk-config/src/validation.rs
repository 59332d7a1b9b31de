// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: a usable bind
//! address, non-empty paths, parseable base URLs and coherent numeric bounds.

use crate::diagnostic::ConfigError;
use crate::model::MarketdeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &MarketdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "app.log_level `{}` must be one of: {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if let Some(token) = &config.server.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "server.bearer_token must not be blank; remove it to disable auth",
        ));
    }

    if config.server.default_user_id <= 0 {
        errors.push(ConfigError::validation(format!(
            "server.default_user_id must be positive, got {}",
            config.server.default_user_id
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let mp = &config.marketplaces;
    if !(1..=300).contains(&mp.request_timeout_secs) {
        errors.push(ConfigError::validation(format!(
            "marketplaces.request_timeout_secs must be between 1 and 300, got {}",
            mp.request_timeout_secs
        )));
    }
    if mp.order_window_days <= 0 {
        errors.push(ConfigError::validation(format!(
            "marketplaces.order_window_days must be positive, got {}",
            mp.order_window_days
        )));
    }
    for (key, url) in [
        ("marketplaces.ozon.base_url", &mp.ozon.base_url),
        ("marketplaces.wildberries.base_url", &mp.wildberries.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{key} `{url}` must start with http:// or https://"
            )));
        }
    }

    if config.analytics.low_stock_threshold < 0 {
        errors.push(ConfigError::validation(format!(
            "analytics.low_stock_threshold must be non-negative, got {}",
            config.analytics.low_stock_threshold
        )));
    }
    if config.analytics.recent_orders_limit <= 0 {
        errors.push(ConfigError::validation(format!(
            "analytics.recent_orders_limit must be positive, got {}",
            config.analytics.recent_orders_limit
        )));
    }

    let fc = &config.forecast;
    if fc.max_horizon_days == 0 {
        errors.push(ConfigError::validation(
            "forecast.max_horizon_days must be at least 1",
        ));
    }
    if fc.default_horizon_days == 0 || fc.default_horizon_days > fc.max_horizon_days {
        errors.push(ConfigError::validation(format!(
            "forecast.default_horizon_days must be between 1 and {}, got {}",
            fc.max_horizon_days, fc.default_horizon_days
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&MarketdeskConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = MarketdeskConfig::default();
        config.server.host = String::new();
        config.storage.database_path = "  ".to_string();
        config.forecast.default_horizon_days = 120;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_bearer_token_rejected() {
        let mut config = MarketdeskConfig::default();
        config.server.bearer_token = Some(" ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("bearer_token"));
    }

    #[test]
    fn base_url_requires_scheme() {
        let mut config = MarketdeskConfig::default();
        config.marketplaces.ozon.base_url = "api-seller.ozon.ru".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("marketplaces.ozon.base_url"));
    }
}
