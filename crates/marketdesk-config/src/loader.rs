// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./marketdesk.toml` > `~/.config/marketdesk/marketdesk.toml` >
//! `/etc/marketdesk/marketdesk.toml` with environment variable overrides via `MARKETDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MarketdeskConfig;

/// Section prefixes in the order they must be tried. Nested sections come
/// before their parent so `marketplaces_ozon_api_key` is not split at
/// `marketplaces_`.
const SECTION_PREFIXES: &[(&str, &str)] = &[
    ("marketplaces_ozon_", "marketplaces.ozon."),
    ("marketplaces_wildberries_", "marketplaces.wildberries."),
    ("marketplaces_", "marketplaces."),
    ("app_", "app."),
    ("server_", "server."),
    ("storage_", "storage."),
    ("analytics_", "analytics."),
    ("forecast_", "forecast."),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/marketdesk/marketdesk.toml` (system-wide)
/// 3. `~/.config/marketdesk/marketdesk.toml` (user XDG config)
/// 4. `./marketdesk.toml` (local directory)
/// 5. `MARKETDESK_*` environment variables
pub fn load_config() -> Result<MarketdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MarketdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MarketdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MarketdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MarketdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MarketdeskConfig::default()))
        .merge(Toml::file("/etc/marketdesk/marketdesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("marketdesk/marketdesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("marketdesk.toml"))
        .merge(env_provider())
}

/// Map a prefix-stripped env var name to its dotted config path.
///
/// Uses an explicit prefix table instead of `Env::split("_")` because key
/// names contain underscores: `SERVER_BEARER_TOKEN` is `server.bearer_token`.
/// Figment hands the key over with its original case, so it is lowercased
/// here before matching.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for (prefix, section) in SECTION_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key
}

fn env_provider() -> Env {
    Env::prefixed("MARKETDESK_").map(|key| map_env_key(key.as_str()).into())
}
