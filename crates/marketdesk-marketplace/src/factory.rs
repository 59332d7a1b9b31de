// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration-driven [`ClientFactory`].

use std::time::Duration;

use marketdesk_config::model::MarketplacesConfig;
use marketdesk_core::{ClientFactory, Credentials, MarketdeskError, MarketplaceClient};

use crate::ozon::OzonClient;
use crate::simulated::SimulatedClient;
use crate::wildberries::WildberriesClient;

/// Builds real HTTP clients for Ozon and Wildberries, and simulated clients
/// for every other marketplace when `simulated_fallback` is enabled.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    config: MarketplacesConfig,
}

impl HttpClientFactory {
    pub fn from_config(config: &MarketplacesConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(
        &self,
        slug: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn MarketplaceClient>, MarketdeskError> {
        match slug {
            "ozon" => Ok(Box::new(OzonClient::new(
                &self.config.ozon.base_url,
                &credentials,
                self.timeout(),
            )?)),
            "wildberries" => Ok(Box::new(WildberriesClient::new(
                &self.config.wildberries.base_url,
                &credentials,
                self.timeout(),
            )?)),
            other if self.config.simulated_fallback => Ok(Box::new(SimulatedClient::new(other))),
            other => Err(MarketdeskError::Config(format!(
                "no client available for marketplace '{other}' (enable marketplaces.simulated_fallback for demo data)"
            ))),
        }
    }

    fn fallback_credentials(&self, slug: &str) -> Option<Credentials> {
        match slug {
            "ozon" => self.config.ozon.api_key.as_ref().map(|key| Credentials {
                api_key: key.clone(),
                client_id: self.config.ozon.client_id.clone(),
                seller_id: None,
            }),
            "wildberries" => self.config.wildberries.api_key.as_ref().map(|key| Credentials {
                api_key: key.clone(),
                client_id: None,
                seller_id: None,
            }),
            _ => None,
        }
    }
}
