// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildberries supplier API client.
//!
//! Only the content card listing is wired up. The content API carries no
//! stock, so products report none and local stock is left alone. Order
//! fetch returns nothing and write operations are rejected as unsupported.

use std::time::Duration;

use async_trait::async_trait;
use marketdesk_core::{
    Credentials, FinanceTransaction, MarketdeskError, MarketplaceClient, NormalizedOrder,
    NormalizedProduct, ReturnRecord, ShipmentItem, UpstreamFailure,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::ApiTransport;

/// Default Wildberries supplier API endpoint.
pub const WILDBERRIES_BASE_URL: &str = "https://suppliers-api.wildberries.ru";

const CARD_PAGE_SIZE: i64 = 100;
const MAX_PAGES: usize = 1000;

#[derive(Debug, Serialize)]
struct CardsRequest {
    settings: CardsSettings,
}

#[derive(Debug, Serialize)]
struct CardsSettings {
    cursor: CardsCursor,
    filter: CardsFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardsCursor {
    #[serde(default)]
    limit: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(default, rename = "nmID", skip_serializing_if = "Option::is_none")]
    nm_id: Option<i64>,
    #[serde(default, skip_serializing)]
    total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardsFilter {
    with_photo: i64,
}

#[derive(Debug, Deserialize)]
struct CardsResponse {
    #[serde(default)]
    cards: Vec<Card>,
    #[serde(default)]
    cursor: CardsCursor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Card {
    #[serde(rename = "nmID")]
    nm_id: i64,
    #[serde(default)]
    vendor_code: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subject_name: Option<String>,
    #[serde(default)]
    sizes: Vec<CardSize>,
}

#[derive(Debug, Deserialize)]
struct CardSize {
    #[serde(default)]
    price: Option<f64>,
}

impl From<Card> for NormalizedProduct {
    fn from(card: Card) -> Self {
        NormalizedProduct {
            external_id: card.nm_id.to_string(),
            sku: card.vendor_code,
            name: card.title,
            price: card.sizes.first().and_then(|s| s.price).unwrap_or(0.0),
            stock: None,
            category: card.subject_name.filter(|s| !s.is_empty()),
        }
    }
}

/// Client for one Wildberries supplier account.
#[derive(Debug, Clone)]
pub struct WildberriesClient {
    transport: ApiTransport,
}

impl WildberriesClient {
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, MarketdeskError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(credentials.api_key.trim()).map_err(|e| {
                MarketdeskError::Config(format!("invalid Authorization header value: {e}"))
            })?,
        );
        Ok(Self {
            transport: ApiTransport::new("wildberries", base_url, headers, timeout)?,
        })
    }
}

fn unsupported(operation: &str) -> MarketdeskError {
    MarketdeskError::integration(
        "wildberries",
        UpstreamFailure::Unsupported,
        format!("{operation} is not available for Wildberries"),
    )
}

#[async_trait]
impl MarketplaceClient for WildberriesClient {
    fn marketplace(&self) -> &str {
        "wildberries"
    }

    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, MarketdeskError> {
        let mut products = Vec::new();
        let mut cursor = CardsCursor {
            limit: CARD_PAGE_SIZE,
            ..Default::default()
        };

        for _ in 0..MAX_PAGES {
            let request = CardsRequest {
                settings: CardsSettings {
                    cursor: cursor.clone(),
                    filter: CardsFilter { with_photo: -1 },
                },
            };
            let page: CardsResponse = self
                .transport
                .post("/content/v2/get/cards/list", &request)
                .await?;
            let fetched = page.cards.len() as i64;
            products.extend(page.cards.into_iter().map(NormalizedProduct::from));

            // A short page is the last one.
            if fetched < CARD_PAGE_SIZE || page.cursor.total < CARD_PAGE_SIZE {
                break;
            }
            cursor.updated_at = page.cursor.updated_at;
            cursor.nm_id = page.cursor.nm_id;
        }
        debug!(count = products.len(), "wildberries cards fetched");
        Ok(products)
    }

    async fn fetch_orders(
        &self,
        _since: &str,
        _to: &str,
    ) -> Result<Vec<NormalizedOrder>, MarketdeskError> {
        Ok(Vec::new())
    }

    async fn update_price(
        &self,
        _offer_id: &str,
        _price: f64,
        _old_price: Option<f64>,
    ) -> Result<(), MarketdeskError> {
        Err(unsupported("price update"))
    }

    async fn update_stock(
        &self,
        _offer_id: &str,
        _stock: i64,
        _warehouse_id: Option<i64>,
    ) -> Result<(), MarketdeskError> {
        Err(unsupported("stock update"))
    }

    async fn fetch_finance_transactions(
        &self,
        _from: &str,
        _to: &str,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError> {
        Err(unsupported("finance report"))
    }

    async fn fetch_returns(&self) -> Result<Vec<ReturnRecord>, MarketdeskError> {
        Err(unsupported("returns listing"))
    }

    async fn accept_return(&self, _return_id: &str) -> Result<(), MarketdeskError> {
        Err(unsupported("return acceptance"))
    }

    async fn ship_posting(
        &self,
        _posting_number: &str,
        _items: &[ShipmentItem],
    ) -> Result<(), MarketdeskError> {
        Err(unsupported("posting shipment"))
    }
}
