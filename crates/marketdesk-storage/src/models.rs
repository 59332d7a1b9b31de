// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.

use std::str::FromStr;

use marketdesk_core::{Credentials, IntegrationStatus, OrderStatus, ProductStatus};
use serde::{Deserialize, Serialize};

/// Parse a text column into a strum enum, reporting a conversion failure
/// against the column index.
pub(crate) fn parse_column<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// A marketplace from the seeded directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub country: Option<String>,
}

/// A marketplace together with one user's connection state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceOverview {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub country: Option<String>,
    pub is_connected: bool,
    pub client_id: Option<String>,
    pub last_sync_at: Option<String>,
}

/// Stored credentials linking one user to one marketplace.
#[derive(Clone, Serialize)]
pub struct Integration {
    pub id: i64,
    pub user_id: i64,
    pub marketplace_id: i64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Seller id, where the marketplace has one.
    pub api_secret: Option<String>,
    /// Client id (Ozon `Client-Id`).
    pub store_id: Option<String>,
    pub status: IntegrationStatus,
    pub last_sync: Option<String>,
}

impl Integration {
    pub fn is_active(&self) -> bool {
        self.status == IntegrationStatus::Active
    }

    /// Credentials in the shape the client factory expects, or `None` when no
    /// api key was stored.
    pub fn credentials(&self) -> Option<Credentials> {
        let api_key = self.api_key.clone().filter(|k| !k.is_empty())?;
        Some(Credentials {
            api_key,
            client_id: self.store_id.clone().filter(|v| !v.is_empty()),
            seller_id: self.api_secret.clone().filter(|v| !v.is_empty()),
        })
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("marketplace_id", &self.marketplace_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("store_id", &self.store_id)
            .field("status", &self.status)
            .field("last_sync", &self.last_sync)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub cost_price: Option<f64>,
    pub stock: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when a product is created by hand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A product's presence on one marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceLink {
    pub id: i64,
    pub product_id: i64,
    pub marketplace_id: i64,
    pub external_id: Option<String>,
    pub marketplace_price: Option<f64>,
    pub marketplace_stock: Option<i64>,
    pub synced_at: Option<String>,
}

/// An order joined with its customer and marketplace names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub marketplace_id: Option<i64>,
    pub marketplace_name: Option<String>,
    pub status: OrderStatus,
    pub fulfillment_type: Option<String>,
    pub total_amount: f64,
    pub items_count: i64,
    pub shipping_address: Option<String>,
    pub created_at: String,
    pub shipped_at: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub customer_id: Option<i64>,
    pub marketplace_id: Option<i64>,
    pub status: OrderStatus,
    pub fulfillment_type: Option<String>,
    pub total_amount: f64,
    pub items_count: i64,
    pub shipping_address: Option<String>,
    pub created_at: String,
    pub shipped_at: Option<String>,
}

/// A line item; the product link is resolved from `sku` on insert.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub marketplace_id: Option<i64>,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub total_spent: f64,
    pub total_orders: i64,
    pub created_at: String,
}

/// A stored forecast or analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    pub prediction_type: String,
    pub product_id: Option<i64>,
    pub marketplace_id: Option<i64>,
    pub prediction_value: serde_json::Value,
    pub confidence_score: f64,
    pub prediction_date: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub prediction_type: String,
    pub product_id: Option<i64>,
    pub marketplace_id: Option<i64>,
    pub prediction_value: serde_json::Value,
    pub confidence_score: f64,
}
