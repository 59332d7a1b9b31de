// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness: a migrated temp-file database plus seed helpers and
//! fixture builders for normalized marketplace records.

use chrono::{Duration, Utc};
use marketdesk_core::{
    Credentials, MarketdeskError, NormalizedOrder, NormalizedOrderItem, NormalizedProduct,
    OrderStatus, format_timestamp,
};
use marketdesk_storage::Database;
use marketdesk_storage::models::{Integration, NewOrder, NewOrderItem};
use marketdesk_storage::queries::{customers, integrations, marketplaces, orders};

/// Seeded marketplace ids.
pub const OZON_ID: i64 = 1;
pub const WILDBERRIES_ID: i64 = 2;

/// A migrated database backed by a temporary file that lives as long as the
/// harness.
pub struct TestHarness {
    pub db: Database,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, MarketdeskError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| MarketdeskError::Storage {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;
        Ok(Self {
            db,
            _temp_dir: temp_dir,
        })
    }

    /// Store an active integration for `user_id` on `slug`.
    pub async fn connect(
        &self,
        user_id: i64,
        slug: &str,
        credentials: &Credentials,
    ) -> Result<Integration, MarketdeskError> {
        let marketplace = marketplaces::find_marketplace(&self.db, slug)
            .await?
            .ok_or_else(|| MarketdeskError::not_found("marketplace", slug))?;
        integrations::upsert_integration(&self.db, user_id, marketplace.id, credentials).await
    }

    /// Insert an order for a customer identified by email, `days_ago` days
    /// before now, with a single line item.
    pub async fn seed_order(
        &self,
        order_number: &str,
        marketplace_id: i64,
        email: &str,
        status: OrderStatus,
        total_amount: f64,
        days_ago: i64,
    ) -> Result<i64, MarketdeskError> {
        let customer_id = customers::find_or_create(&self.db, email, email).await?;
        let new = NewOrder {
            order_number: order_number.to_string(),
            customer_id: Some(customer_id),
            marketplace_id: Some(marketplace_id),
            status,
            fulfillment_type: Some("FBS".to_string()),
            total_amount,
            items_count: 1,
            shipping_address: None,
            created_at: format_timestamp(Utc::now() - Duration::days(days_ago)),
            shipped_at: None,
        };
        let item = NewOrderItem {
            sku: format!("SKU-{order_number}"),
            name: format!("Item for {order_number}"),
            quantity: 1,
            price: total_amount,
        };
        orders::insert_order(&self.db, &new, &[item]).await
    }
}

pub fn credentials(api_key: &str, client_id: Option<&str>) -> Credentials {
    Credentials {
        api_key: api_key.to_string(),
        client_id: client_id.map(str::to_string),
        seller_id: None,
    }
}

pub fn product(sku: &str, price: f64, stock: i64) -> NormalizedProduct {
    NormalizedProduct {
        external_id: format!("ext-{sku}"),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        price,
        stock: Some(stock),
        category: None,
    }
}

/// A one-line order of `quantity` x `sku` at `price`, created `days_ago`
/// days before now.
pub fn order(
    order_number: &str,
    status: OrderStatus,
    email: &str,
    sku: &str,
    quantity: i64,
    price: f64,
    days_ago: i64,
) -> NormalizedOrder {
    NormalizedOrder {
        order_number: order_number.to_string(),
        status,
        customer_name: email.split('@').next().unwrap_or(email).to_string(),
        customer_email: email.to_string(),
        total_amount: price * quantity as f64,
        items: vec![NormalizedOrderItem {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            quantity,
            price,
        }],
        created_at: format_timestamp(Utc::now() - Duration::days(days_ago)),
        shipped_at: None,
        fulfillment_type: Some("FBS".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_seeds_orders_and_integrations() {
        let harness = TestHarness::new().await.unwrap();
        let integration = harness
            .connect(1, "ozon", &credentials("k", Some("1")))
            .await
            .unwrap();
        assert!(integration.is_active());
        assert!(integration.last_sync.is_none());

        harness
            .seed_order("A-1", OZON_ID, "anna@example.com", OrderStatus::New, 100.0, 0)
            .await
            .unwrap();
        let (count, revenue) = orders::order_totals(&harness.db).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(revenue, 100.0);
    }
}
