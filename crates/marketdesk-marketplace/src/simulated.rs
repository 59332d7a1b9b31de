// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Demo adapter for marketplaces without a real API client.
//!
//! NOT FOR PRODUCTION. It serves a fixed catalog and two orders so the back
//! office can be explored without seller accounts, and is only built when
//! `marketplaces.simulated_fallback` is enabled.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use marketdesk_core::{
    FinanceTransaction, MarketdeskError, MarketplaceClient, NormalizedOrder, NormalizedOrderItem,
    NormalizedProduct, OrderStatus, ReturnRecord, ShipmentItem, format_timestamp,
};
use tracing::{info, warn};

/// Fixed catalog: (sku, name, price, stock, category).
const CATALOG: &[(&str, &str, f64, i64, &str)] = &[
    ("TWS-001", "Wireless earbuds TWS", 3490.0, 45, "Electronics"),
    ("SW-PRO-01", "SmartWatch Pro", 8990.0, 23, "Electronics"),
    ("PB-20K", "Power bank 20000 mAh", 2190.0, 67, "Accessories"),
    ("TSHIRT-001", "Cotton T-shirt", 890.0, 120, "Clothing"),
    ("JEANS-CL-01", "Classic jeans", 2490.0, 78, "Clothing"),
];

#[derive(Debug, Clone)]
pub struct SimulatedClient {
    slug: String,
}

impl SimulatedClient {
    pub fn new(slug: &str) -> Self {
        warn!(marketplace = slug, "using simulated marketplace data; not for production");
        Self {
            slug: slug.to_string(),
        }
    }

    fn item(sku: &str, quantity: i64) -> NormalizedOrderItem {
        let (sku, name, price, _, _) = CATALOG
            .iter()
            .find(|(s, ..)| *s == sku)
            .copied()
            .unwrap_or((sku, sku, 0.0, 0, ""));
        NormalizedOrderItem {
            sku: sku.to_string(),
            name: name.to_string(),
            quantity,
            price,
        }
    }

    fn order(
        &self,
        n: u32,
        days_ago: i64,
        status: OrderStatus,
        customer: (&str, &str),
        items: Vec<NormalizedOrderItem>,
    ) -> NormalizedOrder {
        let created = Utc::now() - Duration::days(days_ago);
        let total_amount = items.iter().map(|i| i.price * i.quantity as f64).sum();
        NormalizedOrder {
            order_number: format!("SIM-{}-{n}", self.slug.to_uppercase()),
            status,
            customer_name: customer.0.to_string(),
            customer_email: customer.1.to_string(),
            total_amount,
            items,
            created_at: format_timestamp(created),
            shipped_at: (status == OrderStatus::Shipped)
                .then(|| format_timestamp(created + Duration::hours(20))),
            fulfillment_type: Some("FBS".to_string()),
        }
    }
}

#[async_trait]
impl MarketplaceClient for SimulatedClient {
    fn marketplace(&self) -> &str {
        &self.slug
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, MarketdeskError> {
        Ok(CATALOG
            .iter()
            .enumerate()
            .map(|(i, (sku, name, price, stock, category))| NormalizedProduct {
                external_id: format!("{}_{}", self.slug, i + 1),
                sku: sku.to_string(),
                name: name.to_string(),
                price: *price,
                stock: Some(*stock),
                category: Some(category.to_string()),
            })
            .collect())
    }

    async fn fetch_orders(
        &self,
        _since: &str,
        _to: &str,
    ) -> Result<Vec<NormalizedOrder>, MarketdeskError> {
        Ok(vec![
            self.order(
                1,
                2,
                OrderStatus::Processing,
                ("Ivan Petrov", "ivan.petrov@example.com"),
                vec![Self::item("TWS-001", 1), Self::item("SW-PRO-01", 1)],
            ),
            self.order(
                2,
                1,
                OrderStatus::Shipped,
                ("Maria Sidorova", "maria.sidorova@example.com"),
                vec![Self::item("PB-20K", 1)],
            ),
        ])
    }

    async fn update_price(
        &self,
        offer_id: &str,
        price: f64,
        _old_price: Option<f64>,
    ) -> Result<(), MarketdeskError> {
        info!(marketplace = %self.slug, offer_id, price, "simulated price update");
        Ok(())
    }

    async fn update_stock(
        &self,
        offer_id: &str,
        stock: i64,
        _warehouse_id: Option<i64>,
    ) -> Result<(), MarketdeskError> {
        info!(marketplace = %self.slug, offer_id, stock, "simulated stock update");
        Ok(())
    }

    async fn fetch_finance_transactions(
        &self,
        _from: &str,
        _to: &str,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError> {
        Ok(Vec::new())
    }

    async fn fetch_returns(&self) -> Result<Vec<ReturnRecord>, MarketdeskError> {
        Ok(Vec::new())
    }

    async fn accept_return(&self, return_id: &str) -> Result<(), MarketdeskError> {
        info!(marketplace = %self.slug, return_id, "simulated return acceptance");
        Ok(())
    }

    async fn ship_posting(
        &self,
        posting_number: &str,
        _items: &[ShipmentItem],
    ) -> Result<(), MarketdeskError> {
        info!(marketplace = %self.slug, posting_number, "simulated posting shipment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_is_deterministic() {
        let client = SimulatedClient::new("yandex_market");
        assert!(client.is_simulated());
        let first = client.fetch_products().await.unwrap();
        let second = client.fetch_products().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].sku, "TWS-001");
    }

    #[tokio::test]
    async fn demo_orders_have_consistent_totals() {
        let client = SimulatedClient::new("sber");
        let orders = client.fetch_orders("", "").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "SIM-SBER-1");
        assert_eq!(orders[0].total_amount, 12480.0);
        assert_eq!(orders[1].status, OrderStatus::Shipped);
        assert!(orders[1].shipped_at.is_some());
    }
}
