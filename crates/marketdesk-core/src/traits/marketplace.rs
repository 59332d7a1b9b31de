// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace client trait implemented by the Ozon, Wildberries and
//! simulated adapters.

use async_trait::async_trait;

use crate::error::MarketdeskError;
use crate::types::{
    Credentials, FinanceTransaction, NormalizedOrder, NormalizedProduct, ReturnRecord,
    ShipmentItem,
};

/// Uniform interface to one marketplace account.
///
/// A client is bound to one set of credentials when it is built and lives
/// for a single operation. Every method issues its request(s) once; there is
/// no retry. Failures surface as [`MarketdeskError::Integration`].
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Marketplace slug this client talks to (e.g. `ozon`).
    fn marketplace(&self) -> &str;

    /// True for adapters that serve demo data instead of calling a real API.
    fn is_simulated(&self) -> bool {
        false
    }

    /// Full product catalog, normalized.
    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, MarketdeskError>;

    /// Orders created between `since` and `to` (RFC 3339 instants).
    async fn fetch_orders(
        &self,
        since: &str,
        to: &str,
    ) -> Result<Vec<NormalizedOrder>, MarketdeskError>;

    /// Set the selling price (and optionally the crossed-out price) of an offer.
    async fn update_price(
        &self,
        offer_id: &str,
        price: f64,
        old_price: Option<f64>,
    ) -> Result<(), MarketdeskError>;

    /// Set the available stock of an offer, optionally for one warehouse.
    async fn update_stock(
        &self,
        offer_id: &str,
        stock: i64,
        warehouse_id: Option<i64>,
    ) -> Result<(), MarketdeskError>;

    /// Finance ledger operations between `from` and `to` (RFC 3339 instants).
    async fn fetch_finance_transactions(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError>;

    /// Open customer returns.
    async fn fetch_returns(&self) -> Result<Vec<ReturnRecord>, MarketdeskError>;

    /// Confirm receipt of a returned item.
    async fn accept_return(&self, return_id: &str) -> Result<(), MarketdeskError>;

    /// Mark an FBS posting as assembled and ready to ship.
    async fn ship_posting(
        &self,
        posting_number: &str,
        items: &[ShipmentItem],
    ) -> Result<(), MarketdeskError>;
}

/// Builds marketplace clients for a slug and resolved credentials.
pub trait ClientFactory: Send + Sync {
    /// Build a client for `slug`.
    ///
    /// Unknown marketplaces are a configuration error unless the factory is
    /// allowed to fall back to simulated data.
    fn build(
        &self,
        slug: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn MarketplaceClient>, MarketdeskError>;

    /// Process-wide fallback credentials for `slug`, if configured.
    fn fallback_credentials(&self, slug: &str) -> Option<Credentials> {
        let _ = slug;
        None
    }
}
