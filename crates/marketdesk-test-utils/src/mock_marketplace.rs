// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable marketplace client and factory for deterministic tests.
//!
//! `MockMarketplace` implements `MarketplaceClient` over shared in-memory
//! state. Clones share that state, so a test keeps one handle to script
//! responses and inspect calls while the code under test owns another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use marketdesk_core::{
    ClientFactory, Credentials, FinanceTransaction, MarketdeskError, MarketplaceClient,
    NormalizedOrder, NormalizedProduct, ReturnRecord, ShipmentItem, UpstreamFailure,
};

/// Operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    FetchProducts,
    FetchOrders,
    UpdatePrice,
    UpdateStock,
    FetchFinance,
    FetchReturns,
    AcceptReturn,
    ShipPosting,
}

/// A call observed by the mock, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    FetchProducts,
    FetchOrders { since: String, to: String },
    UpdatePrice { offer_id: String, price: f64, old_price: Option<f64> },
    UpdateStock { offer_id: String, stock: i64, warehouse_id: Option<i64> },
    FetchFinance { from: String, to: String },
    FetchReturns,
    AcceptReturn { return_id: String },
    ShipPosting { posting_number: String, items: Vec<ShipmentItem> },
}

#[derive(Debug, Default)]
struct MockState {
    products: Vec<NormalizedProduct>,
    orders: Vec<NormalizedOrder>,
    finance: Vec<FinanceTransaction>,
    returns: Vec<ReturnRecord>,
    failures: HashMap<MockOperation, UpstreamFailure>,
    calls: Vec<MockCall>,
}

/// In-memory marketplace client.
#[derive(Debug, Clone)]
pub struct MockMarketplace {
    slug: String,
    state: Arc<Mutex<MockState>>,
}

impl MockMarketplace {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn with_products(self, products: Vec<NormalizedProduct>) -> Self {
        self.set_products(products);
        self
    }

    pub fn with_orders(self, orders: Vec<NormalizedOrder>) -> Self {
        self.set_orders(orders);
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Replace the catalog served by `fetch_products`.
    pub fn set_products(&self, products: Vec<NormalizedProduct>) {
        self.state().products = products;
    }

    /// Replace the orders served by `fetch_orders`.
    pub fn set_orders(&self, orders: Vec<NormalizedOrder>) {
        self.state().orders = orders;
    }

    pub fn set_finance(&self, finance: Vec<FinanceTransaction>) {
        self.state().finance = finance;
    }

    pub fn set_returns(&self, returns: Vec<ReturnRecord>) {
        self.state().returns = returns;
    }

    /// Make `operation` fail with `failure` until cleared.
    pub fn fail(&self, operation: MockOperation, failure: UpstreamFailure) {
        self.state().failures.insert(operation, failure);
    }

    pub fn clear_failure(&self, operation: MockOperation) {
        self.state().failures.remove(&operation);
    }

    /// Every call observed so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call` and return the scripted failure for `operation`, if any.
    fn enter(&self, operation: MockOperation, call: MockCall) -> Result<(), MarketdeskError> {
        let mut state = self.state();
        state.calls.push(call);
        match state.failures.get(&operation) {
            Some(failure) => Err(MarketdeskError::integration(
                self.slug.clone(),
                failure.clone(),
                format!("scripted {operation:?} failure"),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketplaceClient for MockMarketplace {
    fn marketplace(&self) -> &str {
        &self.slug
    }

    async fn fetch_products(&self) -> Result<Vec<NormalizedProduct>, MarketdeskError> {
        self.enter(MockOperation::FetchProducts, MockCall::FetchProducts)?;
        Ok(self.state().products.clone())
    }

    async fn fetch_orders(
        &self,
        since: &str,
        to: &str,
    ) -> Result<Vec<NormalizedOrder>, MarketdeskError> {
        self.enter(
            MockOperation::FetchOrders,
            MockCall::FetchOrders {
                since: since.to_string(),
                to: to.to_string(),
            },
        )?;
        Ok(self.state().orders.clone())
    }

    async fn update_price(
        &self,
        offer_id: &str,
        price: f64,
        old_price: Option<f64>,
    ) -> Result<(), MarketdeskError> {
        self.enter(
            MockOperation::UpdatePrice,
            MockCall::UpdatePrice {
                offer_id: offer_id.to_string(),
                price,
                old_price,
            },
        )
    }

    async fn update_stock(
        &self,
        offer_id: &str,
        stock: i64,
        warehouse_id: Option<i64>,
    ) -> Result<(), MarketdeskError> {
        self.enter(
            MockOperation::UpdateStock,
            MockCall::UpdateStock {
                offer_id: offer_id.to_string(),
                stock,
                warehouse_id,
            },
        )
    }

    async fn fetch_finance_transactions(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError> {
        self.enter(
            MockOperation::FetchFinance,
            MockCall::FetchFinance {
                from: from.to_string(),
                to: to.to_string(),
            },
        )?;
        Ok(self.state().finance.clone())
    }

    async fn fetch_returns(&self) -> Result<Vec<ReturnRecord>, MarketdeskError> {
        self.enter(MockOperation::FetchReturns, MockCall::FetchReturns)?;
        Ok(self.state().returns.clone())
    }

    async fn accept_return(&self, return_id: &str) -> Result<(), MarketdeskError> {
        self.enter(
            MockOperation::AcceptReturn,
            MockCall::AcceptReturn {
                return_id: return_id.to_string(),
            },
        )
    }

    async fn ship_posting(
        &self,
        posting_number: &str,
        items: &[ShipmentItem],
    ) -> Result<(), MarketdeskError> {
        self.enter(
            MockOperation::ShipPosting,
            MockCall::ShipPosting {
                posting_number: posting_number.to_string(),
                items: items.to_vec(),
            },
        )
    }
}

/// Factory handing out registered [`MockMarketplace`] handles.
///
/// Unregistered slugs are a configuration error, like a production factory
/// without simulated fallback.
#[derive(Debug, Default)]
pub struct MockClientFactory {
    marketplaces: HashMap<String, MockMarketplace>,
    fallback: HashMap<String, Credentials>,
    built_with: Mutex<Vec<(String, Credentials)>>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marketplace(mut self, marketplace: MockMarketplace) -> Self {
        self.marketplaces
            .insert(marketplace.slug().to_string(), marketplace);
        self
    }

    pub fn with_fallback(mut self, slug: &str, credentials: Credentials) -> Self {
        self.fallback.insert(slug.to_string(), credentials);
        self
    }

    /// Slug and credentials of every client built so far.
    pub fn built_with(&self) -> Vec<(String, Credentials)> {
        self.built_with
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ClientFactory for MockClientFactory {
    fn build(
        &self,
        slug: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn MarketplaceClient>, MarketdeskError> {
        let marketplace = self.marketplaces.get(slug).cloned().ok_or_else(|| {
            MarketdeskError::Config(format!("no client available for marketplace '{slug}'"))
        })?;
        self.built_with
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((slug.to_string(), credentials));
        Ok(Box::new(marketplace))
    }

    fn fallback_credentials(&self, slug: &str) -> Option<Credentials> {
        self.fallback.get(slug).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_scripted_state() {
        let handle = MockMarketplace::new("ozon");
        let factory = MockClientFactory::new().with_marketplace(handle.clone());
        let client = factory.build("ozon", Credentials::default()).unwrap();

        handle.fail(MockOperation::FetchProducts, UpstreamFailure::Status(503));
        assert!(client.fetch_products().await.is_err());
        handle.clear_failure(MockOperation::FetchProducts);
        assert!(client.fetch_products().await.unwrap().is_empty());

        assert_eq!(handle.calls().len(), 2);
        assert_eq!(factory.built_with().len(), 1);
    }

    #[test]
    fn unknown_slug_is_config_error() {
        let factory = MockClientFactory::new();
        let err = factory.build("sber", Credentials::default()).err().unwrap();
        assert!(matches!(err, MarketdeskError::Config(_)));
    }
}
