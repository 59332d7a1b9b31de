// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single marketplace actions outside a sync run: price and stock pushes,
//! finance and returns listings, return acceptance and posting shipment.

use chrono::{Duration, Utc};
use marketdesk_core::{
    Credentials, FinanceTransaction, MarketdeskError, MarketplaceClient, OrderStatus,
    ReturnRecord, ShipmentItem, format_timestamp,
};
use marketdesk_marketplace::resolve_credentials;
use marketdesk_storage::models::{Integration, Marketplace};
use marketdesk_storage::queries::{integrations, orders, products};
use tracing::{debug, info};

use crate::engine::SyncEngine;

/// Trailing window for finance listings when no range is given.
const DEFAULT_FINANCE_WINDOW_DAYS: i64 = 30;

/// The account a marketplace action runs against.
///
/// Explicit credentials take precedence over the stored integration, which
/// takes precedence over configured fallbacks.
#[derive(Debug, Clone)]
pub struct AccountRef {
    pub user_id: i64,
    pub marketplace_id: i64,
    pub credentials: Option<Credentials>,
}

impl AccountRef {
    pub fn new(user_id: i64, marketplace_id: i64) -> Self {
        Self {
            user_id,
            marketplace_id,
            credentials: None,
        }
    }
}

impl SyncEngine {
    async fn client_for(
        &self,
        account: &AccountRef,
    ) -> Result<(Marketplace, Box<dyn MarketplaceClient>), MarketdeskError> {
        let marketplace = self.marketplace(account.marketplace_id).await?;
        let stored = integrations::get_integration(&self.db, account.user_id, marketplace.id)
            .await?
            .filter(Integration::is_active)
            .and_then(|i| i.credentials());
        let (credentials, source) = resolve_credentials(
            &marketplace.slug,
            account.credentials.clone(),
            stored,
            self.factory.fallback_credentials(&marketplace.slug),
        )?;
        debug!(marketplace = %marketplace.slug, ?source, "credentials resolved");
        let client = self.factory.build(&marketplace.slug, credentials)?;
        Ok((marketplace, client))
    }

    /// Push a new price for `offer_id`. Refreshes the local link price when
    /// the product is linked; returns whether it was.
    pub async fn update_price(
        &self,
        account: &AccountRef,
        offer_id: &str,
        price: f64,
        old_price: Option<f64>,
    ) -> Result<bool, MarketdeskError> {
        if offer_id.trim().is_empty() {
            return Err(MarketdeskError::Validation("offerId is required".into()));
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(MarketdeskError::Validation(format!(
                "price must be positive, got {price}"
            )));
        }
        let (marketplace, client) = self.client_for(account).await?;
        client.update_price(offer_id, price, old_price).await?;
        let linked = products::refresh_link_price(&self.db, marketplace.id, offer_id, price).await?;
        info!(marketplace = %marketplace.slug, offer_id, price, linked, "price updated");
        Ok(linked)
    }

    /// Push a new stock level for `offer_id`. Refreshes the local link stock
    /// when the product is linked; returns whether it was.
    pub async fn update_stock(
        &self,
        account: &AccountRef,
        offer_id: &str,
        stock: i64,
        warehouse_id: Option<i64>,
    ) -> Result<bool, MarketdeskError> {
        if offer_id.trim().is_empty() {
            return Err(MarketdeskError::Validation("offerId is required".into()));
        }
        if stock < 0 {
            return Err(MarketdeskError::Validation(format!(
                "stock must not be negative, got {stock}"
            )));
        }
        let (marketplace, client) = self.client_for(account).await?;
        client.update_stock(offer_id, stock, warehouse_id).await?;
        let linked = products::refresh_link_stock(&self.db, marketplace.id, offer_id, stock).await?;
        info!(marketplace = %marketplace.slug, offer_id, stock, linked, "stock updated");
        Ok(linked)
    }

    /// Finance operations between `from` and `to`, defaulting to the last
    /// 30 days.
    pub async fn finance(
        &self,
        account: &AccountRef,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<FinanceTransaction>, MarketdeskError> {
        let now = Utc::now();
        let from = from
            .map(str::to_string)
            .unwrap_or_else(|| format_timestamp(now - Duration::days(DEFAULT_FINANCE_WINDOW_DAYS)));
        let to = to.map(str::to_string).unwrap_or_else(|| format_timestamp(now));
        if from > to {
            return Err(MarketdeskError::Validation(format!(
                "finance range starts after it ends ({from} > {to})"
            )));
        }
        let (_, client) = self.client_for(account).await?;
        client.fetch_finance_transactions(&from, &to).await
    }

    pub async fn returns(&self, account: &AccountRef) -> Result<Vec<ReturnRecord>, MarketdeskError> {
        let (_, client) = self.client_for(account).await?;
        client.fetch_returns().await
    }

    pub async fn accept_return(
        &self,
        account: &AccountRef,
        return_id: &str,
    ) -> Result<(), MarketdeskError> {
        if return_id.trim().is_empty() {
            return Err(MarketdeskError::Validation("returnId is required".into()));
        }
        let (marketplace, client) = self.client_for(account).await?;
        client.accept_return(return_id).await?;
        info!(marketplace = %marketplace.slug, return_id, "return accepted");
        Ok(())
    }

    /// Ship an FBS posting, then mark the matching local order shipped when
    /// that transition is allowed. Returns whether a local order moved.
    pub async fn ship_posting(
        &self,
        account: &AccountRef,
        posting_number: &str,
        items: &[ShipmentItem],
    ) -> Result<bool, MarketdeskError> {
        if posting_number.trim().is_empty() {
            return Err(MarketdeskError::Validation("postingNumber is required".into()));
        }
        if items.is_empty() || items.iter().any(|i| i.quantity <= 0) {
            return Err(MarketdeskError::Validation(
                "shipment needs at least one item with a positive quantity".into(),
            ));
        }
        let (marketplace, client) = self.client_for(account).await?;
        client.ship_posting(posting_number, items).await?;

        let moved = match orders::get_order_by_number(&self.db, posting_number).await? {
            Some(order)
                if order.status != OrderStatus::Shipped
                    && order.status.can_transition_to(OrderStatus::Shipped) =>
            {
                orders::set_order_status(&self.db, order.id, OrderStatus::Shipped).await?;
                true
            }
            _ => false,
        };
        info!(marketplace = %marketplace.slug, posting_number, moved, "posting shipped");
        Ok(moved)
    }
}
