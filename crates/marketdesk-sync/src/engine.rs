// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace sync engine.
//!
//! Reconciles the local catalog, orders and customers against one
//! (user, marketplace) integration. Every write is an upsert on a natural
//! key (sku, order number, email), so repeating a sync only moves
//! timestamps.

use std::sync::Arc;

use chrono::{Duration, Utc};
use marketdesk_core::{ClientFactory, MarketdeskError, MarketplaceClient, format_timestamp};
use marketdesk_marketplace::resolve_credentials;
use marketdesk_storage::Database;
use marketdesk_storage::models::{Integration, Marketplace, NewOrder, NewOrderItem};
use marketdesk_storage::queries::{customers, integrations, marketplaces, orders, products};
use tracing::{debug, info, warn};

use crate::report::{OrderSyncOutcome, SyncReport, SyncStep};

/// Trailing order window used when none is given.
pub const DEFAULT_ORDER_WINDOW_DAYS: i64 = 30;

/// A connected integration with a client built from its credentials.
pub(crate) struct SyncTarget {
    pub marketplace: Marketplace,
    pub integration: Integration,
    pub client: Box<dyn MarketplaceClient>,
}

/// Runs product, order and customer reconciliation for one integration at
/// a time. Cheap to clone.
#[derive(Clone)]
pub struct SyncEngine {
    pub(crate) db: Database,
    pub(crate) factory: Arc<dyn ClientFactory>,
    order_window_days: i64,
}

impl SyncEngine {
    pub fn new(db: Database, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            db,
            factory,
            order_window_days: DEFAULT_ORDER_WINDOW_DAYS,
        }
    }

    /// Override the default trailing order window.
    pub fn with_order_window(mut self, days: i64) -> Self {
        self.order_window_days = days;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub(crate) async fn marketplace(
        &self,
        marketplace_id: i64,
    ) -> Result<Marketplace, MarketdeskError> {
        marketplaces::get_marketplace(&self.db, marketplace_id)
            .await?
            .ok_or_else(|| MarketdeskError::not_found("marketplace", marketplace_id))
    }

    /// Load the active integration and build its client.
    ///
    /// Fails with `NotConnected` when the user has no active integration,
    /// before any marketplace call is made.
    async fn target(&self, user_id: i64, marketplace_id: i64) -> Result<SyncTarget, MarketdeskError> {
        let marketplace = self.marketplace(marketplace_id).await?;
        let integration = integrations::get_integration(&self.db, user_id, marketplace_id)
            .await?
            .filter(Integration::is_active)
            .ok_or_else(|| MarketdeskError::NotConnected {
                marketplace: marketplace.slug.clone(),
            })?;

        let (credentials, source) = resolve_credentials(
            &marketplace.slug,
            None,
            integration.credentials(),
            self.factory.fallback_credentials(&marketplace.slug),
        )?;
        debug!(marketplace = %marketplace.slug, user_id, ?source, "credentials resolved");
        let client = self.factory.build(&marketplace.slug, credentials)?;

        Ok(SyncTarget {
            marketplace,
            integration,
            client,
        })
    }

    /// Pull the catalog and upsert products and their marketplace links.
    ///
    /// Returns the number of products touched.
    pub async fn sync_products(
        &self,
        user_id: i64,
        marketplace_id: i64,
    ) -> Result<usize, MarketdeskError> {
        let target = self.target(user_id, marketplace_id).await?;
        let count = self.products_step(&target).await?;
        integrations::touch_last_sync(&self.db, target.integration.id).await?;
        Ok(count)
    }

    /// Pull orders from the trailing window (default 30 days) and upsert
    /// them with their customers.
    pub async fn sync_orders(
        &self,
        user_id: i64,
        marketplace_id: i64,
        window_days: Option<i64>,
    ) -> Result<OrderSyncOutcome, MarketdeskError> {
        let window_days = window_days.unwrap_or(self.order_window_days);
        if window_days <= 0 {
            return Err(MarketdeskError::Validation(format!(
                "order window must be positive, got {window_days} days"
            )));
        }
        let target = self.target(user_id, marketplace_id).await?;
        let mut outcome = OrderSyncOutcome::default();
        self.orders_step(&target, window_days, &mut outcome).await?;
        integrations::touch_last_sync(&self.db, target.integration.id).await?;
        Ok(outcome)
    }

    /// Recompute lifetime spend and order count for every customer with an
    /// order on the marketplace. Returns the number of customers touched.
    pub async fn reconcile_customers(&self, marketplace_id: i64) -> Result<usize, MarketdeskError> {
        let marketplace = self.marketplace(marketplace_id).await?;
        self.customers_step(&marketplace).await
    }

    /// Products, then orders, then customer reconciliation.
    ///
    /// A failing step stops the run. The returned report carries the counts
    /// of the steps that completed plus the failed step and its error; an
    /// `Err` means the run never started.
    pub async fn full_sync(
        &self,
        user_id: i64,
        marketplace_id: i64,
    ) -> Result<SyncReport, MarketdeskError> {
        let target = self.target(user_id, marketplace_id).await?;
        let mut report = SyncReport::start(
            marketplace_id,
            &target.marketplace.slug,
            target.client.is_simulated(),
        );
        info!(marketplace = %target.marketplace.slug, user_id, "full sync started");

        let step = self.products_step(&target).await.map(|n| report.products = n);
        if !self.settle(&target, &mut report, SyncStep::Products, step).await {
            return Ok(report.finish());
        }

        let step = self
            .orders_step(&target, self.order_window_days, &mut report.orders)
            .await;
        if !self.settle(&target, &mut report, SyncStep::Orders, step).await {
            return Ok(report.finish());
        }

        let step = self
            .customers_step(&target.marketplace)
            .await
            .map(|n| report.customers = n);
        self.settle(&target, &mut report, SyncStep::Customers, step).await;

        info!(
            marketplace = %target.marketplace.slug,
            products = report.products,
            orders = report.orders.total(),
            customers = report.customers,
            "full sync finished"
        );
        Ok(report.finish())
    }

    /// Stamp `last_sync` after a successful step, or record the failure.
    /// Returns whether the run may continue.
    async fn settle(
        &self,
        target: &SyncTarget,
        report: &mut SyncReport,
        step: SyncStep,
        result: Result<(), MarketdeskError>,
    ) -> bool {
        let stamped = match result {
            Ok(()) => integrations::touch_last_sync(&self.db, target.integration.id).await,
            Err(e) => Err(e),
        };
        match stamped {
            Ok(last_sync) => {
                report.complete(step, last_sync);
                true
            }
            Err(e) => {
                warn!(
                    marketplace = %target.marketplace.slug,
                    step = %step,
                    error = %e,
                    "sync step failed; remaining steps skipped"
                );
                marketdesk_prometheus::record_sync_failure(&target.marketplace.slug, step.into());
                report.fail(step, &e);
                false
            }
        }
    }

    async fn products_step(&self, target: &SyncTarget) -> Result<usize, MarketdeskError> {
        let fetched = target.client.fetch_products().await?;
        let mut touched = 0;
        for product in &fetched {
            if product.sku.trim().is_empty() {
                warn!(external_id = %product.external_id, "skipping product without sku");
                continue;
            }
            let product_id = products::upsert_from_marketplace(&self.db, product).await?;
            products::upsert_link(
                &self.db,
                product_id,
                target.marketplace.id,
                &product.external_id,
                product.price,
                product.stock,
            )
            .await?;
            touched += 1;
        }

        marketdesk_prometheus::record_synced(&target.marketplace.slug, "products", touched as u64);
        info!(marketplace = %target.marketplace.slug, products = touched, "products synced");
        Ok(touched)
    }

    /// Counts land in `outcome` as each order is written, so orders stored
    /// before a failure stay counted.
    async fn orders_step(
        &self,
        target: &SyncTarget,
        window_days: i64,
        outcome: &mut OrderSyncOutcome,
    ) -> Result<(), MarketdeskError> {
        let to = Utc::now();
        let since = to - Duration::days(window_days);
        let fetched = target
            .client
            .fetch_orders(&format_timestamp(since), &format_timestamp(to))
            .await?;

        for order in fetched {
            if order.order_number.trim().is_empty() {
                warn!(marketplace = %target.marketplace.slug, "skipping order without number");
                continue;
            }
            let customer_id = if order.customer_email.trim().is_empty() {
                None
            } else {
                Some(
                    customers::find_or_create(&self.db, &order.customer_name, &order.customer_email)
                        .await?,
                )
            };

            match orders::get_order_by_number(&self.db, &order.order_number).await? {
                None => {
                    let new = NewOrder {
                        order_number: order.order_number.clone(),
                        customer_id,
                        marketplace_id: Some(target.marketplace.id),
                        status: order.status,
                        fulfillment_type: order.fulfillment_type.clone(),
                        total_amount: order.total_amount,
                        items_count: order.items_count(),
                        shipping_address: None,
                        created_at: order.created_at.clone(),
                        shipped_at: order.shipped_at.clone(),
                    };
                    let items: Vec<NewOrderItem> = order
                        .items
                        .iter()
                        .map(|item| NewOrderItem {
                            sku: item.sku.clone(),
                            name: item.name.clone(),
                            quantity: item.quantity,
                            price: item.price,
                        })
                        .collect();
                    orders::insert_order(&self.db, &new, &items).await?;
                    outcome.created += 1;
                }
                Some(existing) => {
                    let status = if existing.status.can_transition_to(order.status) {
                        order.status
                    } else {
                        warn!(
                            order_number = %order.order_number,
                            from = %existing.status,
                            to = %order.status,
                            "upstream status change not allowed; keeping local status"
                        );
                        outcome.transitions_rejected += 1;
                        existing.status
                    };
                    orders::update_synced_order(
                        &self.db,
                        existing.id,
                        status,
                        order.total_amount,
                        order.items_count(),
                        order.shipped_at.clone(),
                    )
                    .await?;
                    outcome.updated += 1;
                }
            }
        }

        marketdesk_prometheus::record_synced(
            &target.marketplace.slug,
            "orders",
            outcome.total() as u64,
        );
        info!(
            marketplace = %target.marketplace.slug,
            created = outcome.created,
            updated = outcome.updated,
            window_days,
            "orders synced"
        );
        Ok(())
    }

    async fn customers_step(&self, marketplace: &Marketplace) -> Result<usize, MarketdeskError> {
        let touched = customers::reconcile_for_marketplace(&self.db, marketplace.id).await?;
        marketdesk_prometheus::record_synced(&marketplace.slug, "customers", touched as u64);
        info!(marketplace = %marketplace.slug, customers = touched, "customers reconciled");
        Ok(touched)
    }
}
