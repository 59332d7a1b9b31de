// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ozon push notifications.
//!
//! The endpoint always acknowledges: processing failures are logged and
//! reported as `error_logged`, never returned to Ozon.

use marketdesk_core::{MarketdeskError, OrderStatus, normalize_timestamp, now_timestamp};
use marketdesk_marketplace::{decimal, ozon_status, synthesized_email};
use marketdesk_storage::Database;
use marketdesk_storage::models::{NewOrder, NewOrderItem};
use marketdesk_storage::queries::{customers, marketplaces, orders};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::{debug, error, info, warn};

/// What happened to one webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed,
    Ignored,
    ErrorLogged,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    message_type: String,
    #[serde(default)]
    posting: Option<WebhookPosting>,
}

#[derive(Debug, Deserialize)]
struct WebhookPosting {
    #[serde(default)]
    posting_number: String,
    #[serde(default)]
    order_id: Option<serde_json::Value>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    in_process_at: Option<String>,
    #[serde(default)]
    products: Vec<WebhookProduct>,
}

#[derive(Debug, Deserialize)]
struct WebhookProduct {
    #[serde(default)]
    offer_id: String,
    #[serde(default)]
    name: String,
    #[serde(default = "one")]
    quantity: i64,
    #[serde(default, deserialize_with = "decimal")]
    price: f64,
}

fn one() -> i64 {
    1
}

impl WebhookPosting {
    fn order_ref(&self) -> String {
        match &self.order_id {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => self.posting_number.clone(),
        }
    }
}

/// Applies Ozon webhook events to the local order table.
#[derive(Clone)]
pub struct OzonWebhookProcessor {
    db: Database,
}

impl OzonWebhookProcessor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Handle one raw delivery. Never fails.
    pub async fn handle(&self, body: &[u8]) -> WebhookOutcome {
        let outcome = match serde_json::from_slice::<WebhookPayload>(body) {
            Ok(payload) => match self.process(payload).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "ozon webhook processing failed");
                    WebhookOutcome::ErrorLogged
                }
            },
            Err(e) => {
                error!(error = %e, "ozon webhook body is not valid JSON");
                WebhookOutcome::ErrorLogged
            }
        };
        marketdesk_prometheus::record_webhook(outcome.into());
        outcome
    }

    async fn process(&self, payload: WebhookPayload) -> Result<WebhookOutcome, MarketdeskError> {
        let handler = match payload.message_type.as_str() {
            "TYPE_NEW_POSTING" => EventKind::NewPosting,
            "TYPE_POSTING_CANCELLED" => EventKind::Cancelled,
            "TYPE_POSTING_STATUS_CHANGED" => EventKind::StatusChanged,
            other => {
                info!(message_type = other, "ignoring unknown ozon webhook type");
                return Ok(WebhookOutcome::Ignored);
            }
        };
        let posting = payload
            .posting
            .filter(|p| !p.posting_number.trim().is_empty())
            .ok_or_else(|| MarketdeskError::Validation("webhook carries no posting number".into()))?;

        match handler {
            EventKind::NewPosting => self.new_posting(posting).await?,
            EventKind::Cancelled => {
                self.apply_status(&posting.posting_number, OrderStatus::Cancelled)
                    .await?
            }
            EventKind::StatusChanged => {
                let status = ozon_status(&posting.status);
                self.apply_status(&posting.posting_number, status).await?
            }
        }
        Ok(WebhookOutcome::Processed)
    }

    async fn new_posting(&self, posting: WebhookPosting) -> Result<(), MarketdeskError> {
        if orders::get_order_by_number(&self.db, &posting.posting_number)
            .await?
            .is_some()
        {
            debug!(posting_number = %posting.posting_number, "order already exists");
            return Ok(());
        }
        let marketplace = marketplaces::find_marketplace(&self.db, "ozon")
            .await?
            .ok_or_else(|| MarketdeskError::not_found("marketplace", "ozon"))?;

        let order_ref = posting.order_ref();
        let customer_id = customers::find_or_create(
            &self.db,
            &format!("Ozon customer #{order_ref}"),
            &synthesized_email(&order_ref),
        )
        .await?;

        let items: Vec<NewOrderItem> = posting
            .products
            .iter()
            .map(|p| NewOrderItem {
                sku: p.offer_id.clone(),
                name: p.name.clone(),
                quantity: p.quantity.max(0),
                price: p.price,
            })
            .collect();
        let total_amount = items.iter().map(|i| i.price * i.quantity as f64).sum();
        let status = if posting.in_process_at.is_some() {
            OrderStatus::Processing
        } else {
            OrderStatus::New
        };

        let new = NewOrder {
            order_number: posting.posting_number.clone(),
            customer_id: Some(customer_id),
            marketplace_id: Some(marketplace.id),
            status,
            fulfillment_type: Some("FBS".to_string()),
            total_amount,
            items_count: items.iter().map(|i| i.quantity).sum(),
            shipping_address: None,
            created_at: posting
                .created_at
                .as_deref()
                .map(normalize_timestamp)
                .unwrap_or_else(now_timestamp),
            shipped_at: None,
        };
        let id = orders::insert_order(&self.db, &new, &items).await?;
        info!(posting_number = %posting.posting_number, order_id = id, %status, "ozon order created from webhook");
        Ok(())
    }

    async fn apply_status(
        &self,
        posting_number: &str,
        status: OrderStatus,
    ) -> Result<(), MarketdeskError> {
        let Some(order) = orders::get_order_by_number(&self.db, posting_number).await? else {
            warn!(posting_number, %status, "webhook status for unknown order");
            return Ok(());
        };
        if !order.status.can_transition_to(status) {
            warn!(
                posting_number,
                from = %order.status,
                to = %status,
                "webhook status change not allowed; keeping local status"
            );
            return Ok(());
        }
        orders::set_order_status(&self.db, order.id, status).await?;
        info!(posting_number, %status, "order status updated from webhook");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    NewPosting,
    Cancelled,
    StatusChanged,
}
