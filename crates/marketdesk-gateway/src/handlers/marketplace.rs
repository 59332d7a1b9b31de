// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/marketplace`: single actions against a marketplace account.
//!
//! Credentials may come with the request (`apiKey`, `clientId`); otherwise
//! the stored integration or the configured fallback is used.

use axum::{extract::State, response::Response};
use marketdesk_core::ShipmentItem;
use marketdesk_sync::AccountRef;
use serde_json::json;

use crate::auth::ActingUser;
use crate::envelope::{ApiError, ok};
use crate::handlers::unknown_action;
use crate::request::ApiRequest;
use crate::server::AppState;

const ACTIONS: [&str; 6] = [
    "updatePrice",
    "updateStock",
    "getFinance",
    "getReturns",
    "acceptReturn",
    "shipPosting",
];

pub async fn handle(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    req: ApiRequest,
) -> Result<Response, ApiError> {
    let action = req.action()?;
    if !ACTIONS.contains(&action) {
        return Err(unknown_action(action));
    }
    let account = AccountRef {
        user_id,
        marketplace_id: req.require_i64("marketplaceId")?,
        credentials: req.credentials(),
    };
    let sync = &state.sync;
    match action {
        "updatePrice" => {
            let offer_id = req.require_str("offerId")?;
            let price = req.require_f64("price")?;
            let old_price = req.opt_f64("oldPrice")?;
            let linked = sync.update_price(&account, &offer_id, price, old_price).await?;
            Ok(ok(json!({ "offerId": offer_id, "price": price, "linked": linked })))
        }
        "updateStock" => {
            let offer_id = req.require_str("offerId")?;
            let stock = req.require_i64("stock")?;
            let warehouse_id = req.opt_i64("warehouseId")?;
            let linked = sync
                .update_stock(&account, &offer_id, stock, warehouse_id)
                .await?;
            Ok(ok(json!({ "offerId": offer_id, "stock": stock, "linked": linked })))
        }
        "getFinance" => {
            let from = req.opt_str("from");
            let to = req.opt_str("to");
            let transactions = sync
                .finance(&account, from.as_deref(), to.as_deref())
                .await?;
            Ok(ok(json!({ "total": transactions.len(), "transactions": transactions })))
        }
        "getReturns" => {
            let returns = sync.returns(&account).await?;
            Ok(ok(json!({ "total": returns.len(), "returns": returns })))
        }
        "acceptReturn" => {
            let return_id = req.require_str("returnId")?;
            sync.accept_return(&account, &return_id).await?;
            Ok(ok(json!({ "returnId": return_id, "accepted": true })))
        }
        "shipPosting" => {
            let posting_number = req.require_str("postingNumber")?;
            let items: Vec<ShipmentItem> = req.field("items")?;
            let order_updated = sync
                .ship_posting(&account, &posting_number, &items)
                .await?;
            Ok(ok(json!({
                "postingNumber": posting_number,
                "shipped": true,
                "orderUpdated": order_updated,
            })))
        }
        other => Err(unknown_action(other)),
    }
}
