// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/sync`: pull catalog and orders from a connected marketplace.

use axum::{extract::State, http::StatusCode, response::Response};
use serde_json::json;

use crate::auth::ActingUser;
use crate::envelope::{ApiError, ok, partial};
use crate::handlers::unknown_action;
use crate::request::ApiRequest;
use crate::server::AppState;

const ACTIONS: [&str; 4] = ["syncProducts", "syncOrders", "fullSync", "reconcileCustomers"];

pub async fn handle(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    req: ApiRequest,
) -> Result<Response, ApiError> {
    let action = req.action()?;
    if !ACTIONS.contains(&action) {
        return Err(unknown_action(action));
    }
    let marketplace_id = req.require_i64("marketplaceId")?;
    match action {
        "syncProducts" => {
            let products = state.sync.sync_products(user_id, marketplace_id).await?;
            Ok(ok(json!({ "marketplaceId": marketplace_id, "products": products })))
        }
        "syncOrders" => {
            let days = req.opt_i64("days")?;
            let outcome = state.sync.sync_orders(user_id, marketplace_id, days).await?;
            Ok(ok(json!({
                "marketplaceId": marketplace_id,
                "created": outcome.created,
                "updated": outcome.updated,
                "transitionsRejected": outcome.transitions_rejected,
            })))
        }
        "fullSync" => {
            let report = state.sync.full_sync(user_id, marketplace_id).await?;
            if report.is_success() {
                return Ok(ok(report));
            }
            // Completed steps stay committed; the report says how far it got.
            let message = report
                .error
                .clone()
                .unwrap_or_else(|| "sync did not complete".to_string());
            Ok(partial(
                StatusCode::INTERNAL_SERVER_ERROR,
                "sync_incomplete",
                message,
                report,
            ))
        }
        "reconcileCustomers" => {
            let customers = state.sync.reconcile_customers(marketplace_id).await?;
            Ok(ok(json!({ "marketplaceId": marketplace_id, "customers": customers })))
        }
        other => Err(unknown_action(other)),
    }
}
