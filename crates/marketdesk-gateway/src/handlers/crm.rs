// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `/api/crm`: marketplaces and integrations, catalog, orders, customers,
//! and the analytics views.

use axum::{extract::State, response::Response};
use marketdesk_core::{MarketdeskError, OrderStatus};
use marketdesk_marketplace::{CredentialSource, validate_for};
use marketdesk_storage::models::{NewProduct, OrderFilter};
use marketdesk_storage::queries::{customers, integrations, marketplaces, orders, products};
use serde_json::json;
use tracing::info;

use crate::auth::ActingUser;
use crate::envelope::{ApiError, ok};
use crate::handlers::unknown_action;
use crate::request::ApiRequest;
use crate::server::AppState;

/// Upper bound on listed orders and customers.
pub const LIST_LIMIT: i64 = 100;

pub async fn handle(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    req: ApiRequest,
) -> Result<Response, ApiError> {
    match req.action()? {
        "getMarketplaces" => Ok(ok(marketplaces::list_overview(&state.db, user_id).await?)),
        "connectMarketplace" => connect(&state, user_id, &req).await,
        "disconnectMarketplace" => {
            let marketplace_id = req.require_i64("marketplaceId")?;
            if !integrations::deactivate_integration(&state.db, user_id, marketplace_id).await? {
                return Err(MarketdeskError::not_found("integration", marketplace_id).into());
            }
            info!(user_id, marketplace_id, "marketplace disconnected");
            Ok(ok(json!({ "marketplaceId": marketplace_id, "connected": false })))
        }
        "getProducts" => {
            let marketplace_id = req.opt_i64("marketplaceId")?;
            Ok(ok(products::list_products(&state.db, marketplace_id).await?))
        }
        "createProduct" => {
            let new: NewProduct = req.body_as()?;
            let product = products::create_product(&state.db, &new).await?;
            info!(product_id = product.id, sku = %product.sku, "product created");
            Ok(ok(product))
        }
        "deleteProduct" => {
            let product_id = req.require_i64("productId")?;
            if !products::soft_delete_product(&state.db, product_id).await? {
                return Err(MarketdeskError::not_found("product", product_id).into());
            }
            Ok(ok(json!({ "productId": product_id, "deleted": true })))
        }
        "getOrders" => {
            let status = req
                .opt_str("status")
                .map(|s| s.parse::<OrderStatus>())
                .transpose()
                .map_err(|_| ApiError::validation("unknown order status"))?;
            let filter = OrderFilter {
                status,
                marketplace_id: req.opt_i64("marketplaceId")?,
                limit: list_limit(&req)?,
            };
            Ok(ok(orders::list_orders(&state.db, &filter).await?))
        }
        "updateOrderStatus" => update_order_status(&state, &req).await,
        "getCustomers" => {
            let limit = list_limit(&req)?;
            Ok(ok(customers::list_customers(&state.db, limit).await?))
        }
        "getAnalytics" => {
            let period = req.opt_str("period").unwrap_or_else(|| "30d".to_string());
            Ok(ok(state.analytics.report(&period).await?))
        }
        "getDashboard" => Ok(ok(state.analytics.dashboard_snapshot().await?)),
        "getConversionFunnel" => {
            let period = req.opt_str("period").unwrap_or_else(|| "30d".to_string());
            Ok(ok(state.analytics.conversion_funnel(&period).await?))
        }
        other => Err(unknown_action(other)),
    }
}

/// `limit` clamped to `1..=LIST_LIMIT`, defaulting to the maximum.
fn list_limit(req: &ApiRequest) -> Result<i64, ApiError> {
    Ok(req.opt_i64("limit")?.unwrap_or(LIST_LIMIT).clamp(1, LIST_LIMIT))
}

/// Store credentials for a marketplace found by slug or name. No upstream
/// call is made; the first sync is what exercises the credentials.
async fn connect(state: &AppState, user_id: i64, req: &ApiRequest) -> Result<Response, ApiError> {
    let name = req.require_str("name")?;
    let marketplace = marketplaces::find_marketplace(&state.db, &name)
        .await?
        .ok_or_else(|| MarketdeskError::not_found("marketplace", &name))?;
    let credentials = req
        .credentials()
        .ok_or_else(|| ApiError::validation("`apiKey` is required"))?;
    validate_for(&marketplace.slug, &credentials, CredentialSource::Explicit)?;

    let integration =
        integrations::upsert_integration(&state.db, user_id, marketplace.id, &credentials).await?;
    info!(user_id, marketplace = %marketplace.slug, "marketplace connected");
    Ok(ok(json!({
        "marketplace": marketplace,
        "integration": integration,
    })))
}

async fn update_order_status(state: &AppState, req: &ApiRequest) -> Result<Response, ApiError> {
    let order_id = req.require_i64("orderId")?;
    let next: OrderStatus = req
        .require_str("status")?
        .parse()
        .map_err(|_| ApiError::validation("unknown order status"))?;
    let order = orders::get_order(&state.db, order_id)
        .await?
        .ok_or_else(|| MarketdeskError::not_found("order", order_id))?;
    if !order.status.can_transition_to(next) {
        return Err(ApiError::validation(format!(
            "order {} cannot move from {} to {next}",
            order.order_number, order.status
        )));
    }
    orders::set_order_status(&state.db, order_id, next).await?;
    let updated = orders::get_order(&state.db, order_id)
        .await?
        .ok_or_else(|| MarketdeskError::not_found("order", order_id))?;
    info!(order_id, from = %order.status, to = %next, "order status updated");
    Ok(ok(updated))
}
