// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report shapes returned by the analytics engine.

use marketdesk_storage::models::{Order, Product};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    /// Distinct marketplaces with at least one order in the window.
    pub active_marketplaces: i64,
    /// Percent change in order count against the previous window.
    pub growth_rate: f64,
}

/// Orders and revenue on one calendar date (`YYYY-MM-DD`, UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub orders: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceBreakdown {
    pub marketplace_id: i64,
    pub name: String,
    pub orders: i64,
    pub revenue: f64,
}

/// Summary, daily series and marketplace breakdown for one period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub period: String,
    pub summary: SalesSummary,
    pub daily: Vec<DailyPoint>,
    pub by_marketplace: Vec<MarketplaceBreakdown>,
}

/// All-time counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_marketplaces: i64,
    pub connected_marketplaces: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
}

/// Synthetic conversion funnel; `synthetic` is always true.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFunnel {
    pub views: i64,
    pub cart_adds: i64,
    pub checkouts: i64,
    pub completed: i64,
    pub conversion_rate: f64,
    pub synthetic: bool,
}
