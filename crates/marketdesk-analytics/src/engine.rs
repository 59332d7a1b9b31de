// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregate queries over the order table.
//!
//! Revenue sums `total_amount` over every order in the window regardless of
//! status; only the funnel excludes cancelled and returned orders.

use chrono::Utc;
use marketdesk_config::model::AnalyticsConfig;
use marketdesk_core::{MarketdeskError, Period};
use marketdesk_storage::models::OrderFilter;
use marketdesk_storage::queries::{integrations, marketplaces, orders, products};
use marketdesk_storage::{Database, map_tr_err};
use rusqlite::params;
use tracing::debug;

use crate::calc::{average_order_value, growth_rate, round2, synthetic_funnel};
use crate::types::{
    AnalyticsReport, ConversionFunnel, DailyPoint, DashboardSnapshot, DashboardStats,
    MarketplaceBreakdown, SalesSummary,
};
use crate::window::Window;

/// Read-only analytics over the shared database.
#[derive(Clone)]
pub struct AnalyticsEngine {
    db: Database,
    low_stock_threshold: i64,
    recent_orders_limit: i64,
}

impl AnalyticsEngine {
    pub fn new(db: Database, config: &AnalyticsConfig) -> Self {
        Self {
            db,
            low_stock_threshold: config.low_stock_threshold,
            recent_orders_limit: config.recent_orders_limit,
        }
    }

    /// Summary, daily series and marketplace breakdown for one period code.
    pub async fn report(&self, period_code: &str) -> Result<AnalyticsReport, MarketdeskError> {
        let period: Period = period_code.parse()?;
        let window = Window::trailing(period, Utc::now());
        Ok(AnalyticsReport {
            period: period.code().to_string(),
            summary: self.summary(&window).await?,
            daily: self.daily_series(&window).await?,
            by_marketplace: self.by_marketplace(&window).await?,
        })
    }

    pub async fn summary(&self, window: &Window) -> Result<SalesSummary, MarketdeskError> {
        let (orders, revenue, active) = self.window_totals(window).await?;
        let (previous_orders, _, _) = self.window_totals(&window.previous()).await?;
        debug!(orders, previous_orders, "sales summary computed");
        Ok(SalesSummary {
            total_orders: orders,
            total_revenue: round2(revenue),
            average_order_value: average_order_value(revenue, orders),
            active_marketplaces: active,
            growth_rate: growth_rate(orders, previous_orders),
        })
    }

    /// One point per date with orders, oldest first. Dates without orders
    /// are absent, not zero.
    pub async fn daily_series(&self, window: &Window) -> Result<Vec<DailyPoint>, MarketdeskError> {
        let (start, end) = window.bounds();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT substr(created_at, 1, 10) AS day, COUNT(*),
                            COALESCE(SUM(total_amount), 0.0)
                     FROM orders
                     WHERE created_at >= ?1 AND (?2 IS NULL OR created_at < ?2)
                     GROUP BY day
                     ORDER BY day ASC",
                )?;
                let rows = stmt.query_map(params![start, end], |row| {
                    Ok(DailyPoint {
                        date: row.get(0)?,
                        orders: row.get(1)?,
                        revenue: round2(row.get(2)?),
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Marketplaces with at least one order in the window, highest revenue
    /// first.
    pub async fn by_marketplace(
        &self,
        window: &Window,
    ) -> Result<Vec<MarketplaceBreakdown>, MarketdeskError> {
        let (start, end) = window.bounds();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT m.id, m.name, COUNT(o.id), COALESCE(SUM(o.total_amount), 0.0) AS revenue
                     FROM orders o
                     JOIN marketplaces m ON m.id = o.marketplace_id
                     WHERE o.created_at >= ?1 AND (?2 IS NULL OR o.created_at < ?2)
                     GROUP BY m.id, m.name
                     ORDER BY revenue DESC, m.id ASC",
                )?;
                let rows = stmt.query_map(params![start, end], |row| {
                    Ok(MarketplaceBreakdown {
                        marketplace_id: row.get(0)?,
                        name: row.get(1)?,
                        orders: row.get(2)?,
                        revenue: round2(row.get(3)?),
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }

    /// All-time counters, latest orders and products running low.
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot, MarketdeskError> {
        let (total_orders, total_revenue) = orders::order_totals(&self.db).await?;
        let stats = DashboardStats {
            total_marketplaces: marketplaces::count_marketplaces(&self.db).await?,
            connected_marketplaces: integrations::count_active_integrations(&self.db).await?,
            total_products: products::count_active_products(&self.db).await?,
            total_orders,
            total_revenue: round2(total_revenue),
        };
        let recent_orders = orders::list_orders(
            &self.db,
            &OrderFilter {
                limit: self.recent_orders_limit,
                ..Default::default()
            },
        )
        .await?;
        let low_stock_products = products::low_stock_products(
            &self.db,
            self.low_stock_threshold,
            self.recent_orders_limit,
        )
        .await?;
        Ok(DashboardSnapshot {
            stats,
            recent_orders,
            low_stock_products,
        })
    }

    /// Synthetic funnel from the completed orders of a period.
    pub async fn conversion_funnel(
        &self,
        period_code: &str,
    ) -> Result<ConversionFunnel, MarketdeskError> {
        let period: Period = period_code.parse()?;
        let (start, end) = Window::trailing(period, Utc::now()).bounds();
        let completed: i64 = self
            .db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM orders
                     WHERE created_at >= ?1 AND (?2 IS NULL OR created_at < ?2)
                       AND status NOT IN ('cancelled', 'returned')",
                    params![start, end],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(synthetic_funnel(completed))
    }

    /// (orders, revenue, distinct marketplaces) inside `window`.
    async fn window_totals(&self, window: &Window) -> Result<(i64, f64, i64), MarketdeskError> {
        let (start, end) = window.bounds();
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(total_amount), 0.0),
                            COUNT(DISTINCT marketplace_id)
                     FROM orders
                     WHERE created_at >= ?1 AND (?2 IS NULL OR created_at < ?2)",
                    params![start, end],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
            })
            .await
            .map_err(map_tr_err)
    }
}
