// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forecast computations over order history, each persisted as one
//! prediction record.

use chrono::{Duration, Utc};
use marketdesk_config::model::ForecastConfig;
use marketdesk_core::{MarketdeskError, format_timestamp};
use marketdesk_prometheus::record_forecast;
use marketdesk_storage::models::{NewPrediction, Prediction};
use marketdesk_storage::queries::{marketplaces, predictions, products};
use marketdesk_storage::{Database, map_tr_err};
use rusqlite::params;
use serde_json::json;
use tracing::{debug, info};

use crate::stats::{
    HISTORY_DAYS, MIN_ANOMALY_POINTS, RiskLevel, classify_anomaly, mean, returns_confidence,
    round_to, sales_confidence, std_dev, trend_factor, z_score,
};
use crate::types::{
    Anomaly, AnomalyReport, DemandForecast, DemandItem, ForecastPoint, PredictionType,
    ReturnsPrediction, SalesForecast,
};

/// Probability reported for products that were never ordered.
pub const FALLBACK_RETURN_PROBABILITY: f64 = 0.05;
pub const FALLBACK_RETURN_CONFIDENCE: f64 = 0.3;
pub const ANOMALY_CONFIDENCE: f64 = 0.85;
pub const DEMAND_LIMIT: i64 = 10;
pub const PREDICTION_LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct ForecastEngine {
    db: Database,
    default_horizon_days: u32,
    max_horizon_days: u32,
}

impl ForecastEngine {
    pub fn new(db: Database, config: &ForecastConfig) -> Self {
        Self {
            db,
            default_horizon_days: config.default_horizon_days,
            max_horizon_days: config.max_horizon_days,
        }
    }

    /// Per-day unit forecast for the next `horizon_days` days.
    pub async fn sales_forecast(
        &self,
        product_id: i64,
        horizon_days: Option<u32>,
    ) -> Result<SalesForecast, MarketdeskError> {
        let horizon = horizon_days.unwrap_or(self.default_horizon_days);
        if horizon == 0 || horizon > self.max_horizon_days {
            return Err(MarketdeskError::Validation(format!(
                "horizon must be between 1 and {} days, got {horizon}",
                self.max_horizon_days
            )));
        }
        self.require_product(product_id).await?;

        let daily = self.daily_quantities(product_id).await?;
        if daily.is_empty() {
            debug!(product_id, "no sales history for forecast");
            return Ok(SalesForecast {
                product_id,
                forecast: Vec::new(),
                avg_daily_sales: 0.0,
                trend_factor: 1.0,
                data_points: 0,
                confidence: 0.0,
                message: Some("not enough sales history for a forecast".to_string()),
            });
        }

        let avg = mean(&daily);
        let trend = trend_factor(&daily);
        let confidence = sales_confidence(daily.len());
        let today = Utc::now();
        let forecast: Vec<ForecastPoint> = (1..=i64::from(horizon))
            .map(|day| {
                let predicted = (avg * trend * (1.0 + 0.02 * day as f64)).round() as i64;
                ForecastPoint {
                    date: (today + Duration::days(day)).format("%Y-%m-%d").to_string(),
                    predicted_sales: predicted.max(0),
                    confidence,
                }
            })
            .collect();

        self.persist(
            PredictionType::SalesForecast,
            Some(product_id),
            None,
            serde_json::to_value(&forecast)?,
            confidence,
        )
        .await?;
        info!(product_id, horizon, data_points = daily.len(), "sales forecast computed");

        Ok(SalesForecast {
            product_id,
            forecast,
            avg_daily_sales: round_to(avg, 2),
            trend_factor: round_to(trend, 2),
            data_points: daily.len(),
            confidence,
            message: None,
        })
    }

    /// Share of the product's orders that ended up returned.
    pub async fn returns_prediction(
        &self,
        product_id: i64,
    ) -> Result<ReturnsPrediction, MarketdeskError> {
        self.require_product(product_id).await?;

        let (total_orders, returned_orders): (i64, i64) = self
            .db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT COUNT(DISTINCT o.id),
                            COUNT(DISTINCT CASE WHEN o.status = 'returned' THEN o.id END)
                     FROM order_items oi
                     JOIN orders o ON o.id = oi.order_id
                     WHERE oi.product_id = ?1",
                    params![product_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .map_err(map_tr_err)?;

        if total_orders == 0 {
            return Ok(ReturnsPrediction {
                product_id,
                return_probability: FALLBACK_RETURN_PROBABILITY,
                confidence: FALLBACK_RETURN_CONFIDENCE,
                risk_level: None,
                total_orders: 0,
                returned_orders: 0,
                message: Some("not enough order history, using the average probability".into()),
            });
        }

        let rate = returned_orders as f64 / total_orders as f64;
        let confidence = returns_confidence(total_orders);
        let risk = RiskLevel::from_return_rate(rate);
        let prediction = ReturnsPrediction {
            product_id,
            return_probability: round_to(rate, 3),
            confidence: round_to(confidence, 2),
            risk_level: Some(risk),
            total_orders,
            returned_orders,
            message: None,
        };
        self.persist(
            PredictionType::ReturnsPrediction,
            Some(product_id),
            None,
            json!({
                "returnProbability": prediction.return_probability,
                "riskLevel": risk,
                "totalOrders": total_orders,
                "returnedOrders": returned_orders,
            }),
            confidence,
        )
        .await?;
        Ok(prediction)
    }

    /// Flag days whose revenue lies more than two standard deviations from
    /// the 30-day mean.
    pub async fn anomaly_detection(
        &self,
        marketplace_id: i64,
    ) -> Result<AnomalyReport, MarketdeskError> {
        if marketplaces::get_marketplace(&self.db, marketplace_id)
            .await?
            .is_none()
        {
            return Err(MarketdeskError::not_found("marketplace", marketplace_id));
        }

        let since = history_start();
        let series: Vec<(String, f64)> = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT substr(created_at, 1, 10) AS day, COALESCE(SUM(total_amount), 0.0)
                     FROM orders
                     WHERE marketplace_id = ?1 AND created_at >= ?2
                     GROUP BY day
                     ORDER BY day ASC",
                )?;
                let rows = stmt.query_map(params![marketplace_id, since], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)?;

        if series.len() < MIN_ANOMALY_POINTS {
            return Ok(AnomalyReport {
                marketplace_id,
                anomalies: Vec::new(),
                data_points: series.len(),
                avg_revenue: 0.0,
                std_deviation: 0.0,
                message: Some(format!(
                    "at least {MIN_ANOMALY_POINTS} days of revenue are needed, found {}",
                    series.len()
                )),
            });
        }

        let revenues: Vec<f64> = series.iter().map(|(_, r)| *r).collect();
        let avg = mean(&revenues);
        let sd = std_dev(&revenues);
        let anomalies: Vec<Anomaly> = series
            .iter()
            .filter_map(|(date, revenue)| {
                let z = z_score(*revenue, avg, sd);
                classify_anomaly(z).map(|(kind, severity)| Anomaly {
                    date: date.clone(),
                    revenue: *revenue,
                    expected_revenue: round_to(avg, 2),
                    deviation: round_to(z, 2),
                    kind,
                    severity,
                })
            })
            .collect();

        self.persist(
            PredictionType::AnomalyDetection,
            None,
            Some(marketplace_id),
            json!({
                "anomaliesCount": anomalies.len(),
                "avgRevenue": round_to(avg, 2),
                "stdDeviation": round_to(sd, 2),
            }),
            ANOMALY_CONFIDENCE,
        )
        .await?;
        info!(marketplace_id, anomalies = anomalies.len(), "anomaly detection finished");

        Ok(AnomalyReport {
            marketplace_id,
            anomalies,
            data_points: series.len(),
            avg_revenue: round_to(avg, 2),
            std_deviation: round_to(sd, 2),
            message: None,
        })
    }

    /// Rank a category's products by units sold over the last 30 days.
    /// Products without sales are included with zero quantity.
    pub async fn demand_forecast(&self, category: &str) -> Result<DemandForecast, MarketdeskError> {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(MarketdeskError::Validation("category is required".into()));
        }

        let since = history_start();
        let query_category = category.clone();
        let rows: Vec<(i64, String, i64, i64)> = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT p.id, p.name, COALESCE(s.sales_count, 0), COALESCE(s.quantity, 0) AS qty
                     FROM products p
                     LEFT JOIN (
                         SELECT oi.product_id, COUNT(oi.id) AS sales_count,
                                SUM(oi.quantity) AS quantity
                         FROM order_items oi
                         JOIN orders o ON o.id = oi.order_id
                         WHERE o.created_at >= ?2
                         GROUP BY oi.product_id
                     ) s ON s.product_id = p.id
                     WHERE p.category = ?1 AND p.status = 'active'
                     ORDER BY qty DESC, p.id ASC
                     LIMIT ?3",
                )?;
                let rows = stmt.query_map(params![query_category, since, DEMAND_LIMIT], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)?;

        let total_sales: i64 = rows.iter().map(|(_, _, _, qty)| qty).sum();
        let forecast = rows
            .into_iter()
            .map(|(product_id, product_name, sales_count, total_quantity)| {
                let demand_score = if total_sales > 0 {
                    round_to(total_quantity as f64 / total_sales as f64 * 100.0, 2)
                } else {
                    0.0
                };
                DemandItem {
                    product_id,
                    product_name,
                    sales_count,
                    total_quantity,
                    demand_score,
                    recommended_stock: (total_quantity as f64 * 1.5).round() as i64,
                }
            })
            .collect();
        record_forecast(PredictionType::DemandForecast.into());

        Ok(DemandForecast {
            category,
            forecast,
            total_sales,
        })
    }

    /// The most recent stored predictions, optionally of one type.
    pub async fn list_predictions(
        &self,
        prediction_type: Option<&str>,
    ) -> Result<Vec<Prediction>, MarketdeskError> {
        if let Some(kind) = prediction_type {
            kind.parse::<PredictionType>().map_err(|_| {
                MarketdeskError::Validation(format!("unknown prediction type `{kind}`"))
            })?;
        }
        predictions::list_predictions(&self.db, prediction_type, PREDICTION_LIST_LIMIT).await
    }

    async fn require_product(&self, product_id: i64) -> Result<(), MarketdeskError> {
        match products::get_product(&self.db, product_id).await? {
            Some(_) => Ok(()),
            None => Err(MarketdeskError::not_found("product", product_id)),
        }
    }

    /// Units of `product_id` sold per day with sales, oldest first.
    async fn daily_quantities(&self, product_id: i64) -> Result<Vec<f64>, MarketdeskError> {
        let since = history_start();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT substr(o.created_at, 1, 10) AS day, COALESCE(SUM(oi.quantity), 0)
                     FROM orders o
                     JOIN order_items oi ON oi.order_id = o.id
                     WHERE oi.product_id = ?1 AND o.created_at >= ?2
                     GROUP BY day
                     ORDER BY day ASC",
                )?;
                let rows = stmt.query_map(params![product_id, since], |row| {
                    row.get::<_, i64>(1).map(|qty| qty as f64)
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn persist(
        &self,
        kind: PredictionType,
        product_id: Option<i64>,
        marketplace_id: Option<i64>,
        value: serde_json::Value,
        confidence: f64,
    ) -> Result<i64, MarketdeskError> {
        let id = predictions::insert_prediction(
            &self.db,
            &NewPrediction {
                prediction_type: kind.to_string(),
                product_id,
                marketplace_id,
                prediction_value: value,
                confidence_score: confidence,
            },
        )
        .await?;
        record_forecast(kind.into());
        Ok(id)
    }
}

fn history_start() -> String {
    format_timestamp(Utc::now() - Duration::days(HISTORY_DAYS))
}
