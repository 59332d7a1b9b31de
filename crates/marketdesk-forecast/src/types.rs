// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forecast results as returned to callers.

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::stats::{AnomalyKind, RiskLevel, Severity};

/// Kind tag stored with each persisted prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PredictionType {
    SalesForecast,
    ReturnsPrediction,
    AnomalyDetection,
    DemandForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: String,
    pub predicted_sales: i64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesForecast {
    pub product_id: i64,
    pub forecast: Vec<ForecastPoint>,
    pub avg_daily_sales: f64,
    pub trend_factor: f64,
    pub data_points: usize,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsPrediction {
    pub product_id: i64,
    pub return_probability: f64,
    pub confidence: f64,
    /// Absent when the fallback probability is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub total_orders: i64,
    pub returned_orders: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub date: String,
    pub revenue: f64,
    pub expected_revenue: f64,
    /// The z-score, rounded to two places.
    pub deviation: f64,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub marketplace_id: i64,
    pub anomalies: Vec<Anomaly>,
    pub data_points: usize,
    pub avg_revenue: f64,
    pub std_deviation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandItem {
    pub product_id: i64,
    pub product_name: String,
    pub sales_count: i64,
    pub total_quantity: i64,
    pub demand_score: f64,
    pub recommended_stock: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecast {
    pub category: String,
    pub forecast: Vec<DemandItem>,
    pub total_sales: i64,
}
