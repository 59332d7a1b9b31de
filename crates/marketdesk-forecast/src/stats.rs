// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptive statistics and the thresholds applied to them.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

/// Upper bound on every reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Days of history behind every forecast.
pub const HISTORY_DAYS: i64 = 30;

/// Anomaly detection needs at least this many days with revenue.
pub const MIN_ANOMALY_POINTS: usize = 7;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ratio of the mean of the last 7 points to the mean of the 7 before them.
///
/// 1.0 with fewer than 14 points or when the earlier week sold nothing.
pub fn trend_factor(daily: &[f64]) -> f64 {
    let n = daily.len();
    if n < 14 {
        return 1.0;
    }
    let recent = mean(&daily[n - 7..]);
    let earlier = mean(&daily[n - 14..n - 7]);
    if earlier > 0.0 { recent / earlier } else { 1.0 }
}

/// Standard score of `value`; 0 when the series is flat.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        (value - mean) / std_dev
    } else {
        0.0
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn sales_confidence(data_points: usize) -> f64 {
    MAX_CONFIDENCE.min(0.7 + data_points as f64 / 100.0)
}

pub fn returns_confidence(total_orders: i64) -> f64 {
    MAX_CONFIDENCE.min(0.5 + total_orders.max(0) as f64 / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_return_rate(rate: f64) -> Self {
        if rate > 0.15 {
            RiskLevel::High
        } else if rate > 0.08 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Spike,
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// Classify a z-score: `None` within two standard deviations.
pub fn classify_anomaly(z: f64) -> Option<(AnomalyKind, Severity)> {
    if z.abs() <= 2.0 {
        return None;
    }
    let kind = if z > 0.0 {
        AnomalyKind::Spike
    } else {
        AnomalyKind::Drop
    };
    let severity = if z.abs() > 3.0 {
        Severity::High
    } else {
        Severity::Medium
    };
    Some((kind, severity))
}
