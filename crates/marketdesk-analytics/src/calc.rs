// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure arithmetic behind the reports.

use crate::types::ConversionFunnel;

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change of `current` against `previous`.
///
/// 100 when there was nothing before and something now, 0 when both are
/// empty.
pub fn growth_rate(current: i64, previous: i64) -> f64 {
    match (current, previous) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        (c, p) => round2((c - p) as f64 / p as f64 * 100.0),
    }
}

/// Revenue per order, 0 without orders.
pub fn average_order_value(revenue: f64, orders: i64) -> f64 {
    if orders == 0 {
        0.0
    } else {
        round2(revenue / orders as f64)
    }
}

/// Placeholder funnel derived from completed orders with fixed ratios.
/// There is no view or cart tracking behind these numbers.
pub fn synthetic_funnel(completed: i64) -> ConversionFunnel {
    let views = completed * 3;
    ConversionFunnel {
        views,
        cart_adds: completed * 2,
        checkouts: completed * 3 / 2,
        completed,
        conversion_rate: if views == 0 {
            0.0
        } else {
            round2(completed as f64 / views as f64 * 100.0)
        },
        synthetic: true,
    }
}
