// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic forecasting over Marketdesk order history.
//!
//! These are baselines for merchandising guidance: trend-adjusted averages,
//! return rates and z-score anomaly flags. Nothing here is a trained model.

pub mod engine;
pub mod stats;
pub mod types;

pub use engine::ForecastEngine;
pub use stats::{AnomalyKind, MAX_CONFIDENCE, RiskLevel, Severity};
pub use types::*;
