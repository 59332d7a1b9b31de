// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sales analytics for Marketdesk.
//!
//! Trailing-window summaries with growth, daily series, per-marketplace
//! breakdown, the dashboard snapshot and a synthetic conversion funnel.

pub mod calc;
pub mod engine;
pub mod types;
pub mod window;

pub use engine::AnalyticsEngine;
pub use types::*;
pub use window::Window;
