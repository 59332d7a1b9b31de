// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace synchronization for Marketdesk.
//!
//! [`SyncEngine`] reconciles products, orders and customers for one
//! (user, marketplace) integration and runs single marketplace actions
//! (price, stock, returns, shipments). [`OzonWebhookProcessor`] applies
//! Ozon push notifications to the order table.

pub mod engine;
pub mod operations;
pub mod report;
pub mod webhook;

pub use engine::{DEFAULT_ORDER_WINDOW_DAYS, SyncEngine};
pub use operations::AccountRef;
pub use report::{OrderSyncOutcome, SyncReport, SyncStep};
pub use webhook::{OzonWebhookProcessor, WebhookOutcome};
