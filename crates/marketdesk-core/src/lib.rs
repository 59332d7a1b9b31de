// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Marketdesk back office.
//!
//! Holds the error enum, the canonical domain types (order status, periods,
//! normalized marketplace records) and the [`MarketplaceClient`] trait that
//! every marketplace adapter implements.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{MarketdeskError, UpstreamFailure};
pub use traits::{ClientFactory, MarketplaceClient};
pub use types::{
    format_timestamp, normalize_timestamp, now_timestamp, Credentials, FinanceTransaction, IntegrationStatus,
    NormalizedOrder, NormalizedOrderItem, NormalizedProduct, OrderStatus, Period, ProductStatus,
    ReturnRecord, ShipmentItem,
};
