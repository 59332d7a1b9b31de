// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace status vocabularies mapped onto [`OrderStatus`].
//!
//! Unknown statuses map to `processing`: the order exists upstream and is
//! moving, but its stage is unknown, so it must never read as brand new.

use marketdesk_core::OrderStatus;

/// Map an Ozon posting status.
pub fn ozon_status(raw: &str) -> OrderStatus {
    match raw {
        "awaiting_packaging" | "acceptance_in_progress" | "awaiting_registration" => {
            OrderStatus::New
        }
        "awaiting_deliver" | "arbitration" | "client_arbitration" => OrderStatus::Processing,
        "delivering" | "driver_pickup" => OrderStatus::Shipped,
        "delivered" => OrderStatus::Delivered,
        "cancelled" => OrderStatus::Cancelled,
        "returned" => OrderStatus::Returned,
        _ => OrderStatus::Processing,
    }
}

/// Map a Wildberries supplier order status.
pub fn wildberries_status(raw: &str) -> OrderStatus {
    match raw {
        "new" => OrderStatus::New,
        "confirm" => OrderStatus::Processing,
        "complete" => OrderStatus::Delivered,
        "cancel" => OrderStatus::Cancelled,
        _ => OrderStatus::Processing,
    }
}
