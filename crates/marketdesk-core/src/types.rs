// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the marketplace adapters, engines and gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::MarketdeskError;

/// Timestamp format used for every persisted timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a UTC instant the way the storage layer persists it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current time in the persisted timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Rewrite an upstream RFC 3339 timestamp into the persisted format.
///
/// Window queries compare timestamps as text, so every stored value must
/// share one layout. Bare dates become midnight UTC. Unparseable input is
/// returned unchanged.
pub fn normalize_timestamp(raw: &str) -> String {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return format_timestamp(at.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return format_timestamp(naive.and_utc());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return format_timestamp(midnight.and_utc());
    }
    raw.to_string()
}

/// Canonical order status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Cancelled and returned orders never move again.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Position along new -> processing -> shipped -> delivered.
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::New => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled | OrderStatus::Returned => None,
        }
    }

    /// Whether an order in `self` may move to `next`.
    ///
    /// Forward moves along the fulfilment chain are allowed, cancellation is
    /// allowed before delivery, and a return is allowed up to and including
    /// delivery. Re-applying the current status is allowed and is a no-op.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => self != OrderStatus::Delivered,
            OrderStatus::Returned => true,
            _ => match (self.rank(), next.rank()) {
                (Some(from), Some(to)) => to > from,
                _ => false,
            },
        }
    }
}

/// Soft-delete flag for products.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Deleted,
}

/// Whether an integration may be used for sync.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Active,
    Inactive,
}

/// Trailing analytics window selected by a period code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "365d")]
    Year,
}

impl Period {
    /// Window length in days.
    pub fn days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    /// The period code, e.g. `30d`.
    pub fn code(self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
            Period::Year => "365d",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = MarketdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            "90d" => Ok(Period::Quarter),
            "365d" => Ok(Period::Year),
            other => Err(MarketdeskError::Validation(format!(
                "unknown period `{other}`, expected one of 7d, 30d, 90d, 365d"
            ))),
        }
    }
}

/// API credentials for one marketplace account.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// API key (Ozon `Api-Key`, Wildberries `Authorization`).
    pub api_key: String,
    /// Ozon `Client-Id`; stored as the integration's store id.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Seller id or API secret, when the marketplace issues one.
    #[serde(default)]
    pub seller_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[redacted]")
            .field("client_id", &self.client_id)
            .field("seller_id", &self.seller_id.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// A product as reported by a marketplace, flattened to common fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// Marketplace offer identifier (Ozon `offer_id`, Wildberries `nmID`).
    pub external_id: String,
    pub sku: String,
    pub name: String,
    pub price: f64,
    /// `None` when the marketplace catalog does not report stock.
    pub stock: Option<i64>,
    pub category: Option<String>,
}

/// One line of a normalized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrderItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// An order as reported by a marketplace, with the status already mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrder {
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: f64,
    pub items: Vec<NormalizedOrderItem>,
    pub created_at: String,
    pub shipped_at: Option<String>,
    pub fulfillment_type: Option<String>,
}

impl NormalizedOrder {
    /// Total number of units across all items.
    pub fn items_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A finance operation (sale, commission, refund) from the marketplace ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceTransaction {
    pub operation_id: String,
    pub operation_type: String,
    pub operation_date: String,
    pub amount: f64,
    pub posting_number: Option<String>,
}

/// A customer return reported by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub return_id: String,
    pub posting_number: Option<String>,
    pub sku: Option<String>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub status: String,
}

/// One line of an FBS shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn order_status_string_forms() {
        assert_eq!(OrderStatus::Processing.to_string(), "processing");
        assert_eq!(OrderStatus::from_str("returned").unwrap(), OrderStatus::Returned);
        assert!(OrderStatus::from_str("lost").is_err());
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
    }

    #[test]
    fn forward_transitions_allowed() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn backward_transitions_rejected() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::New));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn terminal_states_stay_put() {
        for next in [
            OrderStatus::New,
            OrderStatus::Processing,
            OrderStatus::Delivered,
            OrderStatus::Returned,
        ] {
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(!OrderStatus::Returned.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn cancellation_only_before_delivery() {
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn upstream_timestamps_normalized() {
        assert_eq!(
            normalize_timestamp("2026-03-01T10:15:00Z"),
            "2026-03-01T10:15:00.000Z"
        );
        assert_eq!(
            normalize_timestamp("2026-03-01T13:15:00.123456+03:00"),
            "2026-03-01T10:15:00.123Z"
        );
        assert_eq!(normalize_timestamp("2026-03-01"), "2026-03-01T00:00:00.000Z");
        assert_eq!(normalize_timestamp("garbage"), "garbage");
    }

    #[test]
    fn period_codes_parse() {
        assert_eq!(Period::from_str("7d").unwrap().days(), 7);
        assert_eq!(Period::from_str("365d").unwrap(), Period::Year);
        assert_eq!(Period::default().code(), "30d");
        let err = Period::from_str("14d").unwrap_err();
        assert!(matches!(err, MarketdeskError::Validation(_)));
    }

    #[test]
    fn credentials_debug_redacts_key() {
        let creds = Credentials {
            api_key: "secret-key".into(),
            client_id: Some("123".into()),
            seller_id: None,
        };
        let out = format!("{creds:?}");
        assert!(!out.contains("secret-key"));
        assert!(out.contains("123"));
    }

    #[test]
    fn items_count_sums_quantities() {
        let order = NormalizedOrder {
            order_number: "1".into(),
            status: OrderStatus::New,
            customer_name: "c".into(),
            customer_email: "c@example.com".into(),
            total_amount: 30.0,
            items: vec![
                NormalizedOrderItem {
                    sku: "A".into(),
                    name: "a".into(),
                    quantity: 2,
                    price: 10.0,
                },
                NormalizedOrderItem {
                    sku: "B".into(),
                    name: "b".into(),
                    quantity: 1,
                    price: 10.0,
                },
            ],
            created_at: now_timestamp(),
            shipped_at: None,
            fulfillment_type: None,
        };
        assert_eq!(order.items_count(), 3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn any_status() -> impl Strategy<Value = OrderStatus> {
            prop_oneof![
                Just(OrderStatus::New),
                Just(OrderStatus::Processing),
                Just(OrderStatus::Shipped),
                Just(OrderStatus::Delivered),
                Just(OrderStatus::Cancelled),
                Just(OrderStatus::Returned),
            ]
        }

        proptest! {
            #[test]
            fn terminal_never_leaves(from in any_status(), to in any_status()) {
                if from.is_terminal() && from != to {
                    prop_assert!(!from.can_transition_to(to));
                }
            }

            #[test]
            fn never_back_to_new(from in any_status()) {
                if from != OrderStatus::New {
                    prop_assert!(!from.can_transition_to(OrderStatus::New));
                }
            }
        }
    }
}
