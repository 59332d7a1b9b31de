// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketplace adapters for Marketdesk.
//!
//! Each adapter implements [`marketdesk_core::MarketplaceClient`] over one
//! seller account: [`OzonClient`] and [`WildberriesClient`] talk to the real
//! seller APIs, [`SimulatedClient`] serves demo data. [`HttpClientFactory`]
//! picks the adapter for a marketplace slug from configuration.

mod http;

pub mod credentials;
pub mod factory;
pub mod ozon;
pub mod simulated;
pub mod status;
pub mod wildberries;

pub use credentials::{CredentialSource, resolve as resolve_credentials, validate_for};
pub use factory::HttpClientFactory;
pub use ozon::{OZON_BASE_URL, OzonClient, decimal, synthesized_email};
pub use simulated::SimulatedClient;
pub use status::{ozon_status, wildberries_status};
pub use wildberries::{WILDBERRIES_BASE_URL, WildberriesClient};
