// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Marketdesk integration tests.
//!
//! Provides a scriptable marketplace and test harness infrastructure for
//! fast, deterministic tests without seller accounts.
//!
//! # Components
//!
//! - [`MockMarketplace`] - Marketplace client with scripted data and failures
//! - [`MockClientFactory`] - Client factory handing out registered mocks
//! - [`TestHarness`] - Migrated temp database with seed helpers

pub mod harness;
pub mod mock_marketplace;

pub use harness::{OZON_ID, TestHarness, WILDBERRIES_ID, credentials, order, product};
pub use mock_marketplace::{MockCall, MockClientFactory, MockMarketplace, MockOperation};
