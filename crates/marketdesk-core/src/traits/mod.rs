// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the engines and the marketplace adapters.
//!
//! Both traits use `#[async_trait]` so engines can hold `Box<dyn ...>`.

pub mod marketplace;

pub use marketplace::{ClientFactory, MarketplaceClient};
