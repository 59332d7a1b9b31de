// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod customers;
pub mod integrations;
pub mod marketplaces;
pub mod orders;
pub mod predictions;
pub mod products;
