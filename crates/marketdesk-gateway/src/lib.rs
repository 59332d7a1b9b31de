// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for Marketdesk.
//!
//! Action-dispatched `/api` areas with a uniform JSON envelope, the Ozon
//! push endpoint, and public health and metrics routes.

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod request;
pub mod server;

pub use auth::{ActingUser, AuthConfig, USER_HEADER};
pub use envelope::{ApiError, Envelope};
pub use request::ApiRequest;
pub use server::{AppState, ServerConfig, router, start_server};
