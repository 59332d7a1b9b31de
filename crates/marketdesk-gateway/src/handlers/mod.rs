// SPDX-FileCopyrightText: 2026 Marketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers, one module per `/api` area plus the public routes.

pub mod crm;
pub mod marketplace;
pub mod ml;
pub mod public;
pub mod sync;

use crate::envelope::ApiError;

pub(crate) fn unknown_action(action: &str) -> ApiError {
    ApiError::validation(format!("unknown action `{action}`"))
}
